//! Domain types for the product catalog.
//!
//! Catalog records come from an external scraper, so field names and value
//! types drift: ids may be numbers, prices carry separators and currency
//! symbols. [`CatalogItem`] deserializes through a lenient raw shape and
//! normalizes once, here, so the rest of the pipeline sees clean values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Brand used when a record carries none.
pub const DEFAULT_BRAND: &str = "Coupang";

/// Title used when a record carries none.
pub const DEFAULT_TITLE: &str = "Product";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed product id; also the page file stem (`p/<id>.md`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Rating value and review count. Only ever present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub value: String,
    pub review_count: String,
}

/// One normalized product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCatalogItem")]
pub struct CatalogItem {
    /// Resolved from `product_id`, then `pageKey`, then `id`. `None` when all are blank.
    pub id: Option<ProductId>,
    pub title: Option<String>,
    pub image_url: String,
    pub description: String,
    pub brand: Option<String>,
    /// Digits only; `"10,000원"` becomes `"10000"`.
    pub price_number: String,
    pub rating: Option<Rating>,
}

impl CatalogItem {
    /// Title, or [`DEFAULT_TITLE`].
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Brand, or the supplied fallback.
    pub fn brand_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.brand.as_deref().unwrap_or(fallback)
    }
}

/// Wire shape of a catalog record: every field optional, any scalar type.
#[derive(Debug, Default, Deserialize)]
struct RawCatalogItem {
    #[serde(default)]
    product_id: Option<Value>,
    #[serde(default, rename = "pageKey")]
    page_key: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    image_url: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    brand: Option<Value>,
    #[serde(default)]
    price_number: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    rating_value: Option<Value>,
    #[serde(default)]
    review_count: Option<Value>,
}

impl From<RawCatalogItem> for CatalogItem {
    fn from(raw: RawCatalogItem) -> Self {
        let id = first_present(&[&raw.product_id, &raw.page_key, &raw.id]).map(ProductId);
        let price_number = first_present(&[&raw.price_number, &raw.price])
            .map(|p| digits_only(&p))
            .unwrap_or_default();

        let rating = match (scalar(&raw.rating_value), scalar(&raw.review_count)) {
            (Some(value), Some(review_count)) => Some(Rating {
                value,
                review_count,
            }),
            _ => None,
        };

        CatalogItem {
            id,
            title: scalar(&raw.title),
            image_url: scalar(&raw.image_url).unwrap_or_default(),
            description: scalar(&raw.description).unwrap_or_default(),
            brand: scalar(&raw.brand),
            price_number,
            rating,
        }
    }
}

/// Trimmed string form of a JSON scalar; `None` for null, blank, or non-scalars.
fn scalar(value: &Option<Value>) -> Option<String> {
    let s = match value.as_ref()? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn first_present(values: &[&Option<Value>]) -> Option<String> {
    values.iter().find_map(|v| scalar(v))
}

/// Strip everything but ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
