//! Template contexts — serializable rendering payloads.
//!
//! Values are escaped for their destination here, before they reach Tera:
//! front-matter strings get YAML double-quote escaping, sitemap locations get
//! XML escaping. Templates insert them verbatim.

use serde::{Deserialize, Serialize};

use shopsync_core::types::CatalogItem;

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Product page
// ---------------------------------------------------------------------------

/// Product page payload: preamble fields plus body values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub title: String,
    pub product_id: String,
    pub image_url: String,
    pub description: String,
    pub brand: String,
    pub price_number: String,
    pub rating: Option<RatingCtx>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCtx {
    pub value: String,
    pub review_count: String,
}

impl PageContext {
    /// Build from a catalog item. Returns `None` when the item has no id.
    pub fn from_item(item: &CatalogItem, default_brand: &str) -> Option<Self> {
        let id = item.id.as_ref()?;
        Some(PageContext {
            title: sanitize_front_matter(item.title_or_default()),
            product_id: id.0.clone(),
            image_url: sanitize_front_matter(&item.image_url),
            description: sanitize_front_matter(&item.description),
            brand: sanitize_front_matter(item.brand_or(default_brand)),
            price_number: item.price_number.clone(),
            rating: item.rating.as_ref().map(|r| RatingCtx {
                value: sanitize_front_matter(&r.value),
                review_count: sanitize_front_matter(&r.review_count),
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// Sitemaps
// ---------------------------------------------------------------------------

/// One `<url>` element. `loc` is already XML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCtx {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: String,
    pub priority: String,
}

impl UrlCtx {
    /// Escape `loc` and wrap the remaining fields.
    pub fn new(loc: &str, lastmod: String, changefreq: &str, priority: &str) -> Self {
        Self {
            loc: xml_escape(loc),
            lastmod,
            changefreq: changefreq.to_string(),
            priority: priority.to_string(),
        }
    }
}

/// One sitemap chunk file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlsetContext {
    pub entries: Vec<UrlCtx>,
}

/// One `<sitemap>` element of the index. `loc` is already XML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntryCtx {
    pub loc: String,
    pub lastmod: String,
}

/// Sitemap index payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexContext {
    /// Per-run timestamp, shared by the build comment and every `<lastmod>`.
    pub build_stamp: String,
    pub sitemaps: Vec<IndexEntryCtx>,
}

impl IndexContext {
    /// Index over chunk URLs, all stamped with `build_stamp`.
    pub fn new(build_stamp: String, chunk_urls: &[String]) -> Self {
        let sitemaps = chunk_urls
            .iter()
            .map(|url| IndexEntryCtx {
                loc: xml_escape(url),
                lastmod: build_stamp.clone(),
            })
            .collect();
        Self {
            build_stamp,
            sitemaps,
        }
    }
}

// ---------------------------------------------------------------------------
// Recent updates fragment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItemCtx {
    pub href: String,
    pub title: String,
}

/// Recent-updates section payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentContext {
    /// `id` attribute of the section; locates it on later runs.
    pub marker: String,
    pub heading: String,
    pub items: Vec<RecentItemCtx>,
}

impl RecentContext {
    pub fn new(marker: &str, heading: &str) -> Self {
        Self {
            marker: xml_escape(marker),
            heading: xml_escape(heading),
            items: Vec::new(),
        }
    }

    /// Append a list item. `title` must already be sanitized markup text.
    pub fn push(&mut self, href: &str, title: &str) {
        self.items.push(RecentItemCtx {
            href: xml_escape(href),
            title: title.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Escaping helpers
// ---------------------------------------------------------------------------

/// Trim, collapse whitespace runs, and escape for a YAML double-quoted scalar.
pub fn sanitize_front_matter(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape the XML special characters `& < > "`.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Convert any context to a [`tera::Context`].
pub fn to_tera_context<T: Serialize>(ctx: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(ctx).map_err(RenderError::from)
}
