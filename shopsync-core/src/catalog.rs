//! Catalog loader.
//!
//! The catalog is a single JSON array of product records. Loading is
//! all-or-nothing: a missing file, invalid JSON, or a non-array top level
//! fails the whole run with a [`ConfigurationError`].

use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::error::ConfigurationError;
use crate::store::Store;
use crate::types::CatalogItem;

/// Load and normalize every record in the catalog at `path`.
pub fn load_catalog(store: &dyn Store, path: &Path) -> Result<Vec<CatalogItem>, ConfigurationError> {
    let contents = match store.read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ConfigurationError::CatalogNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ConfigurationError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value: Value =
        serde_json::from_str(&contents).map_err(|source| ConfigurationError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    let Value::Array(records) = value else {
        return Err(ConfigurationError::CatalogShape {
            path: path.to_path_buf(),
            detail: format!("expected an array of records, found {}", json_kind(&value)),
        });
    };

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            return Err(ConfigurationError::CatalogShape {
                path: path.to_path_buf(),
                detail: format!("record {index} is {}, not an object", json_kind(&record)),
            });
        }
        let item: CatalogItem =
            serde_json::from_value(record).map_err(|source| ConfigurationError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        items.push(item);
    }

    tracing::debug!("loaded {} catalog record(s) from {}", items.len(), path.display());
    Ok(items)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::ProductId;

    const CATALOG: &str = "data/products.json";

    #[test]
    fn loads_array_of_records() {
        let store = MemoryStore::new();
        store.seed(CATALOG, r#"[{"id":"A1","title":"Widget","price":"10,000"}]"#);
        let items = load_catalog(&store, Path::new(CATALOG)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, Some(ProductId::from("A1")));
        assert_eq!(items[0].price_number, "10000");
    }

    #[test]
    fn empty_array_is_valid() {
        let store = MemoryStore::new();
        store.seed(CATALOG, "[]");
        assert!(load_catalog(&store, Path::new(CATALOG)).unwrap().is_empty());
    }

    #[test]
    fn object_top_level_is_shape_error() {
        let store = MemoryStore::new();
        store.seed(CATALOG, r#"{"items":[]}"#);
        let err = load_catalog(&store, Path::new(CATALOG)).unwrap_err();
        assert!(matches!(err, ConfigurationError::CatalogShape { .. }), "got: {err}");
        assert!(err.to_string().contains("found an object"));
    }

    #[test]
    fn non_object_record_is_shape_error() {
        let store = MemoryStore::new();
        store.seed(CATALOG, r#"[{"id":"A1"}, 42]"#);
        let err = load_catalog(&store, Path::new(CATALOG)).unwrap_err();
        assert!(err.to_string().contains("record 1 is a number"), "got: {err}");
    }
}
