//! Site configuration.
//!
//! Optional `shopsync.yaml` at the site root. Every section and field has a
//! default, so an absent file (or a partial one) is valid. CLI flags only pick
//! the root and config path; everything else lives here.
//!
//! ```yaml
//! site:
//!   origin: https://example.github.io
//!   base_path: /yourshop
//! pages:
//!   chunk_size: 1000
//! recent:
//!   limit: 5
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::candidates::Candidates;
use crate::error::ConfigurationError;
use crate::store::{read_optional, Store};
use crate::types::DEFAULT_BRAND;

/// Default config file name, relative to the site root.
pub const CONFIG_FILE_NAME: &str = "shopsync.yaml";

/// Default maximum number of URLs per sitemap chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default number of documents in the recent-updates widget.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub pages: PagesSection,
    #[serde(default)]
    pub recent: RecentSection,
    #[serde(default)]
    pub home: HomeSection,
    /// Directory of `.tera` files overriding the embedded templates.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

/// `site:` — public URL identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Scheme + host, e.g. `https://example.github.io`.
    pub origin: String,
    /// Public path prefix for project pages, e.g. `/yourshop`. May be empty.
    pub base_path: String,
    pub default_brand: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            origin: "https://example.github.io".to_string(),
            base_path: "/yourshop".to_string(),
            default_brand: DEFAULT_BRAND.to_string(),
        }
    }
}

impl SiteSection {
    /// `<origin><base_path>` without a trailing slash.
    pub fn site_url(&self) -> String {
        let origin = self.origin.trim_end_matches('/');
        let base = self.base_path.trim_matches('/');
        if base.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{base}")
        }
    }
}

/// `catalog:` — product catalog input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub path: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/products.json"),
        }
    }
}

/// `pages:` — materialized pages and the sitemap built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesSection {
    /// Where the materializer writes `<id>.<source_ext>`.
    pub output_dir: PathBuf,
    /// Where the sitemap looks for pages, in priority order.
    pub dir_candidates: Vec<PathBuf>,
    pub source_ext: String,
    /// Extension the theming pipeline publishes pages under.
    pub public_ext: String,
    /// URL path segment between the site URL and the page path.
    pub url_prefix: String,
    pub recursive: bool,
    pub chunk_size: usize,
    /// Order entries by `lastmod` descending instead of scan order.
    pub sort_by_lastmod: bool,
    /// Directory receiving sitemap chunks, the index, and `robots.txt`.
    pub sitemap_dir: PathBuf,
    pub index_name: String,
    pub robots_name: String,
}

impl Default for PagesSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("p"),
            dir_candidates: vec![PathBuf::from("p")],
            source_ext: "md".to_string(),
            public_ext: "html".to_string(),
            url_prefix: "p".to_string(),
            recursive: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sort_by_lastmod: false,
            sitemap_dir: PathBuf::from("."),
            index_name: "sitemap_index.xml".to_string(),
            robots_name: "robots.txt".to_string(),
        }
    }
}

/// `recent:` — recently-updated widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentSection {
    /// Published corpus directories, in priority order.
    pub dir_candidates: Vec<PathBuf>,
    pub ext: String,
    pub limit: usize,
    /// Public URL prefix prepended to the document file name.
    pub public_prefix: String,
    /// Intermediate location of the rendered fragment.
    pub fragment_path: PathBuf,
    pub heading: String,
    /// `id` attribute identifying the fragment in the host document.
    pub marker: String,
}

impl Default for RecentSection {
    fn default() -> Self {
        Self {
            dir_candidates: vec![PathBuf::from("yourshop/p"), PathBuf::from("p")],
            ext: "html".to_string(),
            limit: DEFAULT_RECENT_LIMIT,
            public_prefix: "/yourshop/p/".to_string(),
            fragment_path: PathBuf::from("scripts/out/today-updates.html"),
            heading: "Today's updates".to_string(),
            marker: "today-updates".to_string(),
        }
    }
}

/// `home:` — host documents for the widget, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSection {
    pub host_candidates: Vec<PathBuf>,
}

impl Default for HomeSection {
    fn default() -> Self {
        Self {
            host_candidates: vec![
                PathBuf::from("yourshop/index.html"),
                PathBuf::from("yourshop/index.md"),
            ],
        }
    }
}

impl SiteConfig {
    /// Sitemap page directory candidates.
    pub fn page_dirs(&self) -> Candidates {
        Candidates::directories("pages directory", self.pages.dir_candidates.clone())
    }

    /// Recency corpus directory candidates.
    pub fn recent_dirs(&self) -> Candidates {
        Candidates::directories("published corpus directory", self.recent.dir_candidates.clone())
    }

    /// Host document candidates.
    pub fn hosts(&self) -> Candidates {
        Candidates::files("host document", self.home.host_candidates.clone())
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.pages.chunk_size == 0 {
            return Err(ConfigurationError::Invalid(
                "pages.chunk_size must be at least 1".to_string(),
            ));
        }
        if self.site.origin.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "site.origin must not be empty".to_string(),
            ));
        }
        if !is_plain_id(&self.recent.marker) {
            return Err(ConfigurationError::Invalid(format!(
                "recent.marker {:?} must be a plain HTML id \
                 (a letter, then letters, digits, '-' or '_')",
                self.recent.marker
            )));
        }
        Ok(())
    }
}

/// The marker is written verbatim into the fragment and searched for verbatim
/// in the host, so it must need no escaping in either place.
fn is_plain_id(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load `path`, or defaults when it does not exist.
///
/// Returns `ConfigurationError::ConfigParse` (with path + line context) for
/// malformed YAML and `ConfigurationError::Invalid` for unusable values.
pub fn load_config(store: &dyn Store, path: &Path) -> Result<SiteConfig, ConfigurationError> {
    let contents = read_optional(store, path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = match contents {
        None => {
            tracing::debug!("no site config at {}; using defaults", path.display());
            SiteConfig::default()
        }
        Some(text) if text.trim().is_empty() => SiteConfig::default(),
        Some(text) => serde_yaml::from_str(&text).map_err(|source| ConfigurationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?,
    };
    config.validate()?;
    Ok(config)
}
