//! # shopsync-sync
//!
//! The synchronization pipelines. Each re-derives its output from the current
//! catalog or file tree and writes only what changed, so any run can be
//! repeated safely.
//!
//! - [`pages`] — catalog → product pages, plus [`diff::diff_pages`]
//! - [`sitemap`] — pages corpus → sitemap chunks, index, `robots.txt`
//! - [`recency`] — newest published documents → recent-updates fragment
//! - [`inject`] — fragment → host document
//! - [`pipeline`] — [`Scope`]-driven entrypoint used by the CLI

pub mod context;
pub mod corpus;
pub mod diff;
pub mod error;
pub mod inject;
pub mod pages;
pub mod pipeline;
pub mod recency;
pub mod sitemap;
pub mod writer;

pub use context::SyncContext;
pub use diff::{diff_pages, FileDiff};
pub use error::SyncError;
pub use inject::{inject_document, inject_home, AnchorStrategy, HostDialect, InjectReport};
pub use pages::{materialize, MaterializeReport};
pub use pipeline::{run, RunReport, Scope};
pub use recency::{build_fragment, select_recent, FragmentReport};
pub use sitemap::{build_sitemaps, register_sitemap, RobotsOutcome, SitemapReport};
pub use writer::{write_if_changed, WriteResult};
