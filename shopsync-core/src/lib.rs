//! shopsync core library — catalog types, site config, store, errors.
//!
//! Public API surface:
//! - [`types`] — [`CatalogItem`] and its normalization
//! - [`catalog`] — catalog loading
//! - [`config`] — [`SiteConfig`] (`shopsync.yaml`)
//! - [`store`] — the [`Store`] interface, [`FsStore`], [`MemoryStore`]
//! - [`candidates`] — ordered "first existing wins" resolution
//! - [`clock`] — injected [`Clock`] and [`TimestampProvider`]
//! - [`error`] — [`ConfigurationError`], [`LookupError`], [`TimestampError`]

pub mod candidates;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use candidates::{CandidateKind, Candidates};
pub use catalog::load_catalog;
pub use clock::{
    Clock, FixedClock, GitHistory, NoHistory, StoreMtime, SystemClock, TimestampProvider,
};
pub use config::{load_config, SiteConfig};
pub use error::{ConfigurationError, LookupError, TimestampError};
pub use store::{FileEntry, FsStore, MemoryStore, Store};
pub use types::{CatalogItem, ProductId, Rating};
