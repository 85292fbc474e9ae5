//! # shopsync-renderer
//!
//! Tera-based template engine that renders product pages, sitemap files, and
//! the recent-updates fragment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shopsync_core::types::CatalogItem;
//! use shopsync_renderer::{PageContext, Renderer};
//!
//! fn render_page(item: &CatalogItem) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Some(ctx) = PageContext::from_item(item, "Coupang") {
//!             if let Ok(content) = renderer.product_page(&ctx) {
//!                 println!("{}: {} bytes", ctx.product_id, content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{
    IndexContext, PageContext, RecentContext, UrlCtx, UrlsetContext,
};
pub use engine::{Renderer, TemplateEngine, TemplateKind};
pub use error::RenderError;
