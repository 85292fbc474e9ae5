//! Tera rendering engine — [`TemplateKind`] enum and [`Renderer`].
//!
//! # Templates
//!
//! | Kind            | Template name                    | Output                         |
//! |-----------------|----------------------------------|--------------------------------|
//! | ProductPage     | `page/product.md.tera`           | `p/<id>.md`                    |
//! | Urlset          | `sitemap/urlset.xml.tera`        | `sitemap.xml`, `sitemap-<n>.xml` |
//! | SitemapIndex    | `sitemap/index.xml.tera`         | `sitemap_index.xml`            |
//! | RecentUpdates   | `home/recent_updates.html.tera`  | recent-updates fragment        |
//!
//! Names end in `.tera`, so Tera's suffix-based autoescaping never applies;
//! contexts escape their own values.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use crate::context::{
    to_tera_context, IndexContext, PageContext, RecentContext, UrlsetContext,
};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("page/product.md.tera", include_str!("templates/product_page.md.tera")),
    ("sitemap/urlset.xml.tera", include_str!("templates/urlset.xml.tera")),
    ("sitemap/index.xml.tera", include_str!("templates/sitemap_index.xml.tera")),
    (
        "home/recent_updates.html.tera",
        include_str!("templates/recent_updates.html.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Load `.tera` overrides from `dir`. Every override must shadow an embedded
/// template name.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();

    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        if !TemplateKind::all().iter().any(|k| k.template_name() == name) {
            return Err(RenderError::UnknownOverride {
                name,
                dir: dir.to_path_buf(),
                expected: TemplateKind::all()
                    .iter()
                    .map(|k| k.template_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("template override {name}: {}", path.display());
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Every document shape shopsync renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    ProductPage,
    Urlset,
    SitemapIndex,
    RecentUpdates,
}

impl TemplateKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::ProductPage,
            TemplateKind::Urlset,
            TemplateKind::SitemapIndex,
            TemplateKind::RecentUpdates,
        ]
    }

    /// Tera template name; also the relative path of a user override.
    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::ProductPage   => "page/product.md.tera",
            TemplateKind::Urlset        => "sitemap/urlset.xml.tera",
            TemplateKind::SitemapIndex  => "sitemap/index.xml.tera",
            TemplateKind::RecentUpdates => "home/recent_updates.html.tera",
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults.
/// Template names are normalised to lowercase and relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `kind` with any serializable context. Output uses LF line endings.
    pub fn render<C: Serialize>(&self, kind: TemplateKind, ctx: &C) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(ctx)?;
        let rendered = self.tera.render(kind.template_name(), &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Typed front door over [`TemplateEngine`]: one method per document shape.
///
/// Create once with [`Renderer::new`] and reuse across a run.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Construct a [`Renderer`] honouring overrides in `dir`.
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(dir)? })
    }

    pub fn product_page(&self, ctx: &PageContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::ProductPage, ctx)
    }

    pub fn urlset(&self, ctx: &UrlsetContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::Urlset, ctx)
    }

    pub fn sitemap_index(&self, ctx: &IndexContext) -> Result<String, RenderError> {
        self.engine.render(TemplateKind::SitemapIndex, ctx)
    }

    /// Recent-updates fragment, trailing whitespace trimmed so it can be
    /// spliced into a host document without accumulating blank lines.
    pub fn recent_updates(&self, ctx: &RecentContext) -> Result<String, RenderError> {
        let rendered = self.engine.render(TemplateKind::RecentUpdates, ctx)?;
        Ok(rendered.trim_end().to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RatingCtx, UrlCtx};

    fn page() -> PageContext {
        PageContext {
            title: "Widget".to_string(),
            product_id: "A1".to_string(),
            image_url: "https://img.example/a1.jpg".to_string(),
            description: "A fine widget".to_string(),
            brand: "Coupang".to_string(),
            price_number: "10000".to_string(),
            rating: None,
        }
    }

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("Renderer::new should succeed with embedded templates");
    }

    #[test]
    fn product_page_has_fixed_preamble_order() {
        let renderer = Renderer::new().unwrap();
        let content = renderer.product_page(&page()).unwrap();
        let expected_head = "---\n\
            layout: product\n\
            title: \"Widget\"\n\
            product_id: A1\n\
            image_url: \"https://img.example/a1.jpg\"\n\
            description: \"A fine widget\"\n\
            brand: \"Coupang\"\n\
            price_number: \"10000\"\n\
            ---\n";
        assert!(
            content.starts_with(expected_head),
            "unexpected preamble:\n{content}"
        );
        assert!(content.contains("<li>Price: 10000 KRW</li>"));
        assert!(!content.contains("rating_value"));
    }

    #[test]
    fn product_page_includes_rating_pair() {
        let renderer = Renderer::new().unwrap();
        let mut ctx = page();
        ctx.rating = Some(RatingCtx {
            value: "4.5".to_string(),
            review_count: "12".to_string(),
        });
        let content = renderer.product_page(&ctx).unwrap();
        assert!(content.contains(
            "price_number: \"10000\"\nrating_value: \"4.5\"\nreview_count: \"12\"\n---\n"
        ));
    }

    #[test]
    fn urlset_renders_every_entry() {
        let renderer = Renderer::new().unwrap();
        let ctx = UrlsetContext {
            entries: vec![
                UrlCtx::new("https://x.io/", "2025-01-01T00:00:00Z".to_string(), "hourly", "1.0"),
                UrlCtx::new("https://x.io/p/a&b.html", "2025-01-01T00:00:00Z".to_string(), "daily", "0.8"),
            ],
        };
        let xml = renderer.urlset(&ctx).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://x.io/p/a&amp;b.html</loc>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn empty_recent_updates_is_valid_section() {
        let renderer = Renderer::new().unwrap();
        let ctx = RecentContext::new("today-updates", "Today's updates");
        let html = renderer.recent_updates(&ctx).unwrap();
        assert!(html.starts_with("<section id=\"today-updates\""));
        assert!(html.ends_with("</section>"));
        assert!(!html.contains("<li>"));
    }

    #[test]
    fn template_names_are_unique_and_embedded() {
        for kind in TemplateKind::all() {
            assert!(
                TPLS.iter().any(|(name, _)| *name == kind.template_name()),
                "no embedded template for {:?}",
                kind
            );
        }
        assert_eq!(TPLS.len(), TemplateKind::all().len());
    }

    #[test]
    fn no_crlf_in_any_rendered_output() {
        let renderer = Renderer::new().unwrap();
        let outputs = vec![
            renderer.product_page(&page()).unwrap(),
            renderer.urlset(&UrlsetContext { entries: vec![] }).unwrap(),
            renderer
                .sitemap_index(&IndexContext::new("2025-01-01T00:00:00Z".to_string(), &[]))
                .unwrap(),
            renderer
                .recent_updates(&RecentContext::new("today-updates", "Today"))
                .unwrap(),
        ];
        for content in outputs {
            assert!(!content.contains('\r'), "rendered output contains CR:\n{content}");
        }
    }
}
