//! Idempotent injection of the recent-updates fragment into a host document.
//!
//! Anchor strategies are tried in a fixed order per [`HostDialect`]; the first
//! that applies wins. [`AnchorStrategy::ReplaceMarked`] always comes first, so
//! once the fragment is in place later runs swap it rather than add another.
//!
//! | Dialect     | Order                                                                    |
//! |-------------|--------------------------------------------------------------------------|
//! | Markup      | ReplaceMarked, AfterHeaderClose, InsideMainOpen, AfterBodyOpen, Prepend  |
//! | FrontMatter | ReplaceMarked, AfterFrontMatter, Prepend                                 |

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use shopsync_core::LookupError;

use crate::context::SyncContext;
use crate::error::{io_err, SyncError};
use crate::writer::{write_if_changed, WriteResult};

static HEADER_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</header\s*>").expect("valid regex"));
static MAIN_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<main(?:\s[^>]*)?>").expect("valid regex"));
static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").expect("valid regex"));

/// How a host document is structured, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostDialect {
    /// `.html` / `.htm` and anything unrecognised.
    Markup,
    /// `.md` / `.markdown` with an optional leading `---` block.
    FrontMatter,
}

impl HostDialect {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md") | Some("markdown") => HostDialect::FrontMatter,
            _ => HostDialect::Markup,
        }
    }

    /// Strategies in precedence order.
    pub fn strategies(&self) -> &'static [AnchorStrategy] {
        match self {
            HostDialect::Markup => &[
                AnchorStrategy::ReplaceMarked,
                AnchorStrategy::AfterHeaderClose,
                AnchorStrategy::InsideMainOpen,
                AnchorStrategy::AfterBodyOpen,
                AnchorStrategy::Prepend,
            ],
            HostDialect::FrontMatter => &[
                AnchorStrategy::ReplaceMarked,
                AnchorStrategy::AfterFrontMatter,
                AnchorStrategy::Prepend,
            ],
        }
    }

    /// Text inserted by the non-replacing strategies.
    fn wrap(&self, fragment: &str) -> String {
        match self {
            HostDialect::Markup => format!("\n{fragment}\n"),
            HostDialect::FrontMatter => format!("\n\n{fragment}\n\n"),
        }
    }
}

/// A named place the fragment may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Replace the element whose `id` equals the marker, through its matching
    /// close tag.
    ReplaceMarked,
    AfterHeaderClose,
    InsideMainOpen,
    AfterBodyOpen,
    /// After the closing `---` of a leading front-matter block.
    AfterFrontMatter,
    /// Always applies.
    Prepend,
}

impl AnchorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AnchorStrategy::ReplaceMarked => "replace-marked",
            AnchorStrategy::AfterHeaderClose => "after-header",
            AnchorStrategy::InsideMainOpen => "inside-main",
            AnchorStrategy::AfterBodyOpen => "after-body",
            AnchorStrategy::AfterFrontMatter => "after-front-matter",
            AnchorStrategy::Prepend => "prepend",
        }
    }

    /// `None` when this anchor does not exist in `host`.
    ///
    /// `fragment` replaces a marked block as-is; `wrapped` is what the
    /// inserting strategies splice in.
    pub fn apply(&self, host: &str, fragment: &str, wrapped: &str, marker: &str) -> Option<String> {
        match self {
            AnchorStrategy::ReplaceMarked => {
                let (start, end) = find_marked_block(host, marker)?;
                Some(format!("{}{fragment}{}", &host[..start], &host[end..]))
            }
            AnchorStrategy::AfterHeaderClose => {
                let m = HEADER_CLOSE_RE.find(host)?;
                Some(insert_at(host, m.end(), wrapped))
            }
            AnchorStrategy::InsideMainOpen => {
                let m = MAIN_OPEN_RE.find(host)?;
                Some(insert_at(host, m.end(), wrapped))
            }
            AnchorStrategy::AfterBodyOpen => {
                let m = BODY_OPEN_RE.find(host)?;
                Some(insert_at(host, m.end(), wrapped))
            }
            AnchorStrategy::AfterFrontMatter => {
                let end = front_matter_end(host)?;
                Some(insert_at(host, end, wrapped))
            }
            AnchorStrategy::Prepend => Some(insert_at(host, 0, wrapped)),
        }
    }
}

fn insert_at(host: &str, pos: usize, text: &str) -> String {
    let mut out = String::with_capacity(host.len() + text.len());
    out.push_str(&host[..pos]);
    out.push_str(text);
    out.push_str(&host[pos..]);
    out
}

/// Byte range of the element carrying `id="<marker>"`, from its opening tag
/// through the close tag that balances it. Unbalanced elements are not
/// matched.
fn find_marked_block(host: &str, marker: &str) -> Option<(usize, usize)> {
    let escaped = regex::escape(marker);
    let open_re = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9-]*)(?:\s[^>]*?)?\sid\s*=\s*(?:"{escaped}"|'{escaped}')[^>]*>"#
    ))
    .ok()?;
    let caps = open_re.captures(host)?;
    let open = caps.get(0)?;
    let tag = caps.get(1)?.as_str();
    if open.as_str().ends_with("/>") {
        return Some((open.start(), open.end()));
    }

    let tag_re = Regex::new(&format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;
    for m in tag_re.captures_iter(&host[open.end()..]) {
        let whole = m.get(0)?;
        let closing = m.get(1).is_some_and(|g| !g.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((open.start(), open.end() + whole.end()));
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Offset just past the closing `---` line of a leading front-matter block.
fn front_matter_end(host: &str) -> Option<usize> {
    let mut lines = host.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim_end() == "---" {
            return Some(offset);
        }
    }
    None
}

/// Result of injecting into a document in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub content: String,
    pub strategy: AnchorStrategy,
}

/// Place `fragment` into `host` using the first applicable strategy.
pub fn inject_document(host: &str, fragment: &str, marker: &str, dialect: HostDialect) -> Injection {
    let fragment = fragment.trim();
    let wrapped = dialect.wrap(fragment);
    for strategy in dialect.strategies() {
        if let Some(content) = strategy.apply(host, fragment, &wrapped, marker) {
            return Injection {
                content,
                strategy: *strategy,
            };
        }
    }
    // Prepend always applies; this is only reached with an empty strategy list.
    Injection {
        content: insert_at(host, 0, &wrapped),
        strategy: AnchorStrategy::Prepend,
    }
}

/// Outcome of `today inject`.
#[derive(Debug)]
pub struct InjectReport {
    pub host: PathBuf,
    pub strategy: AnchorStrategy,
    pub write: WriteResult,
}

/// Inject the previously built fragment into the first existing host document.
pub fn inject_home(ctx: &SyncContext<'_>) -> Result<InjectReport, SyncError> {
    let host = ctx.config.hosts().rooted_at(&ctx.root).resolve(ctx.store)?;
    let fragment_path = ctx.path(&ctx.config.recent.fragment_path);
    let fragment = match ctx.store.read_to_string(&fragment_path) {
        Ok(fragment) => fragment,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LookupError {
                label: "section fragment (run `today build` first)".to_string(),
                candidates: vec![fragment_path],
            }
            .into());
        }
        Err(err) => return Err(io_err(&fragment_path, err)),
    };
    let current = ctx.store.read_to_string(&host).map_err(|e| io_err(&host, e))?;

    let dialect = HostDialect::from_path(&host);
    let injection = inject_document(&current, &fragment, &ctx.config.recent.marker, dialect);
    tracing::debug!("{}: anchor {}", host.display(), injection.strategy.name());

    let write = write_if_changed(ctx.store, &host, &injection.content, false)?;
    Ok(InjectReport {
        host,
        strategy: injection.strategy,
        write,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FRAG: &str = "<section id=\"today-updates\">\n  <ul>\n    <li>A</li>\n  </ul>\n</section>";

    fn markup(host: &str) -> Injection {
        inject_document(host, FRAG, "today-updates", HostDialect::Markup)
    }

    #[rstest]
    #[case("<body><header>h</header><main>m</main></body>", AnchorStrategy::AfterHeaderClose)]
    #[case("<body><main class=\"x\">m</main></body>", AnchorStrategy::InsideMainOpen)]
    #[case("<BODY id=\"top\"><p>x</p></BODY>", AnchorStrategy::AfterBodyOpen)]
    #[case("<p>bare fragment</p>", AnchorStrategy::Prepend)]
    #[case("<body><header></header><section id='today-updates'>old</section></body>", AnchorStrategy::ReplaceMarked)]
    fn markup_anchor_precedence(#[case] host: &str, #[case] expected: AnchorStrategy) {
        assert_eq!(markup(host).strategy, expected);
    }

    #[test]
    fn header_close_beats_body() {
        let out = markup("<body>\n<header>nav</header>\n<p>x</p>\n</body>");
        assert_eq!(
            out.content,
            format!("<body>\n<header>nav</header>\n{FRAG}\n\n<p>x</p>\n</body>")
        );
    }

    #[test]
    fn main_open_tag_is_not_confused_with_longer_names() {
        let out = markup("<mainframe>x</mainframe><body>y</body>");
        assert_eq!(out.strategy, AnchorStrategy::AfterBodyOpen);
    }

    #[test]
    fn repeated_injection_is_byte_identical() {
        let host = "<html><body><header>h</header><p>content</p></body></html>";
        let once = markup(host).content;
        let twice = markup(&once).content;
        assert_eq!(once, twice);
        assert_eq!(twice.matches("id=\"today-updates\"").count(), 1);
    }

    #[test]
    fn replacement_respects_nested_sections() {
        let host = "<body><section id=\"today-updates\"><section>inner</section><p>old</p></section><footer>f</footer></body>";
        let out = markup(host);
        assert_eq!(out.strategy, AnchorStrategy::ReplaceMarked);
        assert_eq!(out.content, format!("<body>{FRAG}<footer>f</footer></body>"));
    }

    #[test]
    fn unbalanced_marked_block_is_not_replaced() {
        assert!(find_marked_block("<div id=\"today-updates\"><p>open", "today-updates").is_none());
    }

    #[test]
    fn marker_must_be_the_id_attribute() {
        let host = "<div data-id=\"today-updates\">x</div>";
        assert!(find_marked_block(host, "today-updates").is_none());
    }

    #[test]
    fn front_matter_host_gets_fragment_after_preamble() {
        let host = "---\ntitle: Home\n---\n# Welcome\n";
        let once = inject_document(host, FRAG, "today-updates", HostDialect::FrontMatter);
        assert_eq!(once.strategy, AnchorStrategy::AfterFrontMatter);
        assert_eq!(once.content, format!("---\ntitle: Home\n---\n\n\n{FRAG}\n\n# Welcome\n"));

        let twice = inject_document(&once.content, FRAG, "today-updates", HostDialect::FrontMatter);
        assert_eq!(twice.strategy, AnchorStrategy::ReplaceMarked);
        assert_eq!(twice.content, once.content);
    }

    #[test]
    fn front_matter_host_without_preamble_prepends() {
        let out = inject_document("# Welcome\n", FRAG, "today-updates", HostDialect::FrontMatter);
        assert_eq!(out.strategy, AnchorStrategy::Prepend);
        assert!(out.content.ends_with("# Welcome\n"));
    }

    #[test]
    fn fragment_whitespace_does_not_accumulate() {
        let padded = format!("\n\n{FRAG}\n\n");
        let host = "<body><p>x</p></body>";
        let once = inject_document(host, &padded, "today-updates", HostDialect::Markup).content;
        let twice = inject_document(&once, &padded, "today-updates", HostDialect::Markup).content;
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("index.html", HostDialect::Markup)]
    #[case("index.HTM", HostDialect::Markup)]
    #[case("index.md", HostDialect::FrontMatter)]
    #[case("index.Markdown", HostDialect::FrontMatter)]
    fn dialect_from_extension(#[case] name: &str, #[case] expected: HostDialect) {
        assert_eq!(HostDialect::from_path(Path::new(name)), expected);
    }
}
