//! shopsync — keep a static shop site in sync with its product catalog.
//!
//! # Usage
//!
//! ```text
//! shopsync [--root DIR] [--config FILE] pages [--dry-run]
//! shopsync diff
//! shopsync sitemap
//! shopsync today [build|inject]
//! shopsync all
//! ```
//!
//! Exit status: 0 on success, 2 for catalog/config problems, 3 when a required
//! directory or file cannot be found, 1 for anything else.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{pages::PagesArgs, today::TodayCommand, SiteArgs};
use shopsync_core::{ConfigurationError, LookupError};
use shopsync_sync::SyncError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "shopsync",
    version,
    about = "Materialize catalog pages, sitemaps, and the recent-updates widget",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    site: SiteArgs,

    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write one page per catalog record.
    Pages(PagesArgs),

    /// Show unified diff of what `pages` would write.
    Diff,

    /// Regenerate sitemap chunks, the index, and the robots.txt entry.
    Sitemap,

    /// Build the recent-updates fragment and inject it into the home page.
    Today {
        #[command(subcommand)]
        command: Option<TodayCommand>,
    },

    /// pages, sitemap, and today, in that order.
    All,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIGURATION: i32 = 2;
const EXIT_LOOKUP: i32 = 3;

fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(sync) = cause.downcast_ref::<SyncError>() {
            return match sync {
                SyncError::Configuration(_) => EXIT_CONFIGURATION,
                SyncError::Lookup(_) => EXIT_LOOKUP,
                _ => EXIT_FAILURE,
            };
        }
        if cause.is::<ConfigurationError>() {
            return EXIT_CONFIGURATION;
        }
        if cause.is::<LookupError>() {
            return EXIT_LOOKUP;
        }
    }
    EXIT_FAILURE
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let site = cli.site;
    match cli.command {
        Commands::Pages(args) => args.run(&site),
        Commands::Diff => commands::diff::run(&site),
        Commands::Sitemap => commands::sitemap::run(&site),
        Commands::Today { command } => commands::today::run(&site, command),
        Commands::All => commands::all(&site),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = dispatch(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}
