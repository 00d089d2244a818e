//! Comicast: read comics aloud in reading order.
//!
//! Comicast takes the text regions detected on each page of a comic, orders
//! them for the chosen reading mode (top-to-bottom webtoon strips, or
//! right-to-left manga rows), and narrates them page by page while the
//! pages ahead are still being analyzed.
//!
//! # Modules
//!
//! - [`page`]: Pages, text regions, boxes and the analysis JSON format
//! - [`sequence`]: Reading-order sequencing of a page's regions
//! - [`analysis`]: The analysis collaborator and look-ahead prefetching
//! - [`playback`]: The read-aloud state machine and narration collaborator
//! - [`session`]: A reading session and its headless runtime
//! - [`source`]: Loading pages from directories and archives
//! - [`settings`]: Read-only reader settings
//! - [`error`]: Error types for comicast operations

pub mod analysis;
pub mod error;
pub mod page;
pub mod playback;
pub mod sequence;
pub mod session;
pub mod settings;
pub mod source;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

pub use error::ComicastError;

use crate::analysis::{into_regions, Analyzer, SidecarAnalyzer};
use crate::page::io_json::{read_analysis_json, to_json_string};
use crate::page::{PageId, ReadingMode};
use crate::playback::{CommandNarrator, Narrator, NullNarrator};
use crate::session::{run_headless, HeadlessOptions, ReaderSession};
use crate::settings::Settings;

/// The comicast CLI application.
#[derive(Parser)]
#[command(name = "comicast")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List a comic's pages in reading order.
    Pages(PagesArgs),
    /// Put the regions of one analysis result into reading order.
    Order(OrderArgs),
    /// Narrate a comic from start to finish.
    Read(ReadArgs),
}

/// Arguments for the pages subcommand.
#[derive(clap::Args)]
struct PagesArgs {
    /// Comic directory or .cbz/.zip archive.
    input: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the order subcommand.
#[derive(clap::Args)]
struct OrderArgs {
    /// Analysis result JSON file ({"bubbles": [...]}).
    input: PathBuf,

    /// Reading mode.
    #[arg(long, value_enum, default_value_t = ReadingMode::Manga)]
    mode: ReadingMode,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the read subcommand.
#[derive(clap::Args)]
struct ReadArgs {
    /// Comic directory or .cbz/.zip archive.
    input: PathBuf,

    /// Reading mode (defaults to the settings' default reading mode).
    #[arg(long, value_enum)]
    mode: Option<ReadingMode>,

    /// Settings file (.json, .yaml or .yml).
    #[arg(long, env = "COMICAST_SETTINGS")]
    settings: Option<PathBuf>,

    /// Directory holding analysis results, mirroring the page paths.
    #[arg(long)]
    analysis_dir: Option<PathBuf>,

    /// Speech command; the text is appended as its last argument.
    #[arg(long, env = "COMICAST_SPEAK_CMD")]
    speak_cmd: Option<String>,

    /// Page to start on (1-based).
    #[arg(long, default_value_t = 1)]
    start_page: usize,

    /// Block to start on within the start page (1-based).
    #[arg(long, default_value_t = 1)]
    start_block: usize,

    /// Extra analysis attempts for a page playback is waiting on.
    #[arg(long, default_value_t = 2)]
    analysis_retries: u32,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the comicast CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ComicastError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Pages(args)) => run_pages(args),
        Some(Commands::Order(args)) => run_order(args),
        Some(Commands::Read(args)) => run_read(args),
        None => {
            println!("comicast {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Read comics aloud in reading order.");
            println!();
            println!("Run 'comicast --help' for usage information.");
            Ok(())
        }
    }
}

fn check_output(output: &str) -> Result<(), ComicastError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(ComicastError::UnsupportedFormat(format!(
            "'{}' (supported outputs: text, json)",
            other
        ))),
    }
}

/// Execute the pages subcommand.
fn run_pages(args: PagesArgs) -> Result<(), ComicastError> {
    check_output(&args.output)?;
    let pages = source::load_pages(&args.input)?;

    if args.output == "json" {
        println!("{}", to_json_string(&pages)?);
        return Ok(());
    }

    println!("{} page(s)", pages.len());
    for (idx, page) in pages.iter().enumerate() {
        println!("  {:>3}. {} ({}x{})", idx + 1, page.id, page.width, page.height);
    }
    Ok(())
}

/// Execute the order subcommand.
fn run_order(args: OrderArgs) -> Result<(), ComicastError> {
    check_output(&args.output)?;
    let response = read_analysis_json(&args.input)?;

    let page_id = PageId::new(
        args.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let regions = into_regions(&page_id, response.bubbles)?;
    let ordered = sequence::sequence(regions, args.mode);

    if args.output == "json" {
        println!("{}", to_json_string(&ordered)?);
        return Ok(());
    }

    println!("{} region(s) in {} order", ordered.len(), args.mode);
    for region in &ordered {
        let [ymin, xmin, ymax, xmax] = region.bbox.to_box_2d();
        println!(
            "  {:>3}. [{}, {}, {}, {}] {}",
            region.order.unwrap_or_default(),
            ymin,
            xmin,
            ymax,
            xmax,
            playback::clean_text(&region.text)
        );
    }
    Ok(())
}

/// Execute the read subcommand.
fn run_read(args: ReadArgs) -> Result<(), ComicastError> {
    check_output(&args.output)?;

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(mode) = args.mode {
        settings.default_reading_mode = mode;
    }

    let pages = source::load_pages(&args.input)?;

    let speak_cmd = args.speak_cmd.as_deref().and_then(CommandNarrator::parse);
    let narrator: Box<dyn Narrator> = match speak_cmd {
        Some(command) => Box::new(command),
        None => Box::new(NullNarrator),
    };
    let analyzer: Arc<dyn Analyzer> = match args.analysis_dir {
        Some(dir) => Arc::new(SidecarAnalyzer::with_dir(dir)),
        None => Arc::new(SidecarAnalyzer::new()),
    };

    let mut session = ReaderSession::new(pages, &settings, narrator);
    let options = HeadlessOptions {
        start_page: args.start_page.saturating_sub(1),
        start_block: args.start_block.saturating_sub(1),
        analysis_retries: args.analysis_retries,
        ..HeadlessOptions::default()
    };
    let report = run_headless(&mut session, analyzer, &options)?;

    if args.output == "json" {
        println!("{}", to_json_string(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
