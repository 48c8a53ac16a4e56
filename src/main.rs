// SCANSPLIT - OCR scanned PDF batches and split them per collaborator
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use scansplit::config::{SplitConfig, DEFAULT_WORKERS};
use scansplit::driver::{Pipeline, RunReport};
use scansplit::progress::{self, Progress};

#[derive(Parser, Debug)]
#[command(author, version, about = "Split scanned PDF batches into one file per collaborator")]
struct Args {
    /// Directory scanned recursively for PDF files
    #[arg(short = 'd', long = "dir", default_value = ".")]
    root_dir: PathBuf,

    /// Maximum number of documents processed at once
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    workers: usize,

    /// Where split files are written
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scratch directory for page images, removed after the run
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// Tesseract language
    #[arg(short, long)]
    lang: Option<String>,

    /// Render resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Give up on a page whose rendering or OCR takes longer than this
    #[arg(long, value_name = "SECS")]
    page_timeout: Option<u64>,

    /// Exit with status 1 if any document, page or group failed
    #[arg(long)]
    strict: bool,

    /// Keep the terminal contents
    #[arg(long)]
    no_clear: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> SplitConfig {
        let mut config = SplitConfig::from_env();
        config.root_dir = self.root_dir.clone();
        config.workers = self.workers;
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(tmp_dir) = &self.tmp_dir {
            config.tmp_dir = tmp_dir.clone();
        }
        if let Some(lang) = &self.lang {
            config.language = lang.clone();
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        config.page_timeout = self.page_timeout.map(Duration::from_secs);
        config
    }
}

fn parse_workers(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("at least one worker is required".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,scansplit=debug"
    } else {
        "warn,scansplit=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn print_summary(report: &RunReport) {
    println!("\n\n:) All files have been processed");
    println!(
        "   documents: {} found, {} processed, {} unreadable",
        report.documents_found, report.documents_processed, report.documents_failed
    );
    println!(
        "   pages:     {} grouped, {} skipped",
        report.pages_grouped, report.pages_skipped
    );
    println!(
        "   files:     {} written, {} failed",
        report.groups_written, report.groups_failed
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let spinner = Arc::new(Progress::for_stdout());
    if !args.no_clear && spinner.is_enabled() {
        let _ = progress::clear_screen();
    }

    let config = args.to_config();
    let root = config.root_dir.clone();
    let report = Pipeline::from_config(config)
        .with_progress(spinner)
        .run()
        .await
        .with_context(|| format!("cannot search for PDF files in {}", root.display()))?;

    print_summary(&report);

    if args.strict && report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
