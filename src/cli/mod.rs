//! # CLI Module
//!
//! Command-line interface for the media archiver.
//!
//! ## Usage
//! ```bash
//! # Move new media into the archive
//! media-archive import ~/Camera ~/Archive
//!
//! # Rebuild the dedup store from the archived tree
//! media-archive index ~/Archive
//!
//! # Count archived records
//! media-archive report ~/Archive
//!
//! # JSON output
//! media-archive report ~/Archive --output json
//! ```

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use media_archiver::core::import::{FileStatus, ImportPipeline, ImportReport};
use media_archiver::core::index::{IndexRebuilder, IndexReport, IndexStatus};
use media_archiver::core::scanner::WalkDirScanner;
use media_archiver::core::store::{self, DedupStore};
use media_archiver::error::{Result, StoreError};
use std::path::{Path, PathBuf};

/// Media Archiver - date-sorted photo/video archive with content dedup
#[derive(Parser, Debug)]
#[command(name = "media-archive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move media files from a source directory into the archive
    Import {
        /// Directory to import from
        source: PathBuf,

        /// Archive directory
        #[arg(default_value = ".")]
        target: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Rebuild the dedup store from the archived photo/ and video/ trees
    Index {
        /// Archive directory
        #[arg(default_value = ".")]
        target: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Print the number of records in the archive store
    Report {
        /// Archive directory
        #[arg(default_value = ".")]
        target: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    // A malformed invocation prints the usage block to stdout and does
    // nothing else
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(());
        }
        Err(_) => {
            println!("{}", Cli::command().render_help());
            return Ok(());
        }
    };

    match cli.command {
        Commands::Import {
            source,
            target,
            output,
        } => run_import(&source, &target, output),
        Commands::Index { target, output } => run_index(&target, output),
        Commands::Report { target, output } => run_report(&target, output),
    }
}

fn run_import(source: &Path, target: &Path, output: OutputFormat) -> Result<()> {
    let scan = WalkDirScanner::new().scan(source);
    for error in &scan.errors {
        eprintln!("{} {}", style("warning:").yellow().bold(), error);
    }

    if matches!(output, OutputFormat::Pretty) {
        println!(
            "Found {} media files in {}",
            style(scan.files.len()).cyan(),
            source.display()
        );
    }

    // Store-open failure is the one whole-run fatal error
    let store = DedupStore::open(target)?;
    let pipeline = ImportPipeline::new(&store, target);

    let progress = file_progress(scan.files.len());
    let report = pipeline.run(&scan.files, |index, _total, path, status| {
        progress.set_position(index as u64 + 1);
        match status {
            FileStatus::Imported { destination } => {
                progress.set_message(format!(
                    "imported {}",
                    relative_display(destination, target)
                ));
            }
            FileStatus::Duplicate { destination, .. } => {
                progress.set_message(format!(
                    "duplicate {}",
                    relative_display(destination, target)
                ));
            }
            FileStatus::Failed { reason } => {
                // Failures get their own line and survive the bar redraw
                progress.println(format!(
                    "{} {}: {}",
                    style("failed").red().bold(),
                    path.display(),
                    reason
                ));
            }
        }
    });
    progress.finish_and_clear();

    match output {
        OutputFormat::Pretty => print_import_summary(&report),
        OutputFormat::Json => print_json(&report),
    }

    Ok(())
}

fn run_index(target: &Path, output: OutputFormat) -> Result<()> {
    let rebuilder = IndexRebuilder::new(target);
    let files = rebuilder.archived_files();

    if matches!(output, OutputFormat::Pretty) {
        println!(
            "Found {} archived files in {}",
            style(files.len()).cyan(),
            target.display()
        );
    }

    let progress = file_progress(files.len());
    let report = rebuilder.run(&files, |index, _total, path, status| {
        progress.set_position(index as u64 + 1);
        match status {
            IndexStatus::Indexed { path: archived } => {
                progress.set_message(format!("indexed {}", relative_display(archived, target)));
            }
            IndexStatus::Failed { reason } => {
                progress.println(format!(
                    "{} {}: {}",
                    style("failed").red().bold(),
                    path.display(),
                    reason
                ));
            }
        }
    })?;
    progress.finish_and_clear();

    match output {
        OutputFormat::Pretty => print_index_summary(&report),
        OutputFormat::Json => print_json(&report),
    }

    Ok(())
}

fn run_report(target: &Path, output: OutputFormat) -> Result<()> {
    match store::record_count(target) {
        Ok(count) => match output {
            OutputFormat::Pretty => {
                println!(
                    "{} records in the archive store at {}",
                    style(count).cyan(),
                    target.display()
                );
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "records": count }));
            }
        },
        // An absent store is an answer, not a failure
        Err(StoreError::NotFound { path }) => match output {
            OutputFormat::Pretty => {
                println!("No record store found at {}", path.display());
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({ "error": "store_not_found", "path": path })
                );
            }
        },
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Single overwritten progress line on stdout: percentage plus the latest
/// per-file outcome
fn file_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}

fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

fn print_import_summary(report: &ImportReport) {
    let term = Term::stdout();
    term.write_line("").ok();
    term.write_line(&format!("{} Import complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} imported, {} duplicates, {} failures ({:.1}s)",
        style(report.imported).cyan(),
        style(report.duplicates).yellow(),
        style(report.failures.len()).red(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    for failure in &report.failures {
        term.write_line(&format!(
            "  {} {}: {}",
            style("✗").red(),
            failure.path.display(),
            failure.reason
        ))
        .ok();
    }
}

fn print_index_summary(report: &IndexReport) {
    let term = Term::stdout();
    term.write_line("").ok();
    term.write_line(&format!("{} Index rebuilt", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} of {} files recorded, {} failures ({:.1}s)",
        style(report.indexed).cyan(),
        report.total_files,
        style(report.failures.len()).red(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize report: {}", e),
    }
}
