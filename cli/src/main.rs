//! docoutline CLI - document outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docoutline::{
    extract_paths, load_document, BatchStatus, BatchSummary, JsonFormat, OutlineConfig,
    OutlineExtractor, ProcessingStatus, ScoringWeights,
};

#[derive(Parser)]
#[command(name = "docoutline")]
#[command(version)]
#[command(about = "Extract a document's title and H1-H3 outline as JSON", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

/// Configuration overrides shared by every subcommand.
#[derive(Args, Debug, Default)]
struct ConfigOverrides {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE", env = "OUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Processing budget per document, in seconds
    #[arg(long, global = true, value_name = "SECONDS", env = "OUTLINE_TIMEOUT")]
    timeout: Option<f64>,

    /// Minimum confidence for a heading
    #[arg(long, global = true, env = "OUTLINE_HEADING_THRESHOLD")]
    heading_threshold: Option<f32>,

    /// Minimum confidence for a title taken from a heading
    #[arg(long, global = true, env = "OUTLINE_TITLE_THRESHOLD")]
    title_threshold: Option<f32>,

    /// Font size bucket width in points
    #[arg(long, global = true, env = "OUTLINE_BUCKET_TOLERANCE")]
    bucket_tolerance: Option<f32>,

    /// Sub-score weights: size,weight,position,whitespace,pattern
    #[arg(long, global = true, value_name = "A,B,C,D,E", env = "OUTLINE_WEIGHTS")]
    weights: Option<ScoringWeights>,

    /// Score runs and batch documents in parallel
    #[arg(long, global = true, env = "OUTLINE_PARALLEL")]
    parallel: bool,
}

impl ConfigOverrides {
    /// Build the effective configuration: defaults, then the file, then flags.
    fn build(&self) -> Result<OutlineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => OutlineConfig::from_json_file(path)?,
            None => OutlineConfig::default(),
        };

        if let Some(seconds) = self.timeout {
            config = config.with_max_processing_time(seconds);
        }
        if let Some(threshold) = self.heading_threshold {
            config = config.with_heading_threshold(threshold);
        }
        if let Some(threshold) = self.title_threshold {
            config = config.with_title_threshold(threshold);
        }
        if let Some(tolerance) = self.bucket_tolerance {
            config = config.with_size_bucket_tolerance(tolerance);
        }
        if let Some(weights) = self.weights {
            config = config.with_weights(weights);
        }
        if self.parallel {
            config = config.with_parallel(true);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one run document
    Extract {
        /// Input run document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract outlines for every run document in a directory
    Batch {
        /// Directory of run documents (*.json)
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the outline files
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,
    },

    /// Show font statistics and heading candidates
    Info {
        /// Input run document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Write to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            compact,
        } => cmd_extract(&cli.overrides, &input, output.as_deref(), compact),
        Commands::Batch { input, output } => cmd_batch(&cli.overrides, &input, &output),
        Commands::Info { input } => cmd_info(&cli.overrides, &input),
        Commands::Config { file } => cmd_config(&cli.overrides, file.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(
    overrides: &ConfigOverrides,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new(overrides.build()?)?;
    let doc = load_document(input)?;
    let report = extractor.extract(&doc)?;

    if let ProcessingStatus::Degraded {
        pages_processed,
        pages_total,
        ..
    } = report.status
    {
        eprintln!(
            "{} processing budget exhausted after {} of {} pages; outline is partial",
            "Warning:".yellow().bold(),
            pages_processed,
            pages_total
        );
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = report.to_json(format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_batch(
    overrides: &ConfigOverrides,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new(overrides.build()?)?;
    let paths = collect_run_documents(input)?;
    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let summary = extract_paths(&extractor, &paths, |item| {
        pb.set_message(item.name.clone());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let write_errors = write_batch_outputs(output, &paths, &summary);

    println!("\n{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Documents".bold(), summary.len());
    println!("{}: {}", "Completed".bold(), summary.completed().to_string().green());
    println!("{}: {}", "Degraded".bold(), summary.degraded().to_string().yellow());
    println!("{}: {}", "Skipped".bold(), summary.skipped());
    println!("{}: {}", "Failed".bold(), summary.failed().to_string().red());
    if write_errors > 0 {
        println!("{}: {}", "Write errors".bold(), write_errors.to_string().red());
    }

    Ok(())
}

/// Write one outline file per extracted document and report the others.
///
/// A failed write is reported for that document and the rest are still
/// written. Returns the number of failed writes.
fn write_batch_outputs(output: &Path, paths: &[PathBuf], summary: &BatchSummary) -> usize {
    let mut write_errors = 0;
    for (path, item) in paths.iter().zip(&summary.items) {
        match (&item.status, &item.report) {
            (_, Some(report)) => {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                let target = output.join(format!("{}.json", stem));
                let written = report
                    .to_json(JsonFormat::Pretty)
                    .map_err(|e| e.to_string())
                    .and_then(|json| fs::write(&target, json).map_err(|e| e.to_string()));
                if let Err(e) = written {
                    write_errors += 1;
                    println!(
                        "  {} {}: cannot write {}: {}",
                        "failed".red(),
                        item.name,
                        target.display(),
                        e
                    );
                }
            }
            (BatchStatus::Skipped { reason }, None) => {
                println!("  {} {}: {}", "skipped".yellow(), item.name, reason);
            }
            (BatchStatus::Failed { error }, None) => {
                println!("  {} {}: {}", "failed".red(), item.name, error);
            }
            _ => {}
        }
    }
    write_errors
}

/// Run documents in a directory, sorted by name.
fn collect_run_documents(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn cmd_info(overrides: &ConfigOverrides, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new(overrides.build()?)?;
    let doc = load_document(input)?;
    let analysis = extractor.analyze(&doc)?;
    let report = extractor.extract(&doc)?;
    let profile = &analysis.profile;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.effective_page_count());
    println!("{}: {}", "Runs".bold(), analysis.runs.len());
    println!("{}: {}", "Repaired runs".bold(), analysis.encoding_fallbacks);

    println!();
    println!("{}", "Font Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {:.1}pt", "Body size".bold(), profile.body_size);
    println!(
        "{}: p75 {:.1} / p90 {:.1} / p95 {:.1} / max {:.1}",
        "Sizes".bold(),
        profile.p75,
        profile.p90,
        profile.p95,
        profile.max_size
    );
    println!("{}: {:.1}pt", "Line gap".bold(), profile.body_gap);
    println!("{}: {}", "Signatures".bold(), profile.signatures.len());

    println!();
    println!("{}", "Outline".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let title = if report.outline.has_title() {
        report.outline.title.as_str()
    } else {
        "(none)"
    };
    println!("{}: {} ({:?})", "Title".bold(), title, report.title_source);
    println!("{}: {}", "Candidates".bold(), report.stats.candidate_count);
    println!("{}: {}", "Headings".bold(), report.stats.heading_count);
    println!(
        "{}: {}",
        "Status".bold(),
        if report.is_degraded() {
            "degraded".yellow()
        } else {
            "complete".green()
        }
    );

    Ok(())
}

fn cmd_config(
    overrides: &ConfigOverrides,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = overrides.build()?;
    let json = serde_json::to_string_pretty(&config)?;

    if let Some(path) = file {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document outline extraction tool");
    println!();
    println!("License: MIT");
}
