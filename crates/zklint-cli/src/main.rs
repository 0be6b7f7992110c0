//! zklint CLI - frontmatter validation for markdown knowledge bases

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use zklint_core::config::DEFAULT_CONFIG_PATH;
use zklint_core::{RunReport, ValidatorConfig};

#[derive(Parser)]
#[command(name = "zklint")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Validate frontmatter in markdown knowledge bases",
    long_about = "Validate frontmatter blocks across a markdown corpus.\n\nChecks: required fields • identifier format and uniqueness • dates • title/H1 consistency • cross-references"
)]
struct Cli {
    /// Markdown files to validate
    #[arg(value_name = "FILE", conflicts_with = "glob")]
    files: Vec<PathBuf>,

    /// Glob pattern selecting files to validate (e.g. "docs/**/*.md")
    #[arg(short, long, value_name = "PATTERN")]
    glob: Option<String>,

    /// Config file path
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Identifier cache path (overrides the config setting)
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match validate_command(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

fn validate_command(cli: &Cli) -> anyhow::Result<i32> {
    let files = selected_files(cli)?;

    let mut config = ValidatorConfig::load(&cli.config);
    if let Some(cache) = &cli.cache {
        config.cache.path = cache.clone();
    }

    let report = zklint_core::run(&files, &config);
    print_report(&report);

    Ok(if report.is_clean() { 0 } else { 1 })
}

fn selected_files(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    if let Some(pattern) = &cli.glob {
        let files: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        Ok(files)
    } else if !cli.files.is_empty() {
        Ok(cli.files.clone())
    } else {
        anyhow::bail!("no files specified; pass FILE arguments or --glob")
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!("{}", "═".repeat(60).dimmed());
    println!("{}", "Frontmatter Validation Results".bold());
    println!("{}", "═".repeat(60).dimmed());
    println!("Files validated: {}", report.validated);
    println!("Passed: {}", report.passed);
    println!("Failed: {}", report.failed());

    if !report.errors.is_empty() {
        println!();
        println!(
            "{} ({}):",
            "Errors".red().bold(),
            report.errors.len()
        );
        for diag in &report.errors {
            println!(
                "  {}:{} {}: {} {}",
                diag.file.display().to_string().dimmed(),
                diag.line,
                "error".red().bold(),
                diag.message,
                format!("[{}]", diag.rule).dimmed()
            );
            if let Some(suggestion) = &diag.suggestion {
                println!("    {} {}", "help:".cyan(), suggestion);
            }
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!(
            "{} ({}):",
            "Warnings".yellow().bold(),
            report.warnings.len()
        );
        for diag in &report.warnings {
            println!(
                "  {}:{} {}: {} {}",
                diag.file.display().to_string().dimmed(),
                diag.line,
                "warning".yellow().bold(),
                diag.message,
                format!("[{}]", diag.rule).dimmed()
            );
        }
    }

    println!();
    if report.is_clean() && report.warnings.is_empty() {
        println!("{}", "✓ All frontmatter is valid".green().bold());
    } else if report.is_clean() {
        println!("{}", "✓ All frontmatter is valid (with warnings)".green().bold());
    } else {
        println!("{}", "✗ Validation failed".red().bold());
    }
}
