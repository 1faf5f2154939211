// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the config file (if any) and apply the flags on top
// 3. Set up logging
// 4. Build the content source for the chosen subcommand and run the scan
// 5. Print a summary and exit with a proper code
//
// Exit codes:
//   0 = report written
//   1 = report written, broken images found, and --fail-on-broken was set
//   2 = error (source unreachable, report unwritable, bad config)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - image extraction and reachability checks
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - TOML config and defaults
mod content; // src/content/ - where posts come from
mod error; // src/error.rs - error types
mod report; // src/report/ - the report and where it's written
mod scan; // src/scan/ - runs a whole scan

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, ScanArgs};
use config::{Config, LogFormat, LoggingConfig};
use content::{ContentSource, FileSource, WordPressSource};
use report::{render_report, FileSink, ReportSink, ScanReport};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Wordpress { site_url, scan } => {
            config.apply_overrides(&scan);
            config.validate()?;

            println!("🔍 Scanning WordPress site: {}", site_url);
            let source = WordPressSource::new(
                &site_url,
                config.source_timeout(),
                &config.check.user_agent,
            )?;
            handle_scan(&source, &config, &scan).await
        }
        Commands::File { path, scan } => {
            config.apply_overrides(&scan);
            config.validate()?;

            let source = FileSource::new(path);
            println!("🔍 Scanning export file: {}", source.path().display());
            handle_scan(&source, &config, &scan).await
        }
    }
}

// Runs the scan and reports the outcome
async fn handle_scan(source: &dyn ContentSource, config: &Config, args: &ScanArgs) -> Result<i32> {
    let options = config.scan_options()?;
    println!(
        "📄 Fetching up to {} {} item(s) from offset {}",
        options.page.page_size, options.page.post_type, options.page.offset
    );

    let sink = FileSink::new(&config.output.path);
    let report = scan::run_scan(source, &sink, options).await?;

    if args.json {
        let rendered = render_report(&report)?;
        print!("{}", String::from_utf8_lossy(&rendered));
    } else {
        print_table(&report);
    }

    println!("The list of broken images has been saved to {}", sink.location());

    if args.fail_on_broken && !report.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints the broken posts as a human-readable table
fn print_table(report: &ScanReport) {
    if report.is_empty() {
        println!("✅ No broken images found");
        return;
    }

    println!("{:<10} {:<50} {:<8}", "ID", "TITLE", "BROKEN");
    println!("{}", "=".repeat(70));

    for record in report.records() {
        println!(
            "{:<10} {:<50} {:<8}",
            record.item_id.as_str(),
            truncate(&record.title, 47),
            record.broken_urls.len()
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ❌ Posts with broken images: {}", report.len());
    println!("   🖼️  Broken image references: {}", report.broken_count());
}

// Shortens text for display without splitting a UTF-8 character
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let short: String = text.chars().take(max_chars).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}

// Logs go to stderr so `--json` output on stdout stays clean.
// RUST_LOG, when set, wins over the config.
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let directives = if verbose {
        "image_guardian=debug,info".to_string()
    } else {
        format!("image_guardian={},warn", logging.level)
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    match logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }
}
