// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every scan flag is optional: when a flag is missing, the value from the
// config file (or the built-in default) is used. See src/config.rs.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::checker::{BodyFormat, PassCriterion};
use crate::config::LogFormat;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "image-guardian",
    version,
    about = "A CLI tool to find published posts with broken images",
    long_about = "image-guardian fetches published posts, checks every embedded image with a \
                  HEAD request, and writes a JSON report of the posts whose images are unreachable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

// Where the content comes from
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan published posts of a WordPress site (REST API)
    ///
    /// Example: image-guardian wordpress https://blog.example.com --page-size 200
    Wordpress {
        /// Site URL (e.g., https://blog.example.com)
        site_url: String,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Scan items from a JSON export file
    ///
    /// Example: image-guardian file posts.json --format markdown
    File {
        /// Path to a JSON array of {id, title, permalink, body}
        path: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

// Flags shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct ScanArgs {
    /// Where to write the report [default: broken_images.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Post type to scan (post, page, or a custom type) [default: post]
    #[arg(long)]
    pub post_type: Option<String>,

    /// Number of items to fetch [default: 500]
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Number of items to skip [default: 0]
    #[arg(long)]
    pub offset: Option<usize>,

    /// Per-image timeout in seconds [default: 5]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Final status that counts as reachable: a code, or "2xx" [default: 200]
    #[arg(long)]
    pub pass_criterion: Option<PassCriterion>,

    /// Max image checks in flight [default: 8]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Max posts checked at once [default: 1]
    #[arg(long)]
    pub item_concurrency: Option<usize>,

    /// Pause between posts, in milliseconds [default: 0]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Markup of post bodies [default: html]
    #[arg(long, value_enum)]
    pub format: Option<BodyFormat>,

    /// Resolve relative image paths against this URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Also print the report JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 1 when broken images are found
    #[arg(long)]
    pub fail_on_broken: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls all fields of ScanArgs into the subcommand
//    - Both `wordpress` and `file` get the same flags without repeating them
//
// 2. Why Option<usize> instead of default_value_t?
//    - With a default, we couldn't tell "user typed 500" from "not given"
//    - None means "use the config file value"
//
// 3. How does --pass-criterion become a PassCriterion?
//    - PassCriterion implements FromStr (see checker/http.rs)
//    - clap uses FromStr for any type that has it
//
// 4. global = true?
//    - The flag may appear before or after the subcommand name
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wordpress_command() {
        let cli = Cli::try_parse_from([
            "image-guardian",
            "wordpress",
            "https://blog.example.com",
            "--page-size",
            "100",
            "--pass-criterion",
            "2xx",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Wordpress { site_url, scan } => {
                assert_eq!(site_url, "https://blog.example.com");
                assert_eq!(scan.page_size, Some(100));
                assert_eq!(scan.pass_criterion, Some(PassCriterion::Success));
                assert_eq!(scan.output, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::try_parse_from([
            "image-guardian",
            "--config",
            "guardian.toml",
            "file",
            "posts.json",
            "--format",
            "markdown",
            "-o",
            "report.json",
            "--fail-on-broken",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("guardian.toml")));
        match cli.command {
            Commands::File { path, scan } => {
                assert_eq!(path, PathBuf::from("posts.json"));
                assert_eq!(scan.format, Some(BodyFormat::Markdown));
                assert_eq!(scan.output, Some(PathBuf::from("report.json")));
                assert!(scan.fail_on_broken);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_format_is_checked() {
        let cli = Cli::try_parse_from(["image-guardian", "file", "posts.json", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));

        let result =
            Cli::try_parse_from(["image-guardian", "--log-format", "yaml", "file", "posts.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_pass_criterion() {
        let result = Cli::try_parse_from([
            "image-guardian",
            "file",
            "posts.json",
            "--pass-criterion",
            "sometimes",
        ]);
        assert!(result.is_err());
    }
}
