// src/config.rs
// =============================================================================
// Configuration for a scan.
//
// Three layers, later ones win:
// 1. Built-in defaults (Config::default)
// 2. An optional TOML file (--config image-guardian.toml)
// 3. Command-line flags (ScanArgs)
//
// Example file:
//
//   [source]
//   post_type = "post"
//   page_size = 500
//
//   [check]
//   timeout_secs = 5
//   pass_criterion = "200"     # or "2xx"
//
//   [scan]
//   concurrency = 8
//   inter_item_delay_ms = 250
//
//   [output]
//   path = "broken_images.json"
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::checker::{BodyFormat, CheckSettings, PassCriterion};
use crate::cli::ScanArgs;
use crate::content::PageQuery;
use crate::scan::ScanOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub check: CheckConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Which items to fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub post_type: String,
    pub page_size: usize,
    pub offset: usize,
    /// Timeout for listing calls to the content backend
    pub request_timeout_secs: u64,
}

/// How each image is probed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub pass_criterion: PassCriterion,
    pub user_agent: String,
}

/// How the scan is scheduled
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Max probes in flight
    pub concurrency: usize,
    /// Max items checked at once
    pub item_concurrency: usize,
    /// 0 disables the delay
    pub inter_item_delay_ms: u64,
    pub body_format: BodyFormat,
    /// Base for relative image references; unset means they count as broken
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            post_type: String::from("post"),
            page_size: 500,
            offset: 0,
            request_timeout_secs: 30,
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            timeout_secs: 5,
            max_redirects: 10,
            pass_criterion: PassCriterion::default(),
            user_agent: format!("image-guardian/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            concurrency: 8,
            item_concurrency: 1,
            inter_item_delay_ms: 0,
            body_format: BodyFormat::Html,
            base_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: PathBuf::from("broken_images.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: String::from("info"),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    // Applies command-line flags on top of the file/default values
    pub fn apply_overrides(&mut self, args: &ScanArgs) {
        if let Some(output) = &args.output {
            self.output.path = output.clone();
        }
        if let Some(post_type) = &args.post_type {
            self.source.post_type = post_type.clone();
        }
        if let Some(page_size) = args.page_size {
            self.source.page_size = page_size;
        }
        if let Some(offset) = args.offset {
            self.source.offset = offset;
        }
        if let Some(timeout) = args.timeout {
            self.check.timeout_secs = timeout;
        }
        if let Some(criterion) = args.pass_criterion {
            self.check.pass_criterion = criterion;
        }
        if let Some(concurrency) = args.concurrency {
            self.scan.concurrency = concurrency;
        }
        if let Some(item_concurrency) = args.item_concurrency {
            self.scan.item_concurrency = item_concurrency;
        }
        if let Some(delay_ms) = args.delay_ms {
            self.scan.inter_item_delay_ms = delay_ms;
        }
        if let Some(format) = args.format {
            self.scan.body_format = format;
        }
        if let Some(base_url) = &args.base_url {
            self.scan.base_url = Some(base_url.clone());
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.page_size == 0 {
            bail!("page_size must be greater than 0");
        }
        if self.source.post_type.trim().is_empty() {
            bail!("post_type must not be empty");
        }
        if self.check.timeout_secs == 0 {
            bail!("timeout_secs must be greater than 0");
        }
        if self.scan.concurrency == 0 {
            bail!("concurrency must be greater than 0");
        }
        if self.scan.item_concurrency == 0 {
            bail!("item_concurrency must be greater than 0");
        }
        if self.output.path.as_os_str().is_empty() {
            bail!("output path must not be empty");
        }
        self.base_url()?;
        Ok(())
    }

    fn base_url(&self) -> Result<Option<Url>> {
        self.scan
            .base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("Invalid base_url: {raw}")))
            .transpose()
    }

    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Builds the options the scanner runs with
    pub fn scan_options(&self) -> Result<ScanOptions> {
        let delay = (self.scan.inter_item_delay_ms > 0)
            .then(|| Duration::from_millis(self.scan.inter_item_delay_ms));

        Ok(ScanOptions {
            page: PageQuery {
                post_type: self.source.post_type.clone(),
                page_size: self.source.page_size,
                offset: self.source.offset,
                status: String::from("publish"),
            },
            check: CheckSettings {
                timeout: Duration::from_secs(self.check.timeout_secs),
                max_redirects: self.check.max_redirects,
                criterion: self.check.pass_criterion,
                user_agent: self.check.user_agent.clone(),
            },
            concurrency: self.scan.concurrency,
            item_concurrency: self.scan.item_concurrency,
            inter_item_delay: delay,
            body_format: self.scan.body_format,
            base_url: self.base_url()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_documented_behaviour() {
        let options = Config::default().scan_options().unwrap();
        assert_eq!(options.page.page_size, 500);
        assert_eq!(options.page.offset, 0);
        assert_eq!(options.page.status, "publish");
        assert_eq!(options.check.timeout, Duration::from_secs(5));
        assert_eq!(options.check.criterion, PassCriterion::Exact(200));
        assert_eq!(options.inter_item_delay, None);
        assert_eq!(Config::default().output.path, PathBuf::from("broken_images.json"));
    }

    #[test]
    fn test_partial_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[check]
pass_criterion = "2xx"
timeout_secs = 10

[scan]
inter_item_delay_ms = 250
body_format = "markdown"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.check.pass_criterion, PassCriterion::Success);
        assert_eq!(config.check.timeout_secs, 10);
        assert_eq!(config.scan.body_format, BodyFormat::Markdown);
        // Untouched sections keep their defaults
        assert_eq!(config.source.page_size, 500);

        let options = config.scan_options().unwrap();
        assert_eq!(options.inter_item_delay, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_log_format_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[logging]\nformat = \"json\"\n").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[logging]\nformat = \"yaml\"\n").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_invalid_pass_criterion_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[check]\npass_criterion = \"ok\"\n").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = Config::default();
        let args = ScanArgs {
            output: Some(PathBuf::from("out/report.json")),
            page_size: Some(50),
            concurrency: Some(2),
            pass_criterion: Some(PassCriterion::Exact(204)),
            base_url: Some("https://blog.example/".to_string()),
            ..ScanArgs::default()
        };
        config.apply_overrides(&args);

        assert_eq!(config.output.path, PathBuf::from("out/report.json"));
        let options = config.scan_options().unwrap();
        assert_eq!(options.page.page_size, 50);
        assert_eq!(options.concurrency, 2);
        assert_eq!(options.check.criterion, PassCriterion::Exact(204));
        assert_eq!(
            options.base_url.map(|u| u.to_string()),
            Some("https://blog.example/".to_string())
        );
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.scan.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.check.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }
}
