// src/checker/http.rs
// =============================================================================
// This module checks whether image URLs are reachable.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Follows redirects; only the final status counts
// - Every request has a hard timeout, so nothing waits forever
// - Classifies failures (timeout, DNS, TLS, bad status, etc.)
//
// The pass criterion is strict by default: the final status must be exactly
// 200. A redirect that ends on 204 or 206 is still broken unless the caller
// opts into PassCriterion::Success.
//
// check() never returns an error. A failed probe IS the answer, so it comes
// back as ReachabilityResult { reachable: false, .. } with the cause filled in.
// =============================================================================

use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// What a final HTTP status must look like to count as reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PassCriterion {
    /// The final status must equal this code (default: 200)
    Exact(u16),
    /// Any 2xx final status
    Success,
}

impl PassCriterion {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            PassCriterion::Exact(code) => status == *code,
            PassCriterion::Success => (200..300).contains(&status),
        }
    }
}

impl Default for PassCriterion {
    fn default() -> Self {
        PassCriterion::Exact(200)
    }
}

impl fmt::Display for PassCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassCriterion::Exact(code) => write!(f, "{code}"),
            PassCriterion::Success => f.write_str("2xx"),
        }
    }
}

// "200" -> Exact(200), "2xx" -> Success
impl FromStr for PassCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("2xx") {
            return Ok(PassCriterion::Success);
        }
        match s.parse::<u16>() {
            Ok(code) if (100..600).contains(&code) => Ok(PassCriterion::Exact(code)),
            _ => Err(format!(
                "invalid pass criterion '{s}': expected an HTTP status code or '2xx'"
            )),
        }
    }
}

impl TryFrom<String> for PassCriterion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PassCriterion> for String {
    fn from(value: PassCriterion) -> Self {
        value.to_string()
    }
}

/// Why a probe did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "cause", content = "detail", rename_all = "snake_case")]
pub enum CheckFailure {
    /// Got an answer, but not the one we accept
    #[error("HTTP {0}")]
    Status(u16),
    /// No definitive answer within the timeout
    #[error("request timed out")]
    Timeout,
    /// Could not resolve hostname
    #[error("could not resolve hostname")]
    Dns,
    /// SSL/TLS certificate or handshake error
    #[error("TLS error")]
    Tls,
    /// Connection refused / reset / unreachable
    #[error("connection failed")]
    Connect,
    /// Redirect chain longer than the limit (or a loop)
    #[error("too many redirects")]
    TooManyRedirects,
    /// Not something we can turn into a request (relative URL, data:, ...)
    #[error("unresolvable URL")]
    Unresolvable,
    /// Anything else reqwest reports
    #[error("{0}")]
    Other(String),
}

/// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityResult {
    /// The URL that was checked
    pub url: String,
    pub reachable: bool,
    /// Final status after redirects, if any response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckFailure>,
}

impl ReachabilityResult {
    fn failed(url: String, http_status: Option<u16>, error: CheckFailure) -> Self {
        ReachabilityResult {
            url,
            reachable: false,
            http_status,
            error: Some(error),
        }
    }
}

/// Probe settings
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Bound on the whole probe, redirects included
    pub timeout: Duration,
    pub max_redirects: usize,
    pub criterion: PassCriterion,
    pub user_agent: String,
}

impl Default for CheckSettings {
    fn default() -> Self {
        CheckSettings {
            timeout: Duration::from_secs(5),
            max_redirects: 10,
            criterion: PassCriterion::default(),
            user_agent: format!("image-guardian/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Checks image URLs with HEAD requests
///
/// Holds one reqwest Client, so connections are pooled across all checks
/// of a scan.
#[derive(Debug, Clone)]
pub struct ReachabilityChecker {
    client: Client,
    criterion: PassCriterion,
}

impl ReachabilityChecker {
    pub fn new(settings: &CheckSettings) -> Result<Self, reqwest::Error> {
        let redirect_policy = if settings.max_redirects == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(settings.max_redirects)
        };

        let client = Client::builder()
            .timeout(settings.timeout)
            .redirect(redirect_policy)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(ReachabilityChecker {
            client,
            criterion: settings.criterion,
        })
    }

    // Checks a single URL
    //
    // Returns reachable=true iff the final status (after redirects) passes
    // the criterion. Everything else, including URLs we can't even request,
    // comes back as reachable=false with a cause.
    pub async fn check(&self, url: &str) -> ReachabilityResult {
        let target = match request_target(url) {
            Some(target) => target,
            None => {
                debug!(url, "unresolvable image reference");
                return ReachabilityResult::failed(url.to_string(), None, CheckFailure::Unresolvable);
            }
        };

        let result = match self.client.head(target).send().await {
            Ok(response) => self.analyze_status(url, response.status().as_u16()),
            Err(e) => categorize_error(url, e),
        };

        debug!(
            url,
            reachable = result.reachable,
            status = ?result.http_status,
            error = ?result.error,
            "checked image"
        );
        result
    }

    fn analyze_status(&self, url: &str, status: u16) -> ReachabilityResult {
        if self.criterion.accepts(status) {
            ReachabilityResult {
                url: url.to_string(),
                reachable: true,
                http_status: Some(status),
                error: None,
            }
        } else {
            ReachabilityResult::failed(url.to_string(), Some(status), CheckFailure::Status(status))
        }
    }
}

// Only absolute http(s) URLs with a host can become a request
fn request_target(url: &str) -> Option<Url> {
    let parsed = Url::parse(url).ok()?;
    let scheme_ok = parsed.scheme() == "http" || parsed.scheme() == "https";
    if scheme_ok && parsed.has_host() {
        Some(parsed)
    } else {
        None
    }
}

// Categorizes reqwest errors into failure causes
//
// reqwest's top-level message is generic ("error sending request for url
// (...)") and carries the URL itself, so only the source chain below it is
// searched. That is where "dns error" or "invalid peer certificate" shows up.
fn categorize_error(url: &str, error: reqwest::Error) -> ReachabilityResult {
    let causes = error.source().map(error_chain).unwrap_or_default().to_lowercase();

    let cause = if error.is_timeout() {
        CheckFailure::Timeout
    } else if error.is_redirect() {
        CheckFailure::TooManyRedirects
    } else if error.is_builder() {
        CheckFailure::Unresolvable
    } else if causes.contains("dns error") || causes.contains("failed to lookup address") {
        CheckFailure::Dns
    } else if causes.contains("certificate") || causes.contains("tls") || causes.contains("ssl") {
        CheckFailure::Tls
    } else if error.is_connect() {
        CheckFailure::Connect
    } else {
        CheckFailure::Other(error_chain(&error))
    };

    ReachabilityResult::failed(url.to_string(), None, cause)
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD instead of GET?
//    - HEAD asks for the headers only, so we never download the image
//    - A scan can touch thousands of images; bodies would waste bandwidth
//
// 2. Where do redirects go?
//    - reqwest follows them for us (redirect::Policy::limited)
//    - response.status() is the status of the LAST hop
//    - A redirect loop turns into an error with is_redirect() == true
//
// 3. Why #[serde(try_from = "String")] on PassCriterion?
//    - In the TOML config we want to write pass_criterion = "200" or "2xx"
//    - serde reads a String and runs our TryFrom impl on it
//
// 4. Why is check() not returning Result?
//    - A broken image is the whole point of the tool, not an error
//    - Callers just look at `reachable`; they never need `?` here
// -----------------------------------------------------------------------------
