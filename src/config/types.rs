use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default User-Agent sent when the configured headers do not set one
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:78.0) Gecko/20100101 Firefox/78.0";

/// Main configuration structure for Link-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl engine configuration, immutable for one crawl invocation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum depth to crawl from seed URLs (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of workers, and so the maximum number of concurrent fetches
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// Maximum response body size in bytes
    #[serde(rename = "max-body-size")]
    pub max_body_size: Option<u64>,

    /// Timeout for a single fetch, in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Admit hosts related to the origin host by suffix containment
    #[serde(rename = "follow-subdomains")]
    pub follow_subdomains: bool,

    /// Admit only paths under the origin page's path
    #[serde(rename = "restrict-to-path-prefix")]
    pub restrict_to_path_prefix: bool,

    /// Record each URL at most once in the results
    #[serde(rename = "require-unique-results")]
    pub require_unique_results: bool,
}

impl CrawlConfig {
    /// Per-request timeout as a duration
    pub fn per_request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Number of workers to spawn (never zero)
    pub fn worker_count(&self) -> usize {
        self.max_concurrency.max(1) as usize
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_concurrency: 8,
            max_body_size: None,
            timeout_secs: None,
            follow_subdomains: false,
            restrict_to_path_prefix: false,
            require_unique_results: true,
        }
    }
}

/// HTTP transport configuration for the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// User-Agent used unless `headers` already sets one
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Follow HTTP redirects
    #[serde(rename = "follow-redirects")]
    pub follow_redirects: bool,

    /// Verify TLS certificates
    #[serde(rename = "tls-verify")]
    pub tls_verify: bool,

    /// Proxy URL applied to all requests
    pub proxy: Option<String>,
}

impl HttpConfig {
    /// Headers to send, with the User-Agent filled in if absent
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.headers.clone();
        let has_user_agent = headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("user-agent"));
        if !has_user_agent {
            headers.insert("User-Agent".to_string(), self.user_agent.clone());
        }
        headers
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_redirects: true,
            tls_verify: true,
            proxy: None,
        }
    }
}

/// Result export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One URL per line, optionally prefixed with source and origin
    #[default]
    Lines,
    /// JSON array of `{url, source, where}`
    Json,
    /// CSV with header `URL,Source,Where`
    Csv,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Prefix lines with the source kind
    #[serde(rename = "show-source")]
    pub show_source: bool,

    /// Prefix lines with the page the URL was found on
    #[serde(rename = "show-where")]
    pub show_where: bool,

    /// Print results as they are discovered
    pub live: bool,

    /// Write the export to this file instead of stdout
    pub path: Option<String>,
}
