//! Configuration types for linkindex

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use utoipa::ToSchema;

/// Main configuration
///
/// Fields are organized into logical sub-configs:
/// - [`output`](OutputConfig): where artifacts are written and how long they live
/// - [`stages`](StageConfig): external services and per-stage tuning
/// - [`server`](ApiConfig): HTTP surface
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Artifact output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Stage executor settings
    #[serde(default)]
    pub stages: StageConfig,

    /// REST API settings
    #[serde(default)]
    pub server: ApiConfig,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// Recognised variables: `PORT`, `LINKINDEX_OUTPUT_DIR`, `LINKINDEX_STATIC_DIR`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str::<Config>(&raw).map_err(|e| Error::Config {
                    message: format!("failed to parse {}: {}", path.display(), e),
                    key: None,
                })?
            }
            None => Config::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from a lookup function
    pub(crate) fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| Error::Config {
                message: format!("PORT must be a port number, got {port:?}"),
                key: Some("PORT".into()),
            })?;
            self.server.bind_address.set_port(port);
        }
        if let Some(dir) = lookup("LINKINDEX_OUTPUT_DIR") {
            self.output.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("LINKINDEX_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.stages.request_timeout.is_zero() {
            return Err(config_error("request_timeout must be greater than zero", "request_timeout"));
        }
        if self.stages.item_concurrency == 0 {
            return Err(config_error("item_concurrency must be at least 1", "item_concurrency"));
        }
        if self.stages.traffic.requests_per_url == 0 {
            return Err(config_error(
                "traffic.requests_per_url must be at least 1",
                "traffic.requests_per_url",
            ));
        }
        if self.output.feed_file_name.trim().is_empty() {
            return Err(config_error("feed_file_name must not be empty", "feed_file_name"));
        }
        if self.output.backlinks_file_name.trim().is_empty() {
            return Err(config_error(
                "backlinks_file_name must not be empty",
                "backlinks_file_name",
            ));
        }
        if self.output.feed_file_name == self.output.backlinks_file_name {
            return Err(config_error(
                "feed and backlinks artifacts need distinct file names",
                "backlinks_file_name",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

/// Artifact output configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OutputConfig {
    /// Directory shared by all runs (default: "output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Feed artifact name, overwritten by every run (default: "links.xml")
    #[serde(default = "default_feed_file_name")]
    pub feed_file_name: String,

    /// Backlinks page name, overwritten by every run (default: "backlinks.html")
    #[serde(default = "default_backlinks_file_name")]
    pub backlinks_file_name: String,

    /// Delete artifacts older than this after each run (None = keep forever)
    #[serde(default, with = "optional_duration_serde")]
    #[schema(value_type = Option<u64>)]
    pub retention: Option<Duration>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            feed_file_name: default_feed_file_name(),
            backlinks_file_name: default_backlinks_file_name(),
            retention: None,
        }
    }
}

/// Stage executor configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StageConfig {
    /// Upper bound for every outbound call (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,

    /// Items processed at once within one stage (default: 1, strictly sequential)
    #[serde(default = "default_item_concurrency")]
    pub item_concurrency: usize,

    /// Title sent with every ping (default: "Link Index")
    #[serde(default = "default_ping_title")]
    pub ping_title: String,

    /// XML-RPC `weblogUpdates.ping` endpoints
    #[serde(default = "default_ping_services")]
    pub ping_services: Vec<String>,

    /// URL shortening services, called in order for every URL
    #[serde(default = "default_shorteners")]
    pub shorteners: Vec<ShortenerConfig>,

    /// Simulated publishing targets
    #[serde(default = "default_publishers")]
    pub publishers: Vec<PublisherConfig>,

    /// Traffic simulation settings
    #[serde(default)]
    pub traffic: TrafficConfig,

    /// Search indexing check settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Feed document metadata
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            item_concurrency: default_item_concurrency(),
            ping_title: default_ping_title(),
            ping_services: default_ping_services(),
            shorteners: default_shorteners(),
            publishers: default_publishers(),
            traffic: TrafficConfig::default(),
            indexing: IndexingConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

/// Supported shortening APIs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShortenerKind {
    /// `GET {endpoint}?url=<encoded>` returning the short URL as plain text
    TinyUrl,
    /// `POST {endpoint}` with `format=simple&url=<encoded>` form body
    IsGd,
}

/// One URL shortening service
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortenerConfig {
    /// Key used in the shorten stage result (e.g. "tinyurl")
    pub name: String,
    /// Which API dialect the endpoint speaks
    pub kind: ShortenerKind,
    /// Endpoint URL
    pub endpoint: String,
}

/// One simulated publishing target
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PublisherConfig {
    /// Key used in the publish stage result (e.g. "pastebin")
    pub name: String,
    /// URL reported back as the publication location
    pub simulated_url: String,
}

/// Traffic simulation configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TrafficConfig {
    /// HEAD requests issued per URL (default: 3)
    #[serde(default = "default_requests_per_url")]
    pub requests_per_url: u32,

    /// Fixed delay after every request (default: 1 second)
    #[serde(default = "default_pacing", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub pacing: Duration,

    /// User agents picked at random per URL
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            requests_per_url: default_requests_per_url(),
            pacing: default_pacing(),
            user_agents: default_user_agents(),
        }
    }
}

/// Search indexing check configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexingConfig {
    /// Search page queried with `q=site:<host>`
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// User agent sent to the search page
    #[serde(default = "default_search_user_agent")]
    pub user_agent: String,

    /// CSS selector of the element holding the result count
    #[serde(default = "default_stats_selector")]
    pub stats_selector: String,

    /// Phrases that mean "nothing found" (matched case-insensitively)
    #[serde(default = "default_no_results_markers")]
    pub no_results_markers: Vec<String>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            user_agent: default_search_user_agent(),
            stats_selector: default_stats_selector(),
            no_results_markers: default_no_results_markers(),
        }
    }
}

/// Feed document metadata
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedConfig {
    /// Channel title
    #[serde(default = "default_feed_title")]
    pub title: String,
    /// Channel description
    #[serde(default = "default_feed_description")]
    pub description: String,
    /// Channel link
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// Language tag
    #[serde(default = "default_feed_language")]
    pub language: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: default_feed_title(),
            description: default_feed_description(),
            site_url: default_site_url(),
            language: default_feed_language(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Directory served at `/` for the browser front end (None = not served)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            static_dir: None,
        }
    }
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_feed_file_name() -> String {
    "links.xml".into()
}

fn default_backlinks_file_name() -> String {
    "backlinks.html".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_item_concurrency() -> usize {
    1
}

fn default_ping_title() -> String {
    "Link Index".into()
}

fn default_ping_services() -> Vec<String> {
    vec![
        "http://rpc.pingomatic.com/".into(),
        "http://blogsearch.google.com/ping/RPC2".into(),
        "http://ping.feedburner.com/".into(),
        "http://www.blogdigger.com/RPC2".into(),
        "http://services.newsgator.com/ngws/xmlrpcping.aspx".into(),
    ]
}

fn default_shorteners() -> Vec<ShortenerConfig> {
    vec![
        ShortenerConfig {
            name: "tinyurl".into(),
            kind: ShortenerKind::TinyUrl,
            endpoint: "https://tinyurl.com/api-create.php".into(),
        },
        ShortenerConfig {
            name: "is.gd".into(),
            kind: ShortenerKind::IsGd,
            endpoint: "https://is.gd/create.php".into(),
        },
    ]
}

fn default_publishers() -> Vec<PublisherConfig> {
    vec![
        PublisherConfig {
            name: "pastebin".into(),
            simulated_url: "https://pastebin.com/simulated".into(),
        },
        PublisherConfig {
            name: "justpaste".into(),
            simulated_url: "https://justpaste.it/simulated".into(),
        },
    ]
}

fn default_requests_per_url() -> u32 {
    3
}

fn default_pacing() -> Duration {
    Duration::from_secs(1)
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".into(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".into(),
    ]
}

fn default_search_url() -> String {
    "https://www.google.com/search".into()
}

fn default_search_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
}

fn default_stats_selector() -> String {
    "#result-stats".into()
}

fn default_no_results_markers() -> Vec<String> {
    vec!["0 results".into(), "0 resultados".into(), "did not match any".into()]
}

fn default_feed_title() -> String {
    "LinkIndex - Indexed Links".into()
}

fn default_feed_description() -> String {
    "Links submitted for indexing by LinkIndex".into()
}

fn default_site_url() -> String {
    "http://localhost:3000".into()
}

fn default_feed_language() -> String {
    "en-US".into()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
