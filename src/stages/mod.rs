//! Stage executors and their external collaborators
//!
//! Every third-party integration sits behind a small trait so the pipeline can
//! be driven by stubs in tests:
//!
//! - [`Pinger`]: [`XmlRpcPinger`] posts `weblogUpdates.ping`
//! - [`Shortener`]: [`TinyUrlShortener`] and [`IsGdShortener`]
//! - [`Publisher`]: [`MockPublisher`] (no network)
//! - [`TrafficProbe`]: [`HttpTrafficProbe`] issues HEAD requests
//! - [`IndexChecker`]: [`SearchPageIndexChecker`] scrapes a results page
//!
//! [`StageSet`] owns one set of collaborators plus the artifact store and
//! exposes one executor per stage. Per-item executors never fail; they fold
//! errors into the outcome. Artifact executors return `Err` when the file
//! cannot be written, which aborts the run.

mod backlinks;
mod feed;
mod indexing;
mod ping;
mod publish;
mod shorten;
mod traffic;
mod traits;

pub use backlinks::BacklinkPage;
pub use feed::FeedWriter;
pub use indexing::SearchPageIndexChecker;
pub use ping::XmlRpcPinger;
pub use publish::MockPublisher;
pub use shorten::{IsGdShortener, TinyUrlShortener};
pub use traffic::HttpTrafficProbe;
pub use traits::{IndexChecker, IndexVerdict, Pinger, Publisher, Shortener, TrafficProbe};

use crate::artifacts::ArtifactStore;
use crate::config::{Config, ShortenerKind, TrafficConfig};
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators and settings shared by all stage executors
#[derive(Clone)]
pub struct StageSet {
    pub(crate) pingers: Vec<Arc<dyn Pinger>>,
    pub(crate) shorteners: Vec<Arc<dyn Shortener>>,
    pub(crate) publishers: Vec<Arc<dyn Publisher>>,
    pub(crate) traffic_probe: Arc<dyn TrafficProbe>,
    pub(crate) index_checker: Arc<dyn IndexChecker>,
    pub(crate) store: ArtifactStore,
    pub(crate) feed: FeedWriter,
    pub(crate) backlinks: BacklinkPage,
    pub(crate) feed_file_name: String,
    pub(crate) backlinks_file_name: String,
    pub(crate) request_timeout: Duration,
    pub(crate) ping_title: String,
    pub(crate) traffic: TrafficConfig,
}

impl StageSet {
    /// Build the production collaborators described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the indexing
    /// selector does not parse.
    pub fn from_config(config: &Config) -> Result<Self> {
        let stages = &config.stages;
        let http = reqwest::Client::builder()
            .timeout(stages.request_timeout)
            .build()?;

        let pingers = stages
            .ping_services
            .iter()
            .map(|endpoint| Arc::new(XmlRpcPinger::new(http.clone(), endpoint)) as Arc<dyn Pinger>)
            .collect();

        let shorteners = stages
            .shorteners
            .iter()
            .map(|s| -> Arc<dyn Shortener> {
                match s.kind {
                    ShortenerKind::TinyUrl => {
                        Arc::new(TinyUrlShortener::new(http.clone(), &s.name, &s.endpoint))
                    }
                    ShortenerKind::IsGd => {
                        Arc::new(IsGdShortener::new(http.clone(), &s.name, &s.endpoint))
                    }
                }
            })
            .collect();

        let publishers = stages
            .publishers
            .iter()
            .map(|p| Arc::new(MockPublisher::new(&p.name, &p.simulated_url)) as Arc<dyn Publisher>)
            .collect();

        let index_checker = SearchPageIndexChecker::new(http.clone(), &stages.indexing)?;

        Ok(Self {
            pingers,
            shorteners,
            publishers,
            traffic_probe: Arc::new(HttpTrafficProbe::new(http)),
            index_checker: Arc::new(index_checker),
            store: ArtifactStore::new(&config.output.output_dir),
            feed: FeedWriter::new(stages.feed.clone()),
            backlinks: BacklinkPage::default(),
            feed_file_name: config.output.feed_file_name.clone(),
            backlinks_file_name: config.output.backlinks_file_name.clone(),
            request_timeout: stages.request_timeout,
            ping_title: stages.ping_title.clone(),
            traffic: stages.traffic.clone(),
        })
    }

    /// Replace the ping services
    pub fn with_pingers(mut self, pingers: Vec<Arc<dyn Pinger>>) -> Self {
        self.pingers = pingers;
        self
    }

    /// Replace the shortening services
    pub fn with_shorteners(mut self, shorteners: Vec<Arc<dyn Shortener>>) -> Self {
        self.shorteners = shorteners;
        self
    }

    /// Replace the publishing targets
    pub fn with_publishers(mut self, publishers: Vec<Arc<dyn Publisher>>) -> Self {
        self.publishers = publishers;
        self
    }

    /// Replace the traffic probe
    pub fn with_traffic_probe(mut self, probe: Arc<dyn TrafficProbe>) -> Self {
        self.traffic_probe = probe;
        self
    }

    /// Replace the index checker
    pub fn with_index_checker(mut self, checker: Arc<dyn IndexChecker>) -> Self {
        self.index_checker = checker;
        self
    }

    /// The artifact store stages write into
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

impl std::fmt::Debug for StageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSet")
            .field("pingers", &self.pingers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field(
                "shorteners",
                &self.shorteners.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field(
                "publishers",
                &self.publishers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("traffic_probe", &self.traffic_probe.name())
            .field("index_checker", &self.index_checker.name())
            .field("store", &self.store)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Run `call`, turning an exceeded `budget` into [`Error::Timeout`]
pub(crate) async fn bounded<T, F>(service: &str, budget: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            service: service.to_string(),
            after: budget,
        }),
    }
}

/// Map a non-success response to [`Error::ExternalService`]
pub(crate) fn check_status(service: &str, status: reqwest::StatusCode) -> Result<u16> {
    if status.is_success() {
        Ok(status.as_u16())
    } else {
        Err(Error::ExternalService {
            service: service.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        })
    }
}

/// Escape text for inclusion in XML or HTML
pub(crate) fn escape_markup(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
