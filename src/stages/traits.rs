//! Collaborator traits for the external-facing stages

use async_trait::async_trait;
use url::Url;

/// Verdict of one search-indexing lookup
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexVerdict {
    /// Whether the host appears to be indexed
    pub indexed: bool,
    /// Raw result-count text the verdict was derived from (may be empty)
    pub stats: String,
}

/// Notifies one update-ping service about a URL
///
/// Implementations make exactly one outbound call per invocation. The caller
/// applies the time budget, so implementations need not.
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Announce `url` under `title`
    ///
    /// Returns the HTTP status the service answered with.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service answers with a
    /// non-success status.
    async fn ping(&self, url: &Url, title: &str) -> crate::Result<u16>;

    /// Name used in stage results and logs
    fn name(&self) -> &str;
}

/// Produces a short link for a URL
#[async_trait]
pub trait Shortener: Send + Sync {
    /// Shorten `url`, returning the short link
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, answers with a failure
    /// status, or returns something that is not a URL.
    async fn shorten(&self, url: &Url) -> crate::Result<String>;

    /// Key under which results are stored (e.g. "tinyurl")
    fn name(&self) -> &str;
}

/// Publishes the submitted URL list somewhere public
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `content`, returning where it can be found
    async fn publish(&self, content: &str) -> crate::Result<String>;

    /// Key under which the outcome is stored (e.g. "pastebin")
    fn name(&self) -> &str;
}

/// Issues one visit to a URL
#[async_trait]
pub trait TrafficProbe: Send + Sync {
    /// Visit `url` presenting `user_agent`, returning the HTTP status
    async fn visit(&self, url: &Url, user_agent: &str) -> crate::Result<u16>;

    /// Name used in logs
    fn name(&self) -> &str {
        "traffic"
    }
}

/// Decides whether a URL's host is present in a search index
///
/// The heuristic lives entirely in the implementation; the pipeline only
/// records the verdict.
#[async_trait]
pub trait IndexChecker: Send + Sync {
    /// Look up `url`
    async fn check(&self, url: &Url) -> crate::Result<IndexVerdict>;

    /// Name used in logs
    fn name(&self) -> &str;
}
