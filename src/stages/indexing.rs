//! Search indexing check stage

use super::{IndexChecker, IndexVerdict, StageSet, bounded, check_status};
use crate::config::IndexingConfig;
use crate::error::{Error, Result};
use crate::types::{IndexingOutcome, OutcomeStatus};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Queries a search results page for `site:<host>` and reads the result count
///
/// A host is considered indexed when the result-count element exists, is not
/// empty, does not contain any configured "no results" phrase, and does not
/// start with a count of zero.
#[derive(Debug, Clone)]
pub struct SearchPageIndexChecker {
    client: reqwest::Client,
    search_url: String,
    user_agent: String,
    stats_selector: String,
    no_results_markers: Vec<Regex>,
    count_pattern: Regex,
}

impl SearchPageIndexChecker {
    /// Create a checker from the indexing settings
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the stats selector is not valid CSS or a
    /// marker cannot be compiled.
    pub fn new(client: reqwest::Client, config: &IndexingConfig) -> Result<Self> {
        Selector::parse(&config.stats_selector).map_err(|e| Error::Config {
            message: format!("invalid stats selector {:?}: {e:?}", config.stats_selector),
            key: Some("indexing.stats_selector".into()),
        })?;
        let count_pattern = Regex::new(r"\d[\d.,\x{a0}]*").map_err(|e| Error::Other(e.to_string()))?;
        let no_results_markers = config
            .no_results_markers
            .iter()
            .map(String::as_str)
            .map(marker_pattern)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            user_agent: config.user_agent.clone(),
            stats_selector: config.stats_selector.clone(),
            no_results_markers,
            count_pattern,
        })
    }

    /// Apply the heuristic to a fetched results page
    pub(crate) fn judge(&self, page: &str) -> Result<IndexVerdict> {
        let selector = Selector::parse(&self.stats_selector).map_err(|e| Error::Config {
            message: format!("invalid stats selector: {e:?}"),
            key: Some("indexing.stats_selector".into()),
        })?;
        let document = Html::parse_document(page);

        let stats = document
            .select(&selector)
            .next()
            .map(|element| {
                element
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let says_nothing_found = self.no_results_markers.iter().any(|m| m.is_match(&stats));
        let zero_count = self
            .count_pattern
            .find(&stats)
            .map(|m| m.as_str().chars().filter(char::is_ascii_digit).all(|c| c == '0'))
            .unwrap_or(false);

        Ok(IndexVerdict {
            indexed: !stats.is_empty() && !says_nothing_found && !zero_count,
            stats,
        })
    }
}

/// Case-insensitive match of `marker` that never starts inside a number, so
/// "0 results" does not match "1,230 results"
fn marker_pattern(marker: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)(?:^|[^\d.,\x{{a0}}]){}", regex::escape(marker))).map_err(|e| {
        Error::Config {
            message: format!("invalid no-results marker {marker:?}: {e}"),
            key: Some("indexing.no_results_markers".into()),
        }
    })
}

#[async_trait]
impl IndexChecker for SearchPageIndexChecker {
    async fn check(&self, url: &Url) -> Result<IndexVerdict> {
        let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".into(),
        })?;

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", format!("site:{host}"))])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;
        check_status(self.name(), response.status())?;

        let page = response.text().await?;
        self.judge(&page)
    }

    fn name(&self) -> &str {
        "search"
    }
}

impl StageSet {
    /// Look up one URL in the search index
    ///
    /// `status` reports whether the lookup worked; `indexed` is the verdict.
    pub(crate) async fn check_indexing(&self, url: &Url) -> IndexingOutcome {
        let checker = &self.index_checker;
        match bounded(checker.name(), self.request_timeout, checker.check(url)).await {
            Ok(verdict) => {
                debug!(%url, indexed = verdict.indexed, stats = %verdict.stats, "indexing checked");
                let detail = if verdict.stats.is_empty() {
                    "no result count on page".to_string()
                } else {
                    verdict.stats
                };
                IndexingOutcome {
                    url: url.to_string(),
                    status: OutcomeStatus::Success,
                    detail,
                    indexed: verdict.indexed,
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "indexing check failed");
                IndexingOutcome {
                    url: url.to_string(),
                    status: OutcomeStatus::Error,
                    detail: e.to_string(),
                    indexed: false,
                }
            }
        }
    }
}
