//! Simulated publishing stage

use super::{Publisher, StageSet, bounded};
use crate::types::{OutcomeStatus, PublishOutcome};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{info, warn};
use url::Url;

/// Characters of the published content echoed to the log
const PREVIEW_CHARS: usize = 100;

/// Publisher that reports a fixed location without calling anything
#[derive(Debug, Clone)]
pub struct MockPublisher {
    name: String,
    simulated_url: String,
}

impl MockPublisher {
    /// Create a target named `name` that always "publishes" to `simulated_url`
    pub fn new(name: impl Into<String>, simulated_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            simulated_url: simulated_url.into(),
        }
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, content: &str) -> crate::Result<String> {
        let preview: String = content.chars().take(PREVIEW_CHARS).collect();
        info!(target_name = %self.name, %preview, "simulated publication");
        Ok(self.simulated_url.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl StageSet {
    /// Publish the newline-joined URL list to every target
    ///
    /// A failing target is recorded and does not affect the others.
    pub(crate) async fn publish_all(&self, urls: &[Url]) -> BTreeMap<String, PublishOutcome> {
        let content = urls.iter().map(Url::as_str).collect::<Vec<_>>().join("\n");
        let mut outcomes = BTreeMap::new();

        for publisher in &self.publishers {
            let name = publisher.name();
            let outcome = match bounded(name, self.request_timeout, publisher.publish(&content)).await
            {
                Ok(location) => PublishOutcome {
                    status: OutcomeStatus::Success,
                    url: Some(location),
                    error: None,
                },
                Err(e) => {
                    warn!(target_name = name, error = %e, "publication failed");
                    PublishOutcome {
                        status: OutcomeStatus::Error,
                        url: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.insert(name.to_string(), outcome);
        }

        outcomes
    }
}
