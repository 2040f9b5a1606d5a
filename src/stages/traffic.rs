//! Traffic simulation stage

use super::{StageSet, TrafficProbe, bounded, check_status};
use crate::types::{OutcomeStatus, TrafficOutcome};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

/// Fallback when no user agents are configured
const DEFAULT_USER_AGENT: &str = concat!("linkindex/", env!("CARGO_PKG_VERSION"));

/// Visits URLs with HEAD requests carrying browser-like headers
#[derive(Debug, Clone)]
pub struct HttpTrafficProbe {
    client: reqwest::Client,
}

impl HttpTrafficProbe {
    /// Create a probe using `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrafficProbe for HttpTrafficProbe {
    async fn visit(&self, url: &Url, user_agent: &str) -> crate::Result<u16> {
        let response = self
            .client
            .head(url.clone())
            .header(USER_AGENT, user_agent)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(DNT, "1")
            .header(UPGRADE_INSECURE_REQUESTS, "1")
            .send()
            .await?;
        check_status(self.name(), response.status())
    }
}

impl StageSet {
    /// Visit one URL `requests_per_url` times, pausing `pacing` between visits
    ///
    /// The first failed visit decides the outcome; remaining visits are skipped.
    pub(crate) async fn visit_url(&self, url: &Url) -> TrafficOutcome {
        let planned = self.traffic.requests_per_url;
        let service = self.traffic_probe.name();

        for attempt in 0..planned {
            if attempt > 0 && !self.traffic.pacing.is_zero() {
                tokio::time::sleep(self.traffic.pacing).await;
            }

            let user_agent = self.pick_user_agent();
            let visit = self.traffic_probe.visit(url, &user_agent);
            match bounded(service, self.request_timeout, visit).await {
                Ok(code) => debug!(%url, attempt, code, "visit completed"),
                Err(e) => {
                    warn!(%url, attempt, error = %e, "visit failed");
                    return TrafficOutcome {
                        url: url.to_string(),
                        status: OutcomeStatus::Error,
                        detail: e.to_string(),
                        requests: attempt,
                    };
                }
            }
        }

        TrafficOutcome {
            url: url.to_string(),
            status: OutcomeStatus::Success,
            detail: format!("{planned} requests sent"),
            requests: planned,
        }
    }

    fn pick_user_agent(&self) -> String {
        let mut rng = rand::thread_rng();
        self.traffic
            .user_agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}
