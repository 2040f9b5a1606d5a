//! Update-ping stage

use super::{Pinger, StageSet, bounded, check_status, escape_markup};
use crate::types::{CallOutcome, OutcomeStatus, PingOutcome};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

/// XML-RPC `weblogUpdates.ping` client for one endpoint
#[derive(Debug, Clone)]
pub struct XmlRpcPinger {
    client: reqwest::Client,
    endpoint: String,
}

impl XmlRpcPinger {
    /// Create a pinger for `endpoint`; the endpoint doubles as the service name
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

fn ping_payload(url: &Url, title: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<methodCall>
  <methodName>weblogUpdates.ping</methodName>
  <params>
    <param><value><string>{}</string></value></param>
    <param><value><string>{}</string></value></param>
  </params>
</methodCall>
"#,
        escape_markup(title),
        escape_markup(url.as_str())
    )
}

#[async_trait]
impl Pinger for XmlRpcPinger {
    async fn ping(&self, url: &Url, title: &str) -> crate::Result<u16> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(ping_payload(url, title))
            .send()
            .await?;
        check_status(&self.endpoint, response.status())
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

impl StageSet {
    /// Announce one URL to every ping service
    ///
    /// The URL counts as a success when at least one service accepted it.
    pub(crate) async fn ping_url(&self, url: &Url) -> PingOutcome {
        let mut services = Vec::with_capacity(self.pingers.len());

        for pinger in &self.pingers {
            let service = pinger.name();
            let call = pinger.ping(url, &self.ping_title);
            let outcome = match bounded(service, self.request_timeout, call).await {
                Ok(code) => {
                    debug!(%url, service, code, "ping accepted");
                    CallOutcome {
                        service: service.to_string(),
                        status: OutcomeStatus::Success,
                        detail: format!("HTTP {code}"),
                    }
                }
                Err(e) => {
                    warn!(%url, service, error = %e, "ping failed");
                    CallOutcome {
                        service: service.to_string(),
                        status: OutcomeStatus::Error,
                        detail: e.to_string(),
                    }
                }
            };
            services.push(outcome);
        }

        let accepted = services.iter().filter(|s| s.status.is_success()).count();
        let status = if accepted > 0 {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::Error
        };
        let detail = if services.is_empty() {
            "no ping services configured".to_string()
        } else {
            format!("{accepted}/{} services accepted", services.len())
        };

        PingOutcome {
            url: url.to_string(),
            status,
            detail,
            services,
        }
    }
}
