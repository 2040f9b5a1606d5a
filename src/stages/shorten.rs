//! URL shortening stage

use super::{Shortener, StageSet, bounded, check_status};
use crate::error::{Error, Result};
use crate::types::{ShortenOutcome, ShortenResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// TinyURL-style API: `GET {endpoint}?url=<encoded>` answering with plain text
#[derive(Debug, Clone)]
pub struct TinyUrlShortener {
    client: reqwest::Client,
    name: String,
    endpoint: String,
}

impl TinyUrlShortener {
    /// Create a shortener registered as `name`
    pub fn new(client: reqwest::Client, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Shortener for TinyUrlShortener {
    async fn shorten(&self, url: &Url) -> Result<String> {
        let request_url = format!("{}?url={}", self.endpoint, urlencoding::encode(url.as_str()));
        let response = self.client.get(request_url).send().await?;
        check_status(&self.name, response.status())?;
        parse_short_link(&self.name, &response.text().await?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// is.gd-style API: `POST {endpoint}` with `format=simple&url=<encoded>`
#[derive(Debug, Clone)]
pub struct IsGdShortener {
    client: reqwest::Client,
    name: String,
    endpoint: String,
}

impl IsGdShortener {
    /// Create a shortener registered as `name`
    pub fn new(client: reqwest::Client, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Shortener for IsGdShortener {
    async fn shorten(&self, url: &Url) -> Result<String> {
        let body = format!("format=simple&url={}", urlencoding::encode(url.as_str()));
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        check_status(&self.name, response.status())?;
        parse_short_link(&self.name, &response.text().await?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Accept a plain-text answer only if it is an absolute http(s) URL
fn parse_short_link(service: &str, body: &str) -> Result<String> {
    let candidate = body.trim();
    match Url::parse(candidate) {
        Ok(link) if matches!(link.scheme(), "http" | "https") => Ok(candidate.to_string()),
        _ => {
            let preview: String = candidate.chars().take(80).collect();
            Err(Error::ExternalService {
                service: service.to_string(),
                message: format!("unexpected response: {preview:?}"),
            })
        }
    }
}

impl StageSet {
    /// Shorten every URL with every configured service
    pub(crate) async fn shorten_all(&self, urls: &[Url]) -> ShortenOutcome {
        let mut outcome = ShortenOutcome::new();

        for url in urls {
            let mut per_service = BTreeMap::new();
            for shortener in &self.shorteners {
                let service = shortener.name();
                let result = match bounded(service, self.request_timeout, shortener.shorten(url)).await {
                    Ok(short_url) => {
                        debug!(%url, service, %short_url, "shortened");
                        ShortenResult::Short { short_url }
                    }
                    Err(e) => {
                        warn!(%url, service, error = %e, "shortening failed");
                        ShortenResult::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                per_service.insert(service.to_string(), result);
            }
            outcome.insert(url.to_string(), per_service);
        }

        outcome
    }
}
