//! HTTP driver for the panel

use super::state::Panel;
use super::update::{Effect, Msg, update};
use crate::error::{ApiError, Error, Result};
use crate::protocol::EventDecoder;
use crate::types::{ArtifactFile, ProcessOptions, ProcessRequest};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Executes panel effects against a running server
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    save_dir: PathBuf,
}

impl ApiClient {
    /// Client for the server at `base` (e.g. `http://127.0.0.1:3000`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base` is not an absolute URL.
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|e| Error::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        // no overall timeout: a run's stream stays open for its whole duration
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base,
            save_dir: PathBuf::from("."),
        })
    }

    /// Directory exported logs are written to (default: current directory)
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| Error::InvalidUrl {
            url: format!("{}{path}", self.base),
            reason: e.to_string(),
        })
    }

    /// Fetch the generated-files listing
    pub async fn list_files(&self) -> Result<Vec<ArtifactFile>> {
        let response = self.http.get(self.endpoint("files")?).send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// Apply `msg` and run every effect it causes, calling `observe` after
    /// each state change
    pub async fn dispatch<F>(&self, panel: &mut Panel, msg: Msg, observe: &mut F)
    where
        F: FnMut(&Panel),
    {
        let mut effects: VecDeque<Effect> = apply(panel, msg, observe).into();

        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::SubmitRun { urls, options } => {
                    let follow_up = self.stream_run(panel, urls, options, observe).await;
                    effects.extend(follow_up);
                }
                Effect::RefreshFiles => match self.list_files().await {
                    Ok(files) => effects.extend(apply(panel, Msg::FilesLoaded(files), observe)),
                    Err(e) => warn!(error = %e, "failed to refresh file list"),
                },
                Effect::SaveLog {
                    file_name,
                    contents,
                } => {
                    let path = self.save_dir.join(file_name);
                    match tokio::fs::write(&path, contents).await {
                        Ok(()) => info!(path = %path.display(), "log exported"),
                        Err(e) => warn!(path = %path.display(), error = %e, "failed to export log"),
                    }
                }
            }
        }
    }

    async fn stream_run<F>(
        &self,
        panel: &mut Panel,
        urls: Vec<String>,
        options: ProcessOptions,
        observe: &mut F,
    ) -> Vec<Effect>
    where
        F: FnMut(&Panel),
    {
        let body = ProcessRequest {
            urls,
            options: Some(options),
        };
        let request = match self.endpoint("process") {
            Ok(endpoint) => self.http.post(endpoint).json(&body),
            Err(e) => return apply(panel, Msg::TransportFailed(e.to_string()), observe),
        };

        let mut response = match request.send().await {
            Ok(response) => match error_for_status(response).await {
                Ok(response) => response,
                Err(e) => return apply(panel, Msg::TransportFailed(e.to_string()), observe),
            },
            Err(e) => return apply(panel, Msg::TransportFailed(e.to_string()), observe),
        };

        let mut decoder = EventDecoder::new();
        let mut effects = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    debug!(bytes = chunk.len(), "stream chunk");
                    for decoded in decoder.feed(&chunk) {
                        effects.extend(apply(panel, decoded.into(), observe));
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    effects.extend(apply(panel, Msg::TransportFailed(e.to_string()), observe));
                    return effects;
                }
            }
        }

        for decoded in decoder.finish() {
            effects.extend(apply(panel, decoded.into(), observe));
        }
        effects.extend(apply(panel, Msg::StreamEnded, observe));
        effects
    }
}

fn apply<F>(panel: &mut Panel, msg: Msg, observe: &mut F) -> Vec<Effect>
where
    F: FnMut(&Panel),
{
    let (next, effects) = update(std::mem::take(panel), msg);
    *panel = next;
    observe(panel);
    effects
}

/// Turn a non-success response into an error carrying the server's message
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiError>().await {
        Ok(body) => body.error,
        Err(_) => format!("HTTP {}", status.as_u16()),
    };
    Err(Error::ExternalService {
        service: "linkindex".into(),
        message,
    })
}
