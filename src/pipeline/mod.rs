//! Run orchestration
//!
//! [`Pipeline::run`] drives one [`Run`] through the fixed stage order
//! ping → rss → publish → shorten → backlinks → traffic → indexing, sending a
//! [`ProgressEvent`] for every stage entry, every finished item and every
//! stage exit. The event sequence always opens with one `start` and ends with
//! exactly one `complete` or `error`.
//!
//! Failures of individual items are folded into the stage outcome and never
//! stop the run. An error escaping a stage (an artifact that cannot be
//! written) ends the run with an `error` event; later stages do not execute.
//!
//! The pipeline does not watch for the client going away: events that can no
//! longer be delivered are discarded and the run finishes anyway.

mod validate;

pub use validate::validate_urls;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::stages::StageSet;
use crate::types::{
    IndexingOutcome, OutcomeStatus, PingOutcome, ProcessOptions, ProgressEvent, RunId, RunReport,
    Stage, StageResults, TrafficOutcome,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

/// One accepted processing request
#[derive(Clone, Debug)]
pub struct Run {
    /// Run identifier, echoed as `sessionId` in the report
    pub id: RunId,
    /// When the request was accepted
    pub created_at: DateTime<Utc>,
    /// Validated, de-duplicated input in submission order
    pub urls: Vec<Url>,
    /// Stage switches
    pub options: ProcessOptions,
}

impl Run {
    /// Create a run over `urls`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `urls` is empty.
    pub fn new(urls: Vec<Url>, options: ProcessOptions) -> Result<Self> {
        if urls.is_empty() {
            return Err(Error::Validation("at least one URL is required".into()));
        }
        Ok(Self {
            id: RunId::new(),
            created_at: Utc::now(),
            urls,
            options,
        })
    }
}

/// Executes runs against one set of stage collaborators
#[derive(Clone, Debug)]
pub struct Pipeline {
    stages: Arc<StageSet>,
    item_concurrency: usize,
    retention: Option<Duration>,
}

impl Pipeline {
    /// Create a pipeline over `stages`
    ///
    /// `item_concurrency` bounds how many items of one stage are in flight;
    /// values below 1 are treated as 1.
    pub fn new(stages: StageSet, item_concurrency: usize) -> Self {
        Self {
            stages: Arc::new(stages),
            item_concurrency: item_concurrency.max(1),
            retention: None,
        }
    }

    /// Build the production pipeline described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let stages = StageSet::from_config(config)?;
        Ok(Self::new(stages, config.stages.item_concurrency).with_retention(config.output.retention))
    }

    /// Prune artifacts older than `retention` after every run
    pub fn with_retention(mut self, retention: Option<Duration>) -> Self {
        self.retention = retention;
        self
    }

    /// The stage collaborators
    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    /// Execute `run`, sending its events to `sink`
    ///
    /// Returns the report that was sent in the `complete` event, or the error
    /// that was sent in the `error` event.
    pub async fn run(&self, run: Run, sink: mpsc::Sender<ProgressEvent>) -> Result<RunReport> {
        let events = Emitter::new(sink, run.id);
        info!(run_id = %run.id, urls = run.urls.len(), options = ?run.options, "run started");

        events
            .send(ProgressEvent::Start {
                message: format!("Processing {} URLs", run.urls.len()),
            })
            .await;

        let outcome = match self.execute(&run, &events).await {
            Ok(results) => {
                let report = RunReport {
                    session_id: run.id,
                    timestamp: run.created_at,
                    urls: run.urls.len(),
                    options: run.options,
                    results,
                };
                events
                    .send(ProgressEvent::Complete {
                        results: Box::new(report.clone()),
                    })
                    .await;
                info!(run_id = %run.id, "run completed");
                Ok(report)
            }
            Err(e) => {
                error!(run_id = %run.id, error = %e, "run aborted");
                events
                    .send(ProgressEvent::Error {
                        message: Some(e.to_string()),
                    })
                    .await;
                Err(e)
            }
        };

        // closes the stream before housekeeping
        drop(events);
        self.apply_retention().await;

        outcome
    }

    async fn execute(&self, run: &Run, events: &Emitter) -> Result<StageResults> {
        let mut results = StageResults::default();
        let urls = run.urls.as_slice();

        for stage in Stage::ALL {
            if !run.options.enables(stage) {
                debug!(run_id = %run.id, %stage, "stage disabled");
                continue;
            }

            info!(run_id = %run.id, %stage, "stage started");
            events.send(ProgressEvent::stage_started(stage)).await;

            match stage {
                Stage::Ping => {
                    let outcomes = self
                        .for_each_item(stage, urls, events, |i| self.stages.ping_url(&urls[i]))
                        .await;
                    results.ping = Some(outcomes);
                }
                Stage::Rss => results.rss = Some(self.stages.write_feed(urls).await?),
                Stage::Publish => results.publish = Some(self.stages.publish_all(urls).await),
                Stage::Shorten => results.shorten = Some(self.stages.shorten_all(urls).await),
                Stage::Backlinks => {
                    results.backlinks = Some(self.stages.write_backlinks(urls).await?)
                }
                Stage::Traffic => {
                    let outcomes = self
                        .for_each_item(stage, urls, events, |i| self.stages.visit_url(&urls[i]))
                        .await;
                    results.traffic = Some(outcomes);
                }
                Stage::Indexing => {
                    let outcomes = self
                        .for_each_item(stage, urls, events, |i| {
                            self.stages.check_indexing(&urls[i])
                        })
                        .await;
                    results.indexing = Some(outcomes);
                }
            }

            events.send(ProgressEvent::stage_finished(stage)).await;
        }

        Ok(results)
    }

    /// Run `work` for every URL, at most `item_concurrency` at a time
    ///
    /// Outcomes keep input order and each one is announced as soon as it and
    /// all earlier items are done.
    ///
    /// `work` takes the item index: its futures may only borrow through the
    /// closure's captures, or the run future stops being `Send`.
    async fn for_each_item<T, F, Fut>(
        &self,
        stage: Stage,
        urls: &[Url],
        events: &Emitter,
        work: F,
    ) -> Vec<T>
    where
        T: ItemOutcome,
        F: Fn(usize) -> Fut,
        Fut: Future<Output = T>,
    {
        futures::stream::iter((0..urls.len()).map(work))
            .buffered(self.item_concurrency)
            .then(|outcome| async move {
                events
                    .send(ProgressEvent::item_finished(stage, outcome.url(), outcome.status()))
                    .await;
                outcome
            })
            .collect()
            .await
    }

    async fn apply_retention(&self) {
        let Some(age) = self.retention else {
            return;
        };
        if let Err(e) = self.stages.store().prune_older_than(age).await {
            warn!(error = %e, "artifact retention failed");
        }
    }
}

/// Per-item stage outcome
trait ItemOutcome {
    fn url(&self) -> &str;
    fn status(&self) -> OutcomeStatus;
}

impl ItemOutcome for PingOutcome {
    fn url(&self) -> &str {
        &self.url
    }
    fn status(&self) -> OutcomeStatus {
        self.status
    }
}

impl ItemOutcome for TrafficOutcome {
    fn url(&self) -> &str {
        &self.url
    }
    fn status(&self) -> OutcomeStatus {
        self.status
    }
}

impl ItemOutcome for IndexingOutcome {
    fn url(&self) -> &str {
        &self.url
    }
    fn status(&self) -> OutcomeStatus {
        self.status
    }
}

/// Event sink for one run; delivery failures are logged once and ignored
struct Emitter {
    sink: mpsc::Sender<ProgressEvent>,
    run_id: RunId,
    detached: AtomicBool,
}

impl Emitter {
    fn new(sink: mpsc::Sender<ProgressEvent>, run_id: RunId) -> Self {
        Self {
            sink,
            run_id,
            detached: AtomicBool::new(false),
        }
    }

    async fn send(&self, event: ProgressEvent) {
        if self.sink.send(event).await.is_err() && !self.detached.swap(true, Ordering::Relaxed) {
            warn!(run_id = %self.run_id, "client disconnected; run continues without a listener");
        }
    }
}
