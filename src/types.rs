//! Core types and events for linkindex

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of the fixed promotion pipeline
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Notify XML-RPC ping services
    Ping,
    /// Write the feed document
    Rss,
    /// Publish the URL list to (simulated) paste services
    Publish,
    /// Shorten every URL with every configured service
    Shorten,
    /// Write the backlinks page
    Backlinks,
    /// Send paced HEAD requests to every URL
    Traffic,
    /// Check whether every URL's host appears in search results
    Indexing,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 7] = [
        Stage::Ping,
        Stage::Rss,
        Stage::Publish,
        Stage::Shorten,
        Stage::Backlinks,
        Stage::Traffic,
        Stage::Indexing,
    ];

    /// Wire and aggregate-key name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ping => "ping",
            Stage::Rss => "rss",
            Stage::Publish => "publish",
            Stage::Shorten => "shorten",
            Stage::Backlinks => "backlinks",
            Stage::Traffic => "traffic",
            Stage::Indexing => "indexing",
        }
    }

    /// Display percentage shown while this stage runs. UI feedback only.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Stage::Ping => 15,
            Stage::Rss => 30,
            Stage::Publish => 45,
            Stage::Shorten => 60,
            Stage::Backlinks => 75,
            Stage::Traffic => 85,
            Stage::Indexing => 95,
        }
    }

    /// Message announced when the stage starts
    pub fn start_message(&self) -> &'static str {
        match self {
            Stage::Ping => "Sending pings...",
            Stage::Rss => "Creating RSS feed...",
            Stage::Publish => "Publishing to services...",
            Stage::Shorten => "Shortening URLs...",
            Stage::Backlinks => "Creating backlinks page...",
            Stage::Traffic => "Simulating traffic...",
            Stage::Indexing => "Checking indexing...",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied switches for one run
///
/// Every flag defaults to `true`; only an explicit `false` turns a stage off.
/// `create_rss` and `create_backlinks` are accepted and echoed in the report,
/// but the feed and backlinks stages always run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOptions {
    /// Run the traffic stage
    #[serde(default = "default_true", deserialize_with = "enabled_unless_false")]
    pub simulate_traffic: bool,
    /// Run the indexing stage
    #[serde(default = "default_true", deserialize_with = "enabled_unless_false")]
    pub check_indexing: bool,
    /// Requested feed generation
    #[serde(
        default = "default_true",
        deserialize_with = "enabled_unless_false",
        rename = "createRSS",
        alias = "createRss"
    )]
    pub create_rss: bool,
    /// Requested backlinks page generation
    #[serde(default = "default_true", deserialize_with = "enabled_unless_false")]
    pub create_backlinks: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            simulate_traffic: true,
            check_indexing: true,
            create_rss: true,
            create_backlinks: true,
        }
    }
}

impl ProcessOptions {
    /// Whether `stage` runs under these options
    pub fn enables(&self, stage: Stage) -> bool {
        match stage {
            Stage::Traffic => self.simulate_traffic,
            Stage::Indexing => self.check_indexing,
            _ => true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `null` counts as absent
fn enabled_unless_false<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Success or failure of one item or call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The call went through
    Success,
    /// The call failed; see the detail
    Error,
}

impl OutcomeStatus {
    /// Whether this is [`OutcomeStatus::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }
}

/// Outcome of one call to one external service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CallOutcome {
    /// Service that was called
    pub service: String,
    /// Result of the call
    pub status: OutcomeStatus,
    /// Response status or error explanation
    pub detail: String,
}

/// Per-URL outcome of the ping stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PingOutcome {
    /// The URL that was announced
    pub url: String,
    /// `success` when at least one service accepted the ping
    pub status: OutcomeStatus,
    /// Summary of the service results
    pub detail: String,
    /// One entry per configured ping service
    pub services: Vec<CallOutcome>,
}

/// Per-URL outcome of the traffic stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrafficOutcome {
    /// The URL that was visited
    pub url: String,
    /// `error` as soon as one visit failed
    pub status: OutcomeStatus,
    /// Summary or failure explanation
    pub detail: String,
    /// Visits that completed before the outcome was decided
    pub requests: u32,
}

/// Per-URL outcome of the indexing stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndexingOutcome {
    /// The URL whose host was looked up
    pub url: String,
    /// Whether the lookup itself succeeded
    pub status: OutcomeStatus,
    /// Result-count text or failure explanation
    pub detail: String,
    /// Heuristic verdict; always false when the lookup failed
    pub indexed: bool,
}

/// Result of one shortening attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ShortenResult {
    /// Shortened URL
    Short {
        /// The short link returned by the service
        #[serde(rename = "shortUrl")]
        short_url: String,
    },
    /// Failure explanation
    Failed {
        /// What went wrong
        error: String,
    },
}

impl ShortenResult {
    /// The short link, when the service produced one
    pub fn short_url(&self) -> Option<&str> {
        match self {
            ShortenResult::Short { short_url } => Some(short_url),
            ShortenResult::Failed { .. } => None,
        }
    }
}

/// URL → (service → result)
pub type ShortenOutcome = BTreeMap<String, BTreeMap<String, ShortenResult>>;

/// Lifecycle status of a generated artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// File was written
    Created,
}

/// A file written by a stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    /// Where the artifact was written
    #[schema(value_type = String)]
    pub file_path: PathBuf,
    /// Always `created`
    pub status: ArtifactStatus,
}

/// Outcome of one simulated publication
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublishOutcome {
    /// Result of the publication
    pub status: OutcomeStatus,
    /// Location of the publication, when it succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Failure explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-stage results of a run; a key is present only if its stage executed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StageResults {
    /// Ping stage outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<Vec<PingOutcome>>,
    /// Feed artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss: Option<ArtifactDescriptor>,
    /// Publication outcomes keyed by target name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<BTreeMap<String, PublishOutcome>>,
    /// Shortened URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorten: Option<ShortenOutcome>,
    /// Backlinks page artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlinks: Option<ArtifactDescriptor>,
    /// Traffic stage outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Vec<TrafficOutcome>>,
    /// Indexing stage outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexing: Option<Vec<IndexingOutcome>>,
}

impl StageResults {
    /// Stages that have a result, in pipeline order
    pub fn executed(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.contains(*stage))
            .collect()
    }

    /// Whether `stage` produced a result
    pub fn contains(&self, stage: Stage) -> bool {
        match stage {
            Stage::Ping => self.ping.is_some(),
            Stage::Rss => self.rss.is_some(),
            Stage::Publish => self.publish.is_some(),
            Stage::Shorten => self.shorten.is_some(),
            Stage::Backlinks => self.backlinks.is_some(),
            Stage::Traffic => self.traffic.is_some(),
            Stage::Indexing => self.indexing.is_some(),
        }
    }
}

/// Aggregate result of one run, sent in the `complete` event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Run identifier
    pub session_id: RunId,
    /// When the run was accepted
    pub timestamp: DateTime<Utc>,
    /// Number of URLs processed
    pub urls: usize,
    /// Options the run was started with
    #[serde(default)]
    pub options: ProcessOptions,
    /// Per-stage results
    pub results: StageResults,
}

/// Body of `POST /process`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// Absolute http(s) URLs, in submission order
    pub urls: Vec<String>,
    /// Stage switches; omitted (or null) flags default to enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ProcessOptions>,
}

/// A generated file as shown in the files panel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactFile {
    /// File name inside the output directory
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Creation time (falls back to modification time where unsupported)
    pub created: DateTime<Utc>,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Stage name as it appears on the wire
///
/// Unknown names are kept rather than rejected so a newer server does not
/// break an older decoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// One of the pipeline stages
    Known(Stage),
    /// Any other name
    Other(String),
}

impl Step {
    /// Display percentage, 0 for unknown stages
    pub fn progress_percent(&self) -> u8 {
        match self {
            Step::Known(stage) => stage.progress_percent(),
            Step::Other(_) => 0,
        }
    }

    /// Name as sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Step::Known(stage) => stage.as_str(),
            Step::Other(name) => name,
        }
    }
}

impl From<Stage> for Step {
    fn from(stage: Stage) -> Self {
        Step::Known(stage)
    }
}

/// Status carried by a progress event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// An item succeeded
    Success,
    /// An item failed (the run continues)
    Error,
    /// The stage (or item, for older servers) finished
    Completed,
}

impl From<OutcomeStatus> for ProgressStatus {
    fn from(status: OutcomeStatus) -> Self {
        match status {
            OutcomeStatus::Success => ProgressStatus::Success,
            OutcomeStatus::Error => ProgressStatus::Error,
        }
    }
}

/// Payload of a `progress` event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressDetail {
    /// One item of the stage finished
    Item {
        /// The item's URL
        url: String,
        /// How it went
        status: ProgressStatus,
    },
    /// The stage started
    Message {
        /// Human-readable description
        message: String,
    },
    /// The stage finished (or a bare step marker)
    Marker {
        /// `completed` when the stage finished
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<ProgressStatus>,
    },
}

/// One unit of the streaming progress protocol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Opens a run; sent exactly once
    Start {
        /// Human-readable description
        message: String,
    },
    /// Stage entry, item completion or stage exit
    Progress {
        /// Stage the event belongs to
        step: Step,
        /// What happened
        #[serde(flatten)]
        detail: ProgressDetail,
    },
    /// Terminal: the run finished and this is its aggregate
    Complete {
        /// Aggregate result
        results: Box<RunReport>,
    },
    /// Terminal: the run aborted
    Error {
        /// Why the run stopped
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ProgressEvent {
    /// `progress` event announcing that `stage` started
    pub fn stage_started(stage: Stage) -> Self {
        ProgressEvent::Progress {
            step: stage.into(),
            detail: ProgressDetail::Message {
                message: stage.start_message().to_string(),
            },
        }
    }

    /// `progress` event for one finished item
    pub fn item_finished(stage: Stage, url: impl Into<String>, status: OutcomeStatus) -> Self {
        ProgressEvent::Progress {
            step: stage.into(),
            detail: ProgressDetail::Item {
                url: url.into(),
                status: status.into(),
            },
        }
    }

    /// `progress` event announcing that `stage` finished
    pub fn stage_finished(stage: Stage) -> Self {
        ProgressEvent::Progress {
            step: stage.into(),
            detail: ProgressDetail::Marker {
                status: Some(ProgressStatus::Completed),
            },
        }
    }

    /// Whether this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Complete { .. } | ProgressEvent::Error { .. }
        )
    }
}
