//! Client-side view state

use crate::types::{ProcessOptions, RunReport};
use chrono::{DateTime, Utc};
use url::Url;

/// Lifecycle of the panel's run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Nothing submitted yet, or reset
    #[default]
    Idle,
    /// A run is streaming
    Running,
    /// The last run completed; its report is in [`Panel::last_report`]
    Finished,
    /// The last run failed
    Failed {
        /// What went wrong
        message: String,
    },
}

impl RunState {
    /// Whether a run is in flight
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Severity of a log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    /// Neutral information
    Info,
    /// Something went well
    Success,
    /// Something failed
    Error,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogKind::Info => "INFO",
            LogKind::Success => "SUCCESS",
            LogKind::Error => "ERROR",
        })
    }
}

/// One line of the activity log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Monotonic identifier, unique within one [`Log`]
    pub id: u64,
    /// When the entry was added
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub kind: LogKind,
    /// Text shown to the user
    pub message: String,
}

/// Append-only activity log
///
/// Entries are never edited or reordered; [`Log::clear`] is the only way to
/// remove them. Identifiers keep increasing across clears.
#[derive(Clone, Debug, Default)]
pub struct Log {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl Log {
    /// Append an entry stamped with the current time
    pub fn push(&mut self, kind: LogKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Utc::now())
    }

    /// Append an entry with an explicit timestamp
    pub fn push_at(&mut self, kind: LogKind, message: impl Into<String>, at: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            timestamp: at,
            kind,
            message: message.into(),
        });
        id
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries added after the entry with id `after` (all entries for `None`)
    pub fn since(&self, after: Option<u64>) -> &[LogEntry] {
        match after {
            None => &self.entries,
            Some(id) => {
                let start = self.entries.partition_point(|e| e.id <= id);
                &self.entries[start..]
            }
        }
    }

    /// Whether the log has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Plain-text export, one `[HH:MM:SS] KIND: message` line per entry
    pub fn export(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("[{}] {}: {}", e.timestamp.format("%H:%M:%S"), e.kind, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Progress bar state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// 0–100
    pub percent: u8,
    /// Current step description
    pub message: String,
}

/// One summary card shown after a completed run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultCard {
    /// Card heading
    pub title: String,
    /// One-line summary
    pub body: String,
}

/// One row of the generated-files panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRow {
    /// File name
    pub name: String,
    /// Human-readable size (e.g. "1.5 KB")
    pub size: String,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Relative download link
    pub download_path: String,
}

/// Complete state of the processing panel
#[derive(Clone, Debug, Default)]
pub struct Panel {
    pub(crate) input: String,
    pub(crate) options: ProcessOptions,
    pub(crate) run: RunState,
    pub(crate) log: Log,
    pub(crate) progress: Option<Progress>,
    pub(crate) cards: Vec<ResultCard>,
    pub(crate) files: Vec<FileRow>,
    pub(crate) last_report: Option<RunReport>,
}

impl Panel {
    /// Fresh panel with an empty input and default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Options the next run will use
    pub fn options(&self) -> ProcessOptions {
        self.options
    }

    /// Run lifecycle
    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    /// Activity log
    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Progress bar, `None` while hidden
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Summary cards of the last completed run
    pub fn cards(&self) -> &[ResultCard] {
        &self.cards
    }

    /// Generated files as last fetched
    pub fn files(&self) -> &[FileRow] {
        &self.files
    }

    /// Aggregate of the last completed run
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Input lines that are absolute http(s) URLs, trimmed, in input order
    pub fn valid_urls(&self) -> Vec<String> {
        self.input
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && Url::parse(line).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
            })
            .map(str::to_string)
            .collect()
    }

    /// Whether the start action is available
    pub fn can_start(&self) -> bool {
        !self.run.is_running() && !self.valid_urls().is_empty()
    }

    /// Whether clearing the input or resetting the panel is available
    pub fn can_clear(&self) -> bool {
        !self.run.is_running()
    }

    /// Whether there is anything to export
    pub fn can_save_log(&self) -> bool {
        !self.log.is_empty()
    }
}
