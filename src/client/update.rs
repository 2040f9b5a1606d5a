//! Pure state transitions for the processing panel

use super::state::{LogKind, Panel, Progress, RunState};
use super::summary::{file_rows, result_cards};
use crate::protocol::Decoded;
use crate::types::{ArtifactFile, ProcessOptions, ProgressDetail, ProgressEvent, ProgressStatus};
use chrono::{DateTime, Utc};

/// Input to [`update`]
#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    /// The URL text area changed
    InputChanged(String),
    /// A stage switch changed
    OptionsChanged(ProcessOptions),
    /// The user asked to start a run
    StartClicked,
    /// The user cleared the input
    ClearInput,
    /// The user reset the whole panel
    ResetClicked,
    /// The user cleared the log
    ClearLog,
    /// The user asked to export the log
    SaveLogClicked {
        /// Time used for the export file name
        at: DateTime<Utc>,
    },
    /// An event arrived on the run's stream
    Server(ProgressEvent),
    /// A line on the run's stream could not be parsed
    Malformed {
        /// Why it was dropped
        reason: String,
    },
    /// The request could not be sent or the stream broke
    TransportFailed(String),
    /// The stream closed
    StreamEnded,
    /// The file listing was fetched
    FilesLoaded(Vec<ArtifactFile>),
}

impl From<Decoded> for Msg {
    fn from(decoded: Decoded) -> Self {
        match decoded {
            Decoded::Event(event) => Msg::Server(event),
            Decoded::Malformed { reason, .. } => Msg::Malformed { reason },
        }
    }
}

/// Side effects requested by [`update`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// POST the run and feed its stream back as [`Msg`]s
    SubmitRun {
        /// Validated input lines
        urls: Vec<String>,
        /// Stage switches
        options: ProcessOptions,
    },
    /// Fetch the file listing and send [`Msg::FilesLoaded`]
    RefreshFiles,
    /// Offer the log as a download
    SaveLog {
        /// Suggested file name
        file_name: String,
        /// File contents
        contents: String,
    },
}

/// Apply `msg` to `panel`, returning the new state and the effects to run
pub fn update(mut panel: Panel, msg: Msg) -> (Panel, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            panel.input = text;
            Vec::new()
        }
        Msg::OptionsChanged(options) => {
            panel.options = options;
            Vec::new()
        }
        Msg::StartClicked => start(&mut panel),
        Msg::ClearInput => {
            if panel.can_clear() {
                panel.input.clear();
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            if !panel.can_clear() {
                return (panel, Vec::new());
            }
            let log = std::mem::take(&mut panel.log);
            panel = Panel {
                options: panel.options,
                log,
                ..Panel::default()
            };
            clear_log(&mut panel);
            vec![Effect::RefreshFiles]
        }
        Msg::ClearLog => {
            clear_log(&mut panel);
            Vec::new()
        }
        Msg::SaveLogClicked { at } => {
            if !panel.can_save_log() {
                return (panel, Vec::new());
            }
            let contents = panel.log.export();
            panel.log.push(LogKind::Success, "Log saved");
            vec![Effect::SaveLog {
                file_name: log_file_name(at),
                contents,
            }]
        }
        Msg::Server(event) => {
            if !panel.run.is_running() {
                return (panel, Vec::new());
            }
            apply_event(&mut panel, event)
        }
        Msg::Malformed { reason } => {
            panel
                .log
                .push(LogKind::Error, format!("Dropped malformed event: {reason}"));
            Vec::new()
        }
        Msg::TransportFailed(message) => {
            if !panel.run.is_running() {
                return (panel, Vec::new());
            }
            panel
                .log
                .push(LogKind::Error, format!("Processing error: {message}"));
            fail(&mut panel, message)
        }
        Msg::StreamEnded => {
            if !panel.run.is_running() {
                return (panel, Vec::new());
            }
            let message = "stream ended before the run finished".to_string();
            panel.log.push(LogKind::Error, format!("Processing error: {message}"));
            fail(&mut panel, message)
        }
        Msg::FilesLoaded(files) => {
            panel.files = file_rows(&files);
            Vec::new()
        }
    };

    (panel, effects)
}

fn start(panel: &mut Panel) -> Vec<Effect> {
    if panel.run.is_running() {
        return Vec::new();
    }
    let urls = panel.valid_urls();
    if urls.is_empty() {
        panel.log.push(LogKind::Error, "No valid URLs found!");
        return Vec::new();
    }

    panel.run = RunState::Running;
    panel.cards.clear();
    panel.last_report = None;
    panel.progress = Some(Progress {
        percent: 0,
        message: "Starting processing...".into(),
    });
    panel.log.push(
        LogKind::Info,
        format!("Starting processing of {} URL(s)...", urls.len()),
    );

    vec![Effect::SubmitRun {
        urls,
        options: panel.options,
    }]
}

fn apply_event(panel: &mut Panel, event: ProgressEvent) -> Vec<Effect> {
    match event {
        ProgressEvent::Start { message } => {
            panel.log.push(LogKind::Info, message);
            Vec::new()
        }
        ProgressEvent::Progress { step, detail } => {
            let tag = step.as_str().to_uppercase();
            match detail {
                ProgressDetail::Message { message } => {
                    panel.progress = Some(Progress {
                        percent: step.progress_percent(),
                        message: message.clone(),
                    });
                    panel.log.push(LogKind::Info, format!("[{tag}] {message}"));
                }
                ProgressDetail::Item { url, status } => {
                    let (kind, label) = match status {
                        ProgressStatus::Error => (LogKind::Error, "error"),
                        ProgressStatus::Success => (LogKind::Success, "success"),
                        ProgressStatus::Completed => (LogKind::Success, "completed"),
                    };
                    panel.log.push(kind, format!("[{tag}] {url} - {label}"));
                }
                ProgressDetail::Marker { .. } => {}
            }
            Vec::new()
        }
        ProgressEvent::Complete { results } => {
            panel.progress = Some(Progress {
                percent: 100,
                message: "Processing complete!".into(),
            });
            panel.log.push(LogKind::Success, "Processing completed successfully!");
            panel.cards = result_cards(&results);
            panel.last_report = Some(*results);
            panel.run = RunState::Finished;
            vec![Effect::RefreshFiles]
        }
        ProgressEvent::Error { message } => {
            let message = message.unwrap_or_else(|| "Unknown error".to_string());
            panel.log.push(LogKind::Error, message.clone());
            fail(panel, message)
        }
    }
}

fn fail(panel: &mut Panel, message: String) -> Vec<Effect> {
    if let Some(progress) = panel.progress.as_mut() {
        progress.message = "Processing error".into();
    }
    panel.run = RunState::Failed { message };
    vec![Effect::RefreshFiles]
}

fn clear_log(panel: &mut Panel) {
    panel.log.clear();
    panel
        .log
        .push(LogKind::Info, "Log cleared. Waiting for new operations...");
}

/// `linkindex-log-YYYY-MM-DDTHH-MM-SS.txt`
fn log_file_name(at: DateTime<Utc>) -> String {
    format!("linkindex-log-{}.txt", at.format("%Y-%m-%dT%H-%M-%S"))
}
