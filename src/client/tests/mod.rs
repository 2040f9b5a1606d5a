use super::*;
use crate::types::{
    ArtifactDescriptor, ArtifactFile, ArtifactStatus, IndexingOutcome, OutcomeStatus,
    PingOutcome, ProcessOptions, ProgressEvent, RunId, RunReport, Stage, StageResults,
    TrafficOutcome,
};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;

mod transitions;

/// Panel with `input` already typed
fn panel_with(input: &str) -> Panel {
    let (panel, _) = update(Panel::new(), Msg::InputChanged(input.to_string()));
    panel
}

/// Panel in the `Running` state
fn running_panel() -> Panel {
    let (panel, effects) = update(panel_with("https://example.com/a"), Msg::StartClicked);
    assert_eq!(effects.len(), 1);
    panel
}

fn sample_report(urls: usize) -> RunReport {
    let outcome = |i: usize, ok: bool| PingOutcome {
        url: format!("https://example.com/{i}"),
        status: if ok { OutcomeStatus::Success } else { OutcomeStatus::Error },
        detail: String::new(),
        services: Vec::new(),
    };

    RunReport {
        session_id: RunId::new(),
        timestamp: Utc::now(),
        urls,
        options: ProcessOptions::default(),
        results: StageResults {
            ping: Some((0..urls).map(|i| outcome(i, i != 0)).collect()),
            rss: Some(ArtifactDescriptor {
                file_path: PathBuf::from("output/links.xml"),
                status: ArtifactStatus::Created,
            }),
            traffic: Some(
                (0..urls)
                    .map(|i| TrafficOutcome {
                        url: format!("https://example.com/{i}"),
                        status: OutcomeStatus::Success,
                        detail: String::new(),
                        requests: 3,
                    })
                    .collect(),
            ),
            indexing: Some(
                (0..urls)
                    .map(|i| IndexingOutcome {
                        url: format!("https://example.com/{i}"),
                        status: OutcomeStatus::Success,
                        detail: String::new(),
                        indexed: i == 0,
                    })
                    .collect(),
            ),
            ..StageResults::default()
        },
    }
}
