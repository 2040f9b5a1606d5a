use super::*;

#[test]
fn start_requires_valid_urls() {
    let panel = panel_with("not a url\n   \nftp://example.com/file");
    assert!(!panel.can_start());

    let (panel, effects) = update(panel, Msg::StartClicked);
    assert!(effects.is_empty());
    assert_eq!(panel.run_state(), &RunState::Idle);
    let last = panel.log().entries().last().unwrap();
    assert_eq!(last.kind, LogKind::Error);
    assert_eq!(last.message, "No valid URLs found!");
}

#[test]
fn start_submits_trimmed_valid_lines_with_options() {
    let mut panel = panel_with("  https://example.com/a \nbogus\nhttps://example.com/b\n");
    let options = ProcessOptions {
        check_indexing: false,
        ..ProcessOptions::default()
    };
    (panel, _) = update(panel, Msg::OptionsChanged(options));
    assert!(panel.can_start());

    let (panel, effects) = update(panel, Msg::StartClicked);

    assert_eq!(
        effects,
        vec![Effect::SubmitRun {
            urls: vec!["https://example.com/a".into(), "https://example.com/b".into()],
            options,
        }]
    );
    assert!(panel.run_state().is_running());
    assert!(!panel.can_start());
    assert!(!panel.can_clear());
    assert_eq!(panel.progress().unwrap().percent, 0);
}

#[test]
fn second_start_while_running_is_ignored() {
    let (panel, effects) = update(running_panel(), Msg::StartClicked);
    assert!(effects.is_empty());
    assert!(panel.run_state().is_running());
}

#[test]
fn start_event_only_logs() {
    let panel = running_panel();
    let before = panel.log().entries().len();

    let (panel, effects) = update(
        panel,
        Msg::Server(ProgressEvent::Start {
            message: "Processing 1 URLs".into(),
        }),
    );

    assert!(effects.is_empty());
    assert!(panel.run_state().is_running());
    assert_eq!(panel.log().entries().len(), before + 1);
    assert_eq!(panel.progress().unwrap().percent, 0);
}

#[test]
fn progress_events_move_the_bar_and_log() {
    let (panel, _) = update(
        running_panel(),
        Msg::Server(ProgressEvent::stage_started(Stage::Shorten)),
    );
    assert_eq!(panel.progress().unwrap().percent, 60);
    assert_eq!(
        panel.log().entries().last().unwrap().message,
        "[SHORTEN] Shortening URLs..."
    );

    let (panel, _) = update(
        panel,
        Msg::Server(ProgressEvent::item_finished(
            Stage::Traffic,
            "https://example.com/a",
            OutcomeStatus::Error,
        )),
    );
    let last = panel.log().entries().last().unwrap();
    assert_eq!(last.kind, LogKind::Error);
    assert_eq!(last.message, "[TRAFFIC] https://example.com/a - error");

    // stage exit markers are silent
    let entries = panel.log().entries().len();
    let (panel, _) = update(panel, Msg::Server(ProgressEvent::stage_finished(Stage::Traffic)));
    assert_eq!(panel.log().entries().len(), entries);
}

#[test]
fn unknown_step_shows_zero_percent() {
    let event: ProgressEvent = serde_json::from_str(
        r#"{"type":"progress","step":"sitemap","message":"Building sitemap"}"#,
    )
    .unwrap();
    let (panel, _) = update(running_panel(), Msg::Server(event));

    assert_eq!(panel.progress().unwrap().percent, 0);
    assert_eq!(
        panel.log().entries().last().unwrap().message,
        "[SITEMAP] Building sitemap"
    );
}

#[test]
fn complete_finishes_with_cards_and_refresh() {
    let report = sample_report(2);
    let (panel, effects) = update(
        running_panel(),
        Msg::Server(ProgressEvent::Complete {
            results: Box::new(report.clone()),
        }),
    );

    assert_eq!(panel.run_state(), &RunState::Finished);
    assert_eq!(effects, vec![Effect::RefreshFiles]);
    assert_eq!(panel.progress().unwrap().percent, 100);
    assert_eq!(panel.last_report(), Some(&report));
    assert!(!panel.cards().is_empty());
    assert!(panel.can_clear());
    assert!(panel.can_start());
}

#[test]
fn error_event_fails_the_run() {
    let (panel, effects) = update(
        running_panel(),
        Msg::Server(ProgressEvent::Error {
            message: Some("disk full".into()),
        }),
    );

    assert_eq!(
        panel.run_state(),
        &RunState::Failed {
            message: "disk full".into()
        }
    );
    assert_eq!(effects, vec![Effect::RefreshFiles]);
    assert_eq!(panel.log().entries().last().unwrap().message, "disk full");
}

#[test]
fn error_event_without_message_uses_fallback() {
    let (panel, _) = update(running_panel(), Msg::Server(ProgressEvent::Error { message: None }));
    assert_eq!(
        panel.run_state(),
        &RunState::Failed {
            message: "Unknown error".into()
        }
    );
}

#[test]
fn stream_end_without_terminal_event_is_a_failure() {
    let (panel, effects) = update(running_panel(), Msg::StreamEnded);
    assert!(matches!(panel.run_state(), RunState::Failed { .. }));
    assert_eq!(effects, vec![Effect::RefreshFiles]);

    // after a terminal event the close is expected
    let (panel, _) = update(
        running_panel(),
        Msg::Server(ProgressEvent::Complete {
            results: Box::new(sample_report(1)),
        }),
    );
    let (panel, effects) = update(panel, Msg::StreamEnded);
    assert_eq!(panel.run_state(), &RunState::Finished);
    assert!(effects.is_empty());
}

#[test]
fn events_after_terminal_are_ignored() {
    let (panel, _) = update(running_panel(), Msg::TransportFailed("connection reset".into()));
    let entries = panel.log().entries().len();

    let (panel, effects) = update(panel, Msg::Server(ProgressEvent::stage_started(Stage::Ping)));
    assert!(effects.is_empty());
    assert_eq!(panel.log().entries().len(), entries);
    assert_eq!(
        panel.run_state(),
        &RunState::Failed {
            message: "connection reset".into()
        }
    );
}

#[test]
fn malformed_line_is_logged_without_state_change() {
    let (panel, effects) = update(
        running_panel(),
        Msg::Malformed {
            reason: "expected value at line 1 column 1".into(),
        },
    );
    assert!(effects.is_empty());
    assert!(panel.run_state().is_running());
    assert_eq!(panel.log().entries().last().unwrap().kind, LogKind::Error);
}

#[test]
fn clear_and_reset_are_blocked_while_running() {
    let (panel, effects) = update(running_panel(), Msg::ClearInput);
    assert_eq!(panel.input(), "https://example.com/a");
    assert!(effects.is_empty());

    let (panel, effects) = update(panel, Msg::ResetClicked);
    assert!(panel.run_state().is_running());
    assert!(effects.is_empty());
}

#[test]
fn reset_returns_to_idle_and_refreshes_files() {
    let (panel, _) = update(running_panel(), Msg::Server(ProgressEvent::Error { message: None }));
    let (panel, effects) = update(panel, Msg::ResetClicked);

    assert_eq!(panel.run_state(), &RunState::Idle);
    assert_eq!(panel.input(), "");
    assert!(panel.progress().is_none());
    assert!(panel.cards().is_empty());
    assert_eq!(panel.log().entries().len(), 1);
    assert_eq!(effects, vec![Effect::RefreshFiles]);
}

#[test]
fn log_ids_keep_increasing_across_clears() {
    let panel = running_panel();
    let last_before = panel.log().entries().last().unwrap().id;

    let (panel, _) = update(panel, Msg::ClearLog);
    let entries = panel.log().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].id > last_before);
    assert!(panel.log().since(Some(entries[0].id)).is_empty());
}

#[test]
fn save_log_exports_lines_then_records_the_save() {
    let mut log = Log::default();
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    log.push_at(LogKind::Info, "Starting processing of 1 URL(s)...", at);
    log.push_at(LogKind::Error, "[PING] https://example.com/a - error", at);
    let panel = Panel {
        log,
        ..Panel::default()
    };

    let (panel, effects) = update(panel, Msg::SaveLogClicked { at });

    assert_eq!(
        effects,
        vec![Effect::SaveLog {
            file_name: "linkindex-log-2024-03-09T14-05-07.txt".into(),
            contents: "[14:05:07] INFO: Starting processing of 1 URL(s)...\n\
                       [14:05:07] ERROR: [PING] https://example.com/a - error"
                .into(),
        }]
    );
    assert_eq!(panel.log().entries().last().unwrap().kind, LogKind::Success);
}

#[test]
fn save_log_with_empty_log_does_nothing() {
    let (_, effects) = update(Panel::new(), Msg::SaveLogClicked { at: Utc::now() });
    assert!(effects.is_empty());
}

#[test]
fn files_loaded_become_rows() {
    let modified = Utc::now();
    let (panel, _) = update(
        Panel::new(),
        Msg::FilesLoaded(vec![ArtifactFile {
            name: "links.xml".into(),
            size: 1536,
            created: modified,
            modified,
        }]),
    );

    assert_eq!(
        panel.files(),
        &[FileRow {
            name: "links.xml".into(),
            size: "1.5 KB".into(),
            modified,
            download_path: "/download/links.xml".into(),
        }]
    );
}
