//! Result cards and file rows derived from server data

use super::state::{FileRow, ResultCard};
use crate::types::{ArtifactFile, RunReport};

/// Summary cards for a completed run, one per stage that executed
pub fn result_cards(report: &RunReport) -> Vec<ResultCard> {
    let total = report.urls;
    let results = &report.results;
    let mut cards = vec![card("URLs Processed", format!("{total} URLs were processed"))];

    if let Some(ping) = &results.ping {
        let sent = ping.iter().filter(|o| o.status.is_success()).count();
        cards.push(card(
            "Ping Services",
            format!("{sent}/{total} URLs sent to ping services"),
        ));
    }
    if let Some(feed) = &results.rss {
        cards.push(card(
            "RSS Feed",
            format!("Feed created at {}", feed.file_path.display()),
        ));
    }
    if let Some(publish) = &results.publish {
        let published = publish.values().filter(|o| o.status.is_success()).count();
        cards.push(card(
            "Publishing",
            format!("Links published to {published}/{} services", publish.len()),
        ));
    }
    if let Some(shorten) = &results.shorten {
        let links = shorten
            .values()
            .flat_map(|per_service| per_service.values())
            .filter(|r| r.short_url().is_some())
            .count();
        cards.push(card("Shortened URLs", format!("{links} short links generated")));
    }
    if let Some(backlinks) = &results.backlinks {
        cards.push(card(
            "Backlinks",
            format!("Backlinks page created at {}", backlinks.file_path.display()),
        ));
    }
    if let Some(traffic) = &results.traffic {
        let visited = traffic.iter().filter(|o| o.status.is_success()).count();
        cards.push(card(
            "Traffic Simulation",
            format!("{visited}/{total} URLs received simulated traffic"),
        ));
    }
    if let Some(indexing) = &results.indexing {
        let indexed = indexing.iter().filter(|o| o.indexed).count();
        cards.push(card(
            "Indexing Check",
            format!("{indexed}/{total} URLs already indexed"),
        ));
    }

    cards
}

fn card(title: &str, body: String) -> ResultCard {
    ResultCard {
        title: title.to_string(),
        body,
    }
}

/// Rows for the files panel
pub fn file_rows(files: &[ArtifactFile]) -> Vec<FileRow> {
    files
        .iter()
        .map(|file| FileRow {
            name: file.name.clone(),
            size: format_size(file.size),
            modified: file.modified,
            download_path: format!("/download/{}", urlencoding::encode(&file.name)),
        })
        .collect()
}

/// Format a byte count with binary units and at most two decimals
///
/// `0` → `"0 Bytes"`, `1536` → `"1.5 KB"`, `1048576` → `"1 MB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
