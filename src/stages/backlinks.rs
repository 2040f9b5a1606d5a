//! Backlinks page stage

use super::{StageSet, escape_markup};
use crate::error::Result;
use crate::types::{ArtifactDescriptor, ArtifactStatus};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use tracing::info;
use url::Url;

const STYLE: &str = "body { font-family: Arial, sans-serif; margin: 20px; }
        .link { margin: 10px 0; padding: 10px; border: 1px solid #ddd; }
        a { color: #0066cc; text-decoration: none; }
        a:hover { text-decoration: underline; }";

/// Renders a static HTML page linking every submitted URL
#[derive(Debug, Clone)]
pub struct BacklinkPage {
    title: String,
}

impl Default for BacklinkPage {
    fn default() -> Self {
        Self {
            title: "Backlinks - LinkIndex".to_string(),
        }
    }
}

impl BacklinkPage {
    /// Render the page; every URL is escaped before it is embedded
    pub fn render(&self, urls: &[Url], generated_at: DateTime<Utc>) -> String {
        let title = escape_markup(&self.title);
        let mut links = String::new();
        for (index, url) in urls.iter().enumerate() {
            let href = escape_markup(url.as_str());
            // writing to a String cannot fail
            let _ = write!(
                links,
                r#"
    <div class="link">
        <h3>Link {}</h3>
        <a href="{href}" target="_blank" rel="noopener">{href}</a>
    </div>"#,
                index + 1
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        {STYLE}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>Generated at: <time datetime="{iso}">{human}</time></p>
{links}
    <footer>
        <p>Total links: {total}</p>
        <p>Generated by linkindex</p>
    </footer>
</body>
</html>
"#,
            iso = generated_at.to_rfc3339(),
            human = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            total = urls.len(),
        )
    }
}

impl StageSet {
    /// Write the backlinks page for `urls`, replacing the previous one
    pub(crate) async fn write_backlinks(&self, urls: &[Url]) -> Result<ArtifactDescriptor> {
        let page = self.backlinks.render(urls, Utc::now());
        let path = self
            .store
            .persist(&self.backlinks_file_name, page.as_bytes())
            .await?;
        info!(path = %path.display(), links = urls.len(), "backlinks page written");

        Ok(ArtifactDescriptor {
            file_path: path,
            status: ArtifactStatus::Created,
        })
    }
}
