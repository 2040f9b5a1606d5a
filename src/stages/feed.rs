//! Feed document stage

use super::StageSet;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::types::{ArtifactDescriptor, ArtifactStatus};
use chrono::{DateTime, Utc};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use tracing::info;
use url::Url;

/// Renders an RSS 2.0 channel with one item per URL
#[derive(Debug, Clone)]
pub struct FeedWriter {
    config: FeedConfig,
}

impl FeedWriter {
    /// Create a writer using the given channel metadata
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Render the feed document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Feed`] if the document cannot be serialized.
    pub fn render(&self, urls: &[Url], generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
        let pub_date = generated_at.to_rfc2822();

        let items: Vec<_> = urls
            .iter()
            .map(|url| {
                ItemBuilder::default()
                    .title(Some(format!("Link: {url}")))
                    .link(Some(url.to_string()))
                    .description(Some(format!("Indexed link: {url}")))
                    .guid(Some(
                        GuidBuilder::default()
                            .value(url.to_string())
                            .permalink(true)
                            .build(),
                    ))
                    .pub_date(Some(pub_date.clone()))
                    .build()
            })
            .collect();

        let channel = ChannelBuilder::default()
            .title(self.config.title.clone())
            .link(self.config.site_url.clone())
            .description(self.config.description.clone())
            .language(Some(self.config.language.clone()))
            .pub_date(Some(pub_date.clone()))
            .last_build_date(Some(pub_date))
            .generator(Some(format!("linkindex {}", env!("CARGO_PKG_VERSION"))))
            .items(items)
            .build();

        channel
            .write_to(Vec::new())
            .map_err(|e| Error::Feed(e.to_string()))
    }
}

impl StageSet {
    /// Write the feed for `urls`, replacing the previous one
    pub(crate) async fn write_feed(&self, urls: &[Url]) -> Result<ArtifactDescriptor> {
        let document = self.feed.render(urls, Utc::now())?;
        let path = self.store.persist(&self.feed_file_name, &document).await?;
        info!(path = %path.display(), items = urls.len(), "feed written");

        Ok(ArtifactDescriptor {
            file_path: path,
            status: ArtifactStatus::Created,
        })
    }
}
