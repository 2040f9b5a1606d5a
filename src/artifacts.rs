//! Shared output directory for generated artifacts
//!
//! Every run overwrites the fixed-name feed and backlinks files; nothing else in
//! the directory is ever modified. Writes go to a hidden temporary file first and
//! are renamed into place so that a concurrent listing or download never sees a
//! half-written artifact.

use crate::error::{ArtifactError, Error, Result};
use crate::types::ArtifactFile;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Prefix of in-flight temporary files; these are never listed or served
const TEMP_PREFIX: &str = ".tmp-";

/// Filesystem-backed artifact store
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root` (the directory is created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory if needed
    pub async fn ensure_ready(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Write `contents` under `name`, replacing any previous artifact of that name
    ///
    /// Returns the path the artifact now lives at.
    pub async fn persist(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        validate_name(name)?;
        self.ensure_ready().await?;

        let path = self.root.join(name);
        let temp_path = self.root.join(format!("{TEMP_PREFIX}{}-{name}", uuid::Uuid::new_v4()));

        let write_failed = |reason: String| {
            Error::Artifact(ArtifactError::WriteFailed {
                path: path.clone(),
                reason,
            })
        };

        if let Err(e) = tokio::fs::write(&temp_path, contents).await {
            return Err(write_failed(e.to_string()));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            tokio::fs::remove_file(&temp_path).await.ok();
            return Err(write_failed(e.to_string()));
        }

        debug!(path = %path.display(), bytes = contents.len(), "artifact written");
        Ok(path)
    }

    /// List artifacts with size and timestamps (unsorted)
    pub async fn list(&self) -> Result<Vec<ArtifactFile>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            let Some(metadata) = unless_vanished(entry.metadata().await)? else {
                debug!(name = %name, "artifact removed while listing");
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified()?;
            let created = metadata.created().unwrap_or(modified);
            files.push(ArtifactFile {
                name,
                size: metadata.len(),
                created: DateTime::<Utc>::from(created),
                modified: DateTime::<Utc>::from(modified),
            });
        }
        Ok(files)
    }

    /// Resolve a client-supplied name to an existing artifact path
    ///
    /// Names containing path separators, `..`, or the temp prefix are rejected,
    /// so the result is always a direct child of the output directory.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.root.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            Ok(_) => Err(not_found(name)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete artifacts last modified more than `age` ago
    ///
    /// Returns the number of files removed. Individual removal failures are
    /// logged and skipped.
    pub async fn prune_older_than(&self, age: Duration) -> Result<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0;

        for file in self.list().await? {
            if SystemTime::from(file.modified) >= cutoff {
                continue;
            }
            let path = self.root.join(&file.name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to prune artifact"),
            }
        }

        if removed > 0 {
            info!(removed, ?age, "pruned expired artifacts");
        }
        Ok(removed)
    }
}

/// A file pruned between `read_dir` and `stat` is skipped, not an error
fn unless_vanished(
    metadata: std::io::Result<std::fs::Metadata>,
) -> Result<Option<std::fs::Metadata>> {
    match metadata {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.starts_with(TEMP_PREFIX)
        || Path::new(name).file_name().map(|f| f != name).unwrap_or(true);

    if invalid {
        return Err(Error::Artifact(ArtifactError::InvalidName {
            name: name.to_string(),
        }));
    }
    Ok(())
}

fn not_found(name: &str) -> Error {
    Error::Artifact(ArtifactError::NotFound {
        name: name.to_string(),
    })
}
