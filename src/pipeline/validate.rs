//! Input normalization for processing requests

use crate::error::{Error, Result};
use std::collections::HashSet;
use url::Url;

/// Turn submitted strings into the run's URL list
///
/// Entries are trimmed and blank ones skipped. Every remaining entry must be
/// an absolute `http` or `https` URL with a host. Duplicates (after parsing,
/// so `https://a.com` and `https://a.com/` are one URL) are dropped, keeping
/// the first occurrence.
///
/// # Errors
///
/// - [`Error::Validation`] when nothing is left after trimming
/// - [`Error::InvalidUrl`] for the first entry that does not qualify
pub fn validate_urls<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Url>> {
    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(raw.len());

    for entry in raw {
        let candidate = entry.as_ref().trim();
        if candidate.is_empty() {
            continue;
        }

        let url = Url::parse(candidate).map_err(|e| Error::InvalidUrl {
            url: candidate.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                url: candidate.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidUrl {
                url: candidate.to_string(),
                reason: "missing host".into(),
            });
        }

        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    if urls.is_empty() {
        return Err(Error::Validation("at least one URL is required".into()));
    }
    Ok(urls)
}
