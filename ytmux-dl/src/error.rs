//! Download failure classification.

use pyo3::prelude::*;
use thiserror::Error;

/// Broad cause of a failed download, derived from the yt-dlp error message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadErrorKind {
    /// Transport failure: HTTP errors, timeouts, DNS, refused connections
    Network,
    /// ffmpeg merge or post-processing failure
    Merge,
    /// Anything else yt-dlp raised
    Unknown,
}

/// A failed `extract_info(..., download=True)` call.
///
/// Displays as the exception's own message, without the Python type prefix.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct DownloadError {
    pub kind: DownloadErrorKind,
    pub message: String,
}

const MERGE_MARKERS: &[&str] = &["postprocessing", "ffmpeg", "ffprobe", "merg"];

const NETWORK_MARKERS: &[&str] = &[
    "http error",
    "unable to download",
    "urlopen error",
    "timed out",
    "connection",
    "getaddrinfo",
    "name resolution",
    "network",
];

impl DownloadError {
    /// Classify an error message; merge markers win over network markers.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let kind = if MERGE_MARKERS.iter().any(|m| lower.contains(m)) {
            DownloadErrorKind::Merge
        } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
            DownloadErrorKind::Network
        } else {
            DownloadErrorKind::Unknown
        };

        Self { kind, message }
    }

    /// Build from a raised Python exception, using `str(exc)` as the message.
    pub fn from_py(py: Python<'_>, err: &PyErr) -> Self {
        Self::classify(err.value(py).to_string())
    }
}
