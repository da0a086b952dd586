//! Extraction backend seam: metadata listing and downloading.

use eyre::{Context, Result};
use std::path::PathBuf;
use ytmux_dl::dl::{self, DownloadOptions, MediaInfo};
use ytmux_dl::error::DownloadError;

/// Operations the workflow needs from the extraction library.
pub trait Extractor {
    /// Metadata only; nothing is downloaded.
    fn extract_info(&self, url: &str) -> Result<MediaInfo>;

    /// Download with `opts` and return the final file path.
    fn download(&self, url: &str, opts: DownloadOptions) -> Result<PathBuf, DownloadError>;
}

/// yt-dlp through the embedded Python interpreter.
#[derive(Clone, Copy, Debug, Default)]
pub struct YtDlp;

impl Extractor for YtDlp {
    fn extract_info(&self, url: &str) -> Result<MediaInfo> {
        let info = dl::extract_info(url, DownloadOptions::metadata_only())
            .wrap_err_with(|| format!("failed to extract formats for {url}"))?;

        tracing::info!(
            id = info.id.as_deref(),
            title = info.title.as_deref(),
            formats = info.formats.len(),
            "metadata extracted"
        );

        Ok(info)
    }

    fn download(&self, url: &str, opts: DownloadOptions) -> Result<PathBuf, DownloadError> {
        dl::download(url, opts)
    }
}
