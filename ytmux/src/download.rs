//! Download orchestrator: build the merge request, run it, report the outcome.

use crate::extractor::Extractor;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use ytmux_dl::dl::{DownloadOptions, OutputPaths};
use ytmux_dl::error::DownloadError;
use ytmux_dl::merge::SelectionResult;

/// Everything needed for one merged download.
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    pub url: String,
    pub selection: SelectionResult,
    /// Output directory; yt-dlp writes to the working directory when unset
    pub output_dir: Option<PathBuf>,
    /// Directory of a managed ffmpeg not on the inherited `PATH`
    pub ffmpeg_location: Option<PathBuf>,
}

impl From<&DownloadRequest> for DownloadOptions {
    fn from(request: &DownloadRequest) -> Self {
        let mut opts: DownloadOptions = request.selection.clone().into();

        if let Some(dir) = request.output_dir.as_deref() {
            opts.paths = Some(OutputPaths::home(dir));
        }

        opts.ffmpeg_location = request
            .ffmpeg_location
            .as_deref()
            .map(|dir| dir.to_string_lossy().to_string());

        opts
    }
}

/// Advisory result of probing the output file for an exclusive lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockStatus {
    /// Self-rename succeeded
    Released,
    /// Self-rename was denied; the file is complete but still held open
    Locked,
    /// Probe failed for another reason
    Unknown,
}

#[derive(Debug)]
pub enum DownloadOutcome {
    Completed {
        path: PathBuf,
        /// `None` when the reported path does not exist
        lock: Option<LockStatus>,
    },
    Failed(DownloadError),
}

/// Run the download. Failures become [`DownloadOutcome::Failed`], never an `Err`.
pub fn execute(extractor: &impl Extractor, request: &DownloadRequest) -> DownloadOutcome {
    let opts = DownloadOptions::from(request);

    tracing::info!(
        url = request.url,
        format = opts.format.as_deref(),
        "starting download"
    );

    match extractor.download(&request.url, opts) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "download completed");
            let lock = path.exists().then(|| probe_lock(&path));
            DownloadOutcome::Completed { path, lock }
        }
        Err(err) => {
            tracing::error!(kind = ?err.kind, error = %err, "download failed");
            DownloadOutcome::Failed(err)
        }
    }
}

/// Rename a file onto itself to detect whether another process holds it open.
///
/// Only meaningful on platforms with mandatory locking; elsewhere it reports released.
pub fn probe_lock(path: &Path) -> LockStatus {
    match fs::rename(path, path) {
        Ok(()) => LockStatus::Released,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => LockStatus::Locked,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "lock probe failed");
            LockStatus::Unknown
        }
    }
}

impl DownloadOutcome {
    /// Print the user-facing summary.
    pub fn report(&self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::Completed { path, lock } => {
                writeln!(out, "\nDownload completed successfully.")?;
                writeln!(out, "Video saved as: {}", path.display())?;

                match lock {
                    Some(LockStatus::Released) => writeln!(out, "File is properly closed.")?,
                    Some(LockStatus::Locked) => writeln!(
                        out,
                        "File is locked. Restart your system or manually unlock it."
                    )?,
                    Some(LockStatus::Unknown) | None => {}
                }
            }
            Self::Failed(err) => writeln!(out, "Error during download: {err}")?,
        }
        Ok(())
    }
}
