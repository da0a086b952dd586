//! Error types organized by workflow stage.

use pyo3::PyErr;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Dependency provisioning errors. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Host OS has no prebuilt ffmpeg distribution
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    /// The embedded interpreter could not be queried
    #[error("failed to query the Python environment")]
    Python(#[from] PyErr),

    /// Package installer could not be started
    #[error("failed to start package installer for {package}")]
    InstallerSpawn {
        package: String,
        #[source]
        source: io::Error,
    },

    /// Package installer ran but reported failure
    #[error("package installer exited with {status} while installing {package}")]
    InstallerFailed { package: String, status: ExitStatus },

    /// Installation succeeded but the import still fails
    #[error("{package} is still not importable after installation")]
    LibraryStillMissing { package: String },

    /// Archive download failed
    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Zip archive could not be read
    #[error("failed to extract {path:?}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Extraction finished without the expected executable
    #[error("{exe} not found in extracted archive under {dir:?}")]
    MissingExecutable { exe: String, dir: PathBuf },

    /// Filesystem operation on a known path failed
    #[error("filesystem operation failed at {path:?}")]
    Fs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Search path contains an entry that cannot be joined back into `PATH`
    #[error(transparent)]
    JoinPaths(#[from] std::env::JoinPathsError),

    /// Progress output could not be written
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProvisionError {
    pub(crate) fn fs(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Fs { path, source }
    }
}

/// Quality choice that does not name a catalog entry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Not an integer, or outside `1..=max`
    #[error("invalid selection {input:?}: expected a number from 1 to {max}")]
    Invalid { input: String, max: usize },
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
