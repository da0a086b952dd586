//! yt-dlp Python API wrappers.
//!
//! Type-safe bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) `YoutubeDL` parameters.
//!
//! ```no_run
//! use ytmux_dl::dl::{DownloadOptions, extract_info};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = extract_info("https://youtube.com/watch?v=example", DownloadOptions::metadata_only())?;
//! println!("{} formats", info.formats.len());
//! # Ok(())
//! # }
//! ```

use crate::error::DownloadError;
use crate::formats::StreamVariant;
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Filename templates using `%(field)s` syntax. Key `default` required.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputTemplates(pub Option<HashMap<String, String>>);

impl OutputTemplates {
    /// Create with a single default template.
    pub fn simple(default: String) -> Self {
        Self(Some(HashMap::from([("default".to_string(), default)])))
    }
}

/// Download directories: `home` and type-specific paths.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputPaths(pub Option<HashMap<String, String>>);

impl OutputPaths {
    /// Create with a home directory only.
    pub fn home(home: &Path) -> Self {
        Self::default().with_home(home)
    }

    pub fn with_home(self, home: &Path) -> Self {
        let mut inner = self.0.unwrap_or_default();
        inner.insert("home".to_string(), home.to_string_lossy().to_string());
        Self(Some(inner))
    }
}

/// Post-download operation identified by its yt-dlp `key` (e.g., `"FFmpegFixupM4a"`).
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct PostProcessor {
    pub key: String,
}

impl PostProcessor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// yt-dlp configuration passed to `YoutubeDL(params)`.
///
/// `None` values are omitted, so yt-dlp falls back to its own defaults.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct DownloadOptions {
    pub format: Option<String>,
    pub paths: Option<OutputPaths>,
    pub outtmpl: Option<OutputTemplates>,
    pub merge_output_format: Option<String>,
    pub postprocessors: Option<Vec<PostProcessor>>,
    /// Directory holding the ffmpeg binary, when it is not on the inherited `PATH`
    pub ffmpeg_location: Option<String>,
    pub noplaylist: Option<bool>,
    pub quiet: Option<bool>,
    pub no_warnings: Option<bool>,
}

impl DownloadOptions {
    /// Silent listing: no progress output or warnings while fetching metadata.
    pub fn metadata_only() -> Self {
        Self {
            quiet: Some(true),
            no_warnings: Some(true),
            ..Default::default()
        }
    }
}

/// Metadata-only view of a yt-dlp info dict.
///
/// Every key is normalized on the Python side, so missing fields arrive as `None`.
#[derive(Clone, Debug, FromPyObject)]
#[pyo3(from_item_all)]
pub struct MediaInfo {
    /// Video identifier
    pub id: Option<String>,
    /// Video title
    pub title: Option<String>,
    /// Every stream variant yt-dlp reported, in source order
    pub formats: Vec<StreamVariant>,
}

fn helper_module(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    PyModule::from_code(py, c_str!(include_str!("./dl.py")), c"dl.py", c"ytmux_dl")
}

/// Whether `yt_dlp` can be imported by the embedded interpreter.
///
/// Import caches are invalidated first, so a package installed during this
/// process is picked up.
pub fn library_available() -> PyResult<bool> {
    Python::attach(|py| {
        let available = helper_module(py)?
            .getattr("library_available")?
            .call0()?
            .extract()?;
        Ok(available)
    })
}

/// Path of a Python executable belonging to the embedded interpreter's installation.
///
/// Used to run `-m pip` against the same `site-packages` the bindings import from.
pub fn interpreter_path() -> PyResult<PathBuf> {
    Python::attach(|py| {
        let path = helper_module(py)?.getattr("interpreter")?.call0()?.extract()?;
        Ok(path)
    })
}

/// List available formats without downloading.
///
/// Uses `extract_info(url, download=False)`.
pub fn extract_info(url: &str, opts: DownloadOptions) -> Result<MediaInfo, PyErr> {
    tracing::debug!(url, ?opts, "extracting metadata");

    Python::attach(|py| {
        let module = helper_module(py)?;

        let py_params = opts.into_pyobject(py)?;

        let info = module.getattr("extract")?.call1((url, py_params))?;

        info.extract()
    })
}

/// Download a single URL and return the final file path.
///
/// Uses `extract_info(url, download=True)` followed by `prepare_filename` on the
/// returned info dict, so the path reflects the merged container extension.
pub fn download(url: &str, opts: DownloadOptions) -> Result<PathBuf, DownloadError> {
    tracing::debug!(url, ?opts, "downloading");

    Python::attach(|py| {
        let run = || -> PyResult<PathBuf> {
            let module = helper_module(py)?;
            let py_params = opts.into_pyobject(py)?;
            let path = module
                .getattr("download")?
                .call1((url, py_params))?
                .extract()?;
            Ok(path)
        };

        run().map_err(|e| DownloadError::from_py(py, &e))
    })
}
