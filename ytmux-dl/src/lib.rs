//! Type-safe Rust bindings to the [yt-dlp](https://github.com/yt-dlp/yt-dlp) Python library,
//! scoped to listing formats and merging one video stream with one audio stream.
//!
//! ## Modules
//!
//! - [`dl`] - Core yt-dlp API wrappers
//! - [`formats`] - Stream variants, quality catalog and companion audio lookup
//! - [`merge`] - Merge preset turning a selection into download options
//! - [`error`] - Download failure classification
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytmux_dl::dl::{DownloadOptions, download, extract_info};
//! use ytmux_dl::formats::{FormatCatalog, find_companion_audio};
//! use ytmux_dl::merge::SelectionResult;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "https://youtube.com/watch?v=example";
//! let info = extract_info(url, DownloadOptions::metadata_only())?;
//!
//! let catalog = FormatCatalog::build(&info.formats);
//! print!("{catalog}");
//!
//! if let Some(video) = catalog.get(1) {
//!     let audio = find_companion_audio(&info.formats);
//!     let selection = SelectionResult::new(video.format_id.as_str(), audio);
//!     download(url, selection.into())?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod dl;
pub mod error;
pub mod formats;
pub mod merge;
