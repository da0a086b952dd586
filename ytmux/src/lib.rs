//! Interactive YouTube downloader: pick a quality, get one mp4 with video and audio merged.
//!
//! ## Modules
//!
//! - [`provision`] - Installs yt-dlp and a managed ffmpeg when missing
//! - [`env`] - Executable search path threaded through provisioning and download
//! - [`select`] - Quality choice → video stream plus companion audio
//! - [`download`] - Merged download and outcome reporting
//! - [`workflow`] - One interactive run over a [`session::Session`]
//! - [`cli`] - Command-line arguments and entry point

pub mod cli;
pub mod download;
pub mod env;
pub mod error;
pub mod extractor;
pub mod provision;
pub mod select;
pub mod session;
pub mod workflow;
