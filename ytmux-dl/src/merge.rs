//! Merge preset: one video stream plus an optional audio stream, muxed into mp4.
//!
//! ```no_run
//! use ytmux_dl::{dl::download, merge::SelectionResult};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let selection = SelectionResult::new("137", Some("140"));
//! let path = download("https://youtube.com/watch?v=example", selection.into())?;
//! println!("saved to {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! **Output:** `title.mp4` in the working directory unless `paths` is overridden.

use crate::dl::{DownloadOptions, OutputTemplates, PostProcessor};

/// Output container for merged downloads.
pub const MERGE_CONTAINER: &str = "mp4";

/// Filename template: title and final extension.
pub const TITLE_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Post-processor repairing m4a audio during the merge.
pub const FIXUP_M4A: &str = "FFmpegFixupM4a";

/// Chosen video stream and best-effort companion audio stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionResult {
    pub video_id: String,
    pub audio_id: Option<String>,
}

impl SelectionResult {
    pub fn new(video_id: impl Into<String>, audio_id: Option<impl Into<String>>) -> Self {
        Self {
            video_id: video_id.into(),
            audio_id: audio_id.map(Into::into),
        }
    }

    /// yt-dlp format spec: `video+audio`, or `video` alone.
    pub fn format_spec(&self) -> String {
        match &self.audio_id {
            Some(audio) => format!("{}+{}", self.video_id, audio),
            None => self.video_id.clone(),
        }
    }
}

impl From<SelectionResult> for DownloadOptions {
    /// Merge preset: selected streams → mp4 named after the title, with m4a fixup
    fn from(selection: SelectionResult) -> Self {
        Self {
            format: Some(selection.format_spec()),
            outtmpl: Some(OutputTemplates::simple(TITLE_TEMPLATE.to_string())),
            merge_output_format: Some(MERGE_CONTAINER.to_string()),
            postprocessors: Some(vec![PostProcessor::new(FIXUP_M4A)]),
            noplaylist: Some(true),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_spec_with_audio() {
        let selection = SelectionResult::new("137", Some("140"));
        assert_eq!(selection.format_spec(), "137+140");
    }

    #[test]
    fn format_spec_video_only() {
        let selection = SelectionResult::new("137", None::<String>);
        assert_eq!(selection.format_spec(), "137");
    }

    #[test]
    fn selection_to_download_options() {
        let opts: DownloadOptions = SelectionResult::new("136", Some("140")).into();

        assert_eq!(opts.format.as_deref(), Some("136+140"));
        assert!(matches!(
            opts,
            DownloadOptions {
                paths: None,
                outtmpl: Some(_),
                merge_output_format: Some(_),
                postprocessors: Some(_),
                ffmpeg_location: None,
                noplaylist: Some(true),
                ..
            }
        ));
    }

    #[test]
    fn preset_requests_m4a_fixup() {
        let opts: DownloadOptions = SelectionResult::new("136", None::<String>).into();
        let keys: Vec<_> = opts
            .postprocessors
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.key)
            .collect();

        assert_eq!(keys, [FIXUP_M4A]);
        assert_eq!(opts.merge_output_format.as_deref(), Some(MERGE_CONTAINER));
    }
}
