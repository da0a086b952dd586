//! Stream variants reported by yt-dlp and the quality menu built from them.

use pyo3::FromPyObject;
use std::fmt;

/// Codec value yt-dlp uses for an absent stream (e.g. `vcodec` of audio-only formats).
pub const NO_CODEC: &str = "none";

/// Container accepted in the quality menu.
pub const VIDEO_EXT: &str = "mp4";

/// Container accepted for the companion audio stream.
pub const AUDIO_EXT: &str = "m4a";

/// `format_note` values that do not describe a real quality.
const PLACEHOLDER_LABELS: &[&str] = &["Unknown", "storyboard"];

/// One encoding of the source media, as reported in the info dict `formats` list.
#[derive(Clone, Debug, Default, PartialEq, FromPyObject)]
#[pyo3(from_item_all)]
pub struct StreamVariant {
    /// Opaque yt-dlp format identifier (e.g. `"137"`)
    pub format_id: String,
    /// Container extension
    pub ext: Option<String>,
    /// Video codec, `"none"` for audio-only
    pub vcodec: Option<String>,
    /// Audio codec, `"none"` for video-only
    pub acodec: Option<String>,
    /// Human-readable quality label (e.g. `"720p"`)
    pub format_note: Option<String>,
    pub fps: Option<f64>,
}

fn is_codec(codec: Option<&str>) -> bool {
    codec.is_some_and(|c| c != NO_CODEC)
}

impl StreamVariant {
    pub fn has_video(&self) -> bool {
        is_codec(self.vcodec.as_deref())
    }

    /// Explicit `"none"` video codec and an audio codec that is not `"none"`.
    ///
    /// A missing `acodec` counts as audio.
    pub fn is_audio_only(&self) -> bool {
        self.acodec.as_deref() != Some(NO_CODEC) && self.vcodec.as_deref() == Some(NO_CODEC)
    }

    /// Quality label, unless missing, empty or a placeholder.
    pub fn quality_label(&self) -> Option<&str> {
        self.format_note
            .as_deref()
            .filter(|label| !label.is_empty() && !PLACEHOLDER_LABELS.contains(label))
    }

    fn ext_is(&self, ext: &str) -> bool {
        self.ext.as_deref() == Some(ext)
    }

    /// Whether this variant belongs in the quality menu.
    pub fn is_selectable_video(&self) -> bool {
        self.has_video() && self.ext_is(VIDEO_EXT) && self.quality_label().is_some()
    }

    /// Frame rate for display: `30`, `29.97` or `N/A`.
    pub fn fps_label(&self) -> String {
        match self.fps {
            Some(fps) if fps.fract() == 0.0 => format!("{fps:.0}"),
            Some(fps) => fps.to_string(),
            None => "N/A".to_string(),
        }
    }
}

/// Selectable video variants in source order.
///
/// Position `i` in the catalog is shown to the user as choice `i + 1`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormatCatalog {
    entries: Vec<StreamVariant>,
}

impl FormatCatalog {
    /// Keep only mp4 video variants with a real quality label.
    pub fn build(variants: &[StreamVariant]) -> Self {
        let entries: Vec<_> = variants
            .iter()
            .filter(|v| v.is_selectable_video())
            .cloned()
            .collect();

        tracing::debug!(
            total = variants.len(),
            selectable = entries.len(),
            "built format catalog"
        );

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a 1-based choice.
    pub fn get(&self, choice: usize) -> Option<&StreamVariant> {
        choice.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn entries(&self) -> &[StreamVariant] {
        &self.entries
    }
}

/// One menu line per entry: `1. 720p - mp4 (30 FPS)`.
impl fmt::Display for FormatCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, i) in self.entries.iter().zip(1..) {
            writeln!(
                f,
                "{i}. {} - {} ({} FPS)",
                v.quality_label().unwrap_or_default(),
                v.ext.as_deref().unwrap_or_default(),
                v.fps_label()
            )?;
        }
        Ok(())
    }
}

/// First audio-only m4a variant in source order.
///
/// Searches the unfiltered list; `None` means the download degrades to video only.
pub fn find_companion_audio(variants: &[StreamVariant]) -> Option<&str> {
    variants
        .iter()
        .find(|v| v.is_audio_only() && v.ext_is(AUDIO_EXT))
        .map(|v| v.format_id.as_str())
}
