//! Selection resolver: user choice → video stream, plus companion audio.

use crate::error::SelectionError;
use ytmux_dl::formats::{FormatCatalog, StreamVariant, find_companion_audio};
use ytmux_dl::merge::SelectionResult;

/// Parse a 1-based choice and return the matching catalog entry.
pub fn resolve_video_choice<'a>(
    catalog: &'a FormatCatalog,
    raw_input: &str,
) -> Result<&'a StreamVariant, SelectionError> {
    let input = raw_input.trim();

    input
        .parse::<usize>()
        .ok()
        .and_then(|choice| catalog.get(choice))
        .ok_or_else(|| SelectionError::Invalid {
            input: input.to_string(),
            max: catalog.len(),
        })
}

/// Resolve the choice and pair it with the first m4a audio-only stream, if any.
pub fn select_streams(
    catalog: &FormatCatalog,
    variants: &[StreamVariant],
    raw_input: &str,
) -> Result<SelectionResult, SelectionError> {
    let video = resolve_video_choice(catalog, raw_input)?;
    let audio = find_companion_audio(variants);

    if audio.is_none() {
        tracing::warn!(video = video.format_id, "no m4a audio stream, downloading video only");
    }

    let selection = SelectionResult::new(video.format_id.as_str(), audio);
    tracing::debug!(format = selection.format_spec(), "resolved selection");

    Ok(selection)
}
