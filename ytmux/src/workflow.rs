//! One run: provision → catalog → select → download.

use crate::cli::Config;
use crate::download::{self, DownloadOutcome, DownloadRequest};
use crate::env::ExecutionEnv;
use crate::extractor::Extractor;
use crate::provision::{self, MEDIA_TOOL, Provisioner};
use crate::select::select_streams;
use crate::session::Session;
use color_eyre::Section;
use eyre::{Context, Result, bail};
use std::io::{BufRead, Write};
use ytmux_dl::formats::FormatCatalog;

const URL_PROMPT: &str = "Enter the YouTube video URL: ";
const QUALITY_PROMPT: &str = "\nSelect a quality (enter number): ";

/// How a run that did not fail ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// No selectable mp4 video variant
    NoFormats,
    /// Quality choice did not name a catalog entry
    InvalidChoice,
    /// Download attempted, successfully or not
    Downloaded(DownloadOutcome),
}

/// Execute the workflow once. `Err` is reserved for fatal conditions.
pub fn run<R: BufRead, W: Write>(
    config: &Config,
    provisioner: &impl Provisioner,
    extractor: &impl Extractor,
    env: &mut ExecutionEnv,
    session: &mut Session<R, W>,
) -> Result<RunOutcome> {
    provision::ensure_dependencies(provisioner, env, session.output())
        .wrap_err("failed to provision dependencies")
        .with_suggestion(|| {
            format!(
                "install yt-dlp and {MEDIA_TOOL} manually, or make {:?} writable",
                env.program_dir().display()
            )
        })?;

    let url = match &config.url {
        Some(url) => url.clone(),
        None => session.prompt(URL_PROMPT)?,
    };

    if url.is_empty() {
        bail!("no URL provided");
    }

    let info = extractor.extract_info(&url)?;
    let catalog = FormatCatalog::build(&info.formats);

    let out = session.output();
    writeln!(out, "\nAvailable quality options:")?;
    write!(out, "{catalog}")?;

    if catalog.is_empty() {
        writeln!(out, "No valid video formats found.")?;
        return Ok(RunOutcome::NoFormats);
    }

    let choice = session.prompt(QUALITY_PROMPT)?;

    let selection = match select_streams(&catalog, &info.formats, &choice) {
        Ok(selection) => selection,
        Err(err) => {
            tracing::info!(%err, "quality choice rejected");
            writeln!(session.output(), "Invalid choice.")?;
            return Ok(RunOutcome::InvalidChoice);
        }
    };

    let request = DownloadRequest {
        url,
        selection,
        output_dir: config.output_dir.clone(),
        ffmpeg_location: env.managed_location(MEDIA_TOOL).map(Into::into),
    };

    let outcome = download::execute(extractor, &request);
    outcome.report(session.output())?;

    Ok(RunOutcome::Downloaded(outcome))
}
