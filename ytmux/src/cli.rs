//! CLI argument definitions using clap.

use crate::env::ExecutionEnv;
use crate::extractor::YtDlp;
use crate::provision::SystemProvisioner;
use crate::session::Session;
use crate::workflow;
use clap::Parser;
use eyre::{Context, Result, ensure};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ytmux")]
#[command(about = "Download a YouTube video in a chosen quality, merged with its audio")]
#[command(version)]
pub struct Cli {
    /// Video URL (prompted for when omitted)
    pub url: Option<String>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding the managed ffmpeg (default: next to this executable)
    #[arg(long)]
    pub tools_dir: Option<PathBuf>,
}

/// Resolved run configuration.
#[derive(Debug)]
pub struct Config {
    /// Non-empty URL, if given on the command line
    pub url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub tools_dir: Option<PathBuf>,
}

impl TryFrom<Cli> for Config {
    type Error = eyre::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let url = cli
            .url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if let Some(dir) = cli.output.as_deref() {
            ensure!(dir.is_dir(), "output directory does not exist: {:?}", dir.display());
        }

        Ok(Self {
            url,
            output_dir: cli.output,
            tools_dir: cli.tools_dir,
        })
    }
}

/// Execute the interactive workflow on the process terminal.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    let config = Config::try_from(cli)?;
    let mut env = ExecutionEnv::from_process(config.tools_dir.clone())
        .wrap_err("failed to resolve program directory")?;

    let mut session = Session::new(io::stdin().lock(), io::stdout().lock());

    let outcome = workflow::run(
        &config,
        &SystemProvisioner,
        &YtDlp,
        &mut env,
        &mut session,
    )?;

    tracing::debug!(?outcome, "run finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::temp_dir;

    #[test]
    fn parses_without_arguments() {
        let cli = Cli::parse_from(["ytmux"]);

        assert!(cli.url.is_none());
        assert!(cli.output.is_none());
        assert!(cli.tools_dir.is_none());
    }

    #[test]
    fn parses_url_with_output() {
        let cli = Cli::parse_from(["ytmux", "https://youtu.be/jNQXAC9IVRw", "-o", "/tmp/videos"]);

        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/jNQXAC9IVRw"));
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("/tmp/videos")));
    }

    #[test]
    fn parses_tools_dir() {
        let cli = Cli::parse_from(["ytmux", "--tools-dir", "/opt/ytmux"]);

        assert_eq!(cli.tools_dir, Some(PathBuf::from("/opt/ytmux")));
    }

    #[test]
    fn blank_url_resolves_to_prompt() {
        let config = Config::try_from(Cli::parse_from(["ytmux", "   "])).unwrap();

        assert!(config.url.is_none());
    }

    #[test]
    fn url_is_trimmed() {
        let config = Config::try_from(Cli::parse_from(["ytmux", " https://youtu.be/x "])).unwrap();

        assert_eq!(config.url.as_deref(), Some("https://youtu.be/x"));
    }

    #[test]
    fn missing_output_dir_is_rejected() {
        let dir = temp_dir("cli-output").join("missing");
        let cli = Cli::parse_from(["ytmux", "-o", dir.to_str().unwrap()]);

        assert!(Config::try_from(cli).is_err());
    }
}
