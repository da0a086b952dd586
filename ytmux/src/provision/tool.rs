//! Managed ffmpeg: platform distribution, archive download and extraction.
//!
//! **Layout:** `<program_dir>/ffmpeg/bin/ffmpeg[.exe]`

use super::MEDIA_TOOL;
use crate::env::{ExecutionEnv, exe_name};
use crate::error::{ProvisionError, Result};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

const WINDOWS_URL: &str = "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip";
const MACOS_URL: &str = "https://evermeet.cx/ffmpeg/ffmpeg-6.0.zip";
const LINUX_URL_PREFIX: &str = "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Host OS families with a prebuilt distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Map a `std::env::consts::OS` value.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            other => Err(ProvisionError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarXz,
}

impl ArchiveKind {
    /// File name the archive is saved under.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Zip => "ffmpeg.zip",
            Self::TarXz => "ffmpeg.tar.xz",
        }
    }
}

/// Where to fetch a prebuilt ffmpeg and how it is packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolDistribution {
    pub url: String,
    pub archive: ArchiveKind,
}

impl ToolDistribution {
    /// Distribution for a platform and `std::env::consts::ARCH` value.
    ///
    /// Linux static builds are picked per architecture, falling back to i686.
    pub fn for_platform(platform: Platform, arch: &str) -> Self {
        match platform {
            Platform::Windows => Self {
                url: WINDOWS_URL.to_string(),
                archive: ArchiveKind::Zip,
            },
            Platform::MacOs => Self {
                url: MACOS_URL.to_string(),
                archive: ArchiveKind::Zip,
            },
            Platform::Linux => {
                let build = match arch {
                    "x86_64" => "amd64",
                    "aarch64" => "arm64",
                    "arm" => "armhf",
                    _ => "i686",
                };
                Self {
                    url: format!("{LINUX_URL_PREFIX}{build}-static.tar.xz"),
                    archive: ArchiveKind::TarXz,
                }
            }
        }
    }
}

/// Managed tool paths under the program directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolLayout {
    /// Extraction root: `<program_dir>/ffmpeg`
    pub tool_dir: PathBuf,
    /// Canonical bin directory: `<program_dir>/ffmpeg/bin`
    pub bin_dir: PathBuf,
    /// Canonical executable path
    pub exe: PathBuf,
}

impl ToolLayout {
    pub fn new(program_dir: &Path) -> Self {
        let tool_dir = program_dir.join(MEDIA_TOOL);
        let bin_dir = tool_dir.join("bin");
        let exe = bin_dir.join(exe_name(MEDIA_TOOL));
        Self {
            tool_dir,
            bin_dir,
            exe,
        }
    }
}

/// Download, extract and install ffmpeg, then append its bin directory to `env`.
///
/// Returns the installed executable path. Nothing is rolled back on failure.
pub fn provision_media_tool(env: &mut ExecutionEnv, out: &mut dyn Write) -> Result<PathBuf> {
    let platform = Platform::current()?;
    let dist = ToolDistribution::for_platform(platform, std::env::consts::ARCH);
    let layout = ToolLayout::new(env.program_dir());
    let archive_path = env.program_dir().join(dist.archive.file_name());

    tracing::info!(?platform, url = dist.url, "provisioning media tool");

    fs::create_dir_all(&layout.bin_dir).map_err(ProvisionError::fs(&layout.bin_dir))?;

    writeln!(
        out,
        "Downloading {MEDIA_TOOL} from {} to {}...",
        dist.url,
        archive_path.display()
    )?;
    fetch(&dist.url, &archive_path)?;
    writeln!(out, "Download complete.")?;

    writeln!(out, "Extracting {MEDIA_TOOL}...")?;
    extract(dist.archive, &archive_path, &layout.tool_dir)?;
    writeln!(out, "Extraction complete.")?;

    install_extracted(&layout)?;
    fs::remove_file(&archive_path).map_err(ProvisionError::fs(&archive_path))?;

    env.append_path(layout.bin_dir.clone());

    writeln!(
        out,
        "{MEDIA_TOOL} installed and available at: {}",
        layout.exe.display()
    )?;

    Ok(layout.exe)
}

/// Stream `url` into `dest`.
fn fetch(url: &str, dest: &Path) -> Result<()> {
    let download_err = |source: reqwest::Error| ProvisionError::Download {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(download_err)?;

    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let mut file = File::create(dest).map_err(ProvisionError::fs(dest))?;
    let bytes = response.copy_to(&mut file).map_err(download_err)?;

    tracing::debug!(bytes, dest = %dest.display(), "archive downloaded");
    Ok(())
}

/// Unpack an archive into `dest`.
pub fn extract(kind: ArchiveKind, archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(ProvisionError::fs(archive_path))?;
    let reader = BufReader::new(file);

    match kind {
        ArchiveKind::Zip => {
            let zip_err = |source: zip::result::ZipError| ProvisionError::Zip {
                path: archive_path.to_path_buf(),
                source,
            };
            zip::ZipArchive::new(reader)
                .and_then(|mut archive| archive.extract(dest))
                .map_err(zip_err)
        }
        ArchiveKind::TarXz => {
            let decoder = xz2::read::XzDecoder::new(reader);
            tar::Archive::new(decoder)
                .unpack(dest)
                .map_err(ProvisionError::fs(archive_path))
        }
    }
}

/// Locate the executable in an extracted tree.
///
/// Searches top-level directories whose name contains the tool name (`<dir>/bin/<exe>`,
/// then `<dir>/<exe>`), then the root itself. Returns the executable and, if it came
/// from a nested directory, that directory.
pub fn locate_executable(layout: &ToolLayout) -> Result<Option<(PathBuf, Option<PathBuf>)>> {
    let name = exe_name(MEDIA_TOOL);

    let mut dirs: Vec<PathBuf> = fs::read_dir(&layout.tool_dir)
        .map_err(ProvisionError::fs(&layout.tool_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir() && *path != layout.bin_dir)
        .filter(|path| {
            path.file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains(MEDIA_TOOL))
        })
        .collect();
    dirs.sort();

    for dir in dirs {
        for candidate in [dir.join("bin").join(&name), dir.join(&name)] {
            if candidate.is_file() {
                return Ok(Some((candidate, Some(dir))));
            }
        }
    }

    let root = layout.tool_dir.join(&name);
    Ok(root.is_file().then_some((root, None)))
}

/// Move the extracted executable into the bin directory and drop the extracted tree.
pub fn install_extracted(layout: &ToolLayout) -> Result<()> {
    let (found, extracted_dir) =
        locate_executable(layout)?.ok_or_else(|| ProvisionError::MissingExecutable {
            exe: exe_name(MEDIA_TOOL),
            dir: layout.tool_dir.clone(),
        })?;

    tracing::debug!(from = %found.display(), to = %layout.exe.display(), "moving executable");

    fs::rename(&found, &layout.exe).map_err(ProvisionError::fs(&found))?;
    set_executable(&layout.exe)?;

    if let Some(dir) = extracted_dir {
        fs::remove_dir_all(&dir).map_err(ProvisionError::fs(&dir))?;
    }

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(ProvisionError::fs(path))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
