//! Dependency provisioning: the yt-dlp Python package and the ffmpeg executable.
//!
//! Effectful steps sit behind [`Provisioner`]; the checks that decide whether they
//! run are plain functions over an [`ExecutionEnv`]. Present dependencies
//! short-circuit without any install call.

pub mod tool;

use crate::env::{ExecutionEnv, exe_name, is_executable};
use crate::error::{ProvisionError, Result};
use std::io::Write;
use std::process::Command;
use ytmux_dl::dl;

/// Package providing the extraction library.
pub const LIBRARY_PACKAGE: &str = "yt-dlp";

/// Media tool yt-dlp shells out to for merging.
pub const MEDIA_TOOL: &str = "ffmpeg";

/// Installation capabilities used by the workflow.
pub trait Provisioner {
    /// Whether the extraction library is importable.
    fn library_available(&self) -> Result<bool>;

    /// Install the extraction library.
    fn install_library(&self, env: &ExecutionEnv) -> Result<()>;

    /// Install the media tool and register its directory in `env`.
    fn install_tool(&self, env: &mut ExecutionEnv, out: &mut dyn Write) -> Result<()>;
}

/// Real provisioner: pip for the library, prebuilt archives for ffmpeg.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProvisioner;

impl Provisioner for SystemProvisioner {
    fn library_available(&self) -> Result<bool> {
        Ok(dl::library_available()?)
    }

    fn install_library(&self, env: &ExecutionEnv) -> Result<()> {
        let python = dl::interpreter_path()?;

        tracing::info!(python = %python.display(), package = LIBRARY_PACKAGE, "pip install");

        let status = Command::new(&python)
            .args(["-m", "pip", "install", LIBRARY_PACKAGE])
            .env("PATH", env.joined_path()?)
            .status()
            .map_err(|source| ProvisionError::InstallerSpawn {
                package: LIBRARY_PACKAGE.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(ProvisionError::InstallerFailed {
                package: LIBRARY_PACKAGE.to_string(),
                status,
            });
        }

        Ok(())
    }

    fn install_tool(&self, env: &mut ExecutionEnv, out: &mut dyn Write) -> Result<()> {
        tool::provision_media_tool(env, out).map(|_| ())
    }
}

/// Install the extraction library if it cannot be imported, then re-check.
pub fn ensure_library_available(
    provisioner: &impl Provisioner,
    env: &ExecutionEnv,
    out: &mut dyn Write,
) -> Result<()> {
    if provisioner.library_available()? {
        tracing::debug!(package = LIBRARY_PACKAGE, "library available");
        return Ok(());
    }

    writeln!(out, "{LIBRARY_PACKAGE} not found. Installing {LIBRARY_PACKAGE}...")?;
    provisioner.install_library(env)?;

    if !provisioner.library_available()? {
        return Err(ProvisionError::LibraryStillMissing {
            package: LIBRARY_PACKAGE.to_string(),
        });
    }

    tracing::info!(package = LIBRARY_PACKAGE, "library installed");
    Ok(())
}

/// True if the media tool is on the search path or in the managed bin directory.
///
/// A managed binary found next to the program gets its directory appended to `env`.
pub fn is_media_tool_available(env: &mut ExecutionEnv) -> bool {
    if let Some(path) = env.find_executable(MEDIA_TOOL) {
        tracing::debug!(path = %path.display(), "media tool on search path");
        return true;
    }

    let bin_dir = tool::ToolLayout::new(env.program_dir()).bin_dir;

    if is_executable(&bin_dir.join(exe_name(MEDIA_TOOL))) {
        tracing::debug!(dir = %bin_dir.display(), "managed media tool found");
        env.append_path(bin_dir);
        return true;
    }

    false
}

/// Install the media tool unless it is already reachable.
pub fn ensure_media_tool(
    provisioner: &impl Provisioner,
    env: &mut ExecutionEnv,
    out: &mut dyn Write,
) -> Result<()> {
    if is_media_tool_available(env) {
        return Ok(());
    }

    writeln!(out, "{MEDIA_TOOL} not found. Installing {MEDIA_TOOL}...")?;
    provisioner.install_tool(env, out)
}

/// Provision everything a download needs, library first.
pub fn ensure_dependencies(
    provisioner: &impl Provisioner,
    env: &mut ExecutionEnv,
    out: &mut dyn Write,
) -> Result<()> {
    ensure_library_available(provisioner, env, out)?;
    ensure_media_tool(provisioner, env, out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::env::tests::{temp_dir, write_executable};
    use std::cell::Cell;
    use std::path::PathBuf;

    /// Provisioner that records calls instead of touching the system.
    #[derive(Default)]
    pub(crate) struct FakeProvisioner {
        pub library_present: Cell<bool>,
        pub library_installs: Cell<usize>,
        pub tool_installs: Cell<usize>,
        pub library_checks: Cell<usize>,
        /// Whether `install_library` makes the library importable
        pub install_fixes_library: bool,
        /// Whether `install_library` fails as if the installer could not start
        pub installer_missing: bool,
    }

    impl FakeProvisioner {
        pub(crate) fn ready() -> Self {
            Self {
                library_present: Cell::new(true),
                ..Default::default()
            }
        }
    }

    impl Provisioner for FakeProvisioner {
        fn library_available(&self) -> Result<bool> {
            self.library_checks.set(self.library_checks.get() + 1);
            Ok(self.library_present.get())
        }

        fn install_library(&self, _env: &ExecutionEnv) -> Result<()> {
            self.library_installs.set(self.library_installs.get() + 1);

            if self.installer_missing {
                return Err(ProvisionError::InstallerSpawn {
                    package: LIBRARY_PACKAGE.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }

            self.library_present.set(self.install_fixes_library);
            Ok(())
        }

        fn install_tool(&self, env: &mut ExecutionEnv, _out: &mut dyn Write) -> Result<()> {
            self.tool_installs.set(self.tool_installs.get() + 1);
            let bin_dir = tool::ToolLayout::new(env.program_dir()).bin_dir;
            write_executable(&bin_dir, MEDIA_TOOL);
            env.append_path(bin_dir);
            Ok(())
        }
    }

    fn dir_entries(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn present_dependencies_are_left_alone() {
        let root = temp_dir("provision-present");
        let system_bin = root.join("system-bin");
        write_executable(&system_bin, MEDIA_TOOL);

        let before = dir_entries(&root);
        let provisioner = FakeProvisioner::ready();
        let mut env = ExecutionEnv::new(root.clone(), vec![system_bin]);
        let mut out = Vec::new();

        ensure_dependencies(&provisioner, &mut env, &mut out).unwrap();

        assert_eq!(provisioner.library_installs.get(), 0);
        assert_eq!(provisioner.tool_installs.get(), 0);
        assert!(env.appended().is_empty());
        assert!(out.is_empty());
        assert_eq!(dir_entries(&root), before);
    }

    #[test]
    fn missing_library_is_installed_once() {
        let root = temp_dir("provision-library");
        let provisioner = FakeProvisioner {
            install_fixes_library: true,
            ..Default::default()
        };
        let env = ExecutionEnv::new(root, Vec::new());
        let mut out = Vec::new();

        ensure_library_available(&provisioner, &env, &mut out).unwrap();

        assert_eq!(provisioner.library_installs.get(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "yt-dlp not found. Installing yt-dlp...\n"
        );
    }

    #[test]
    fn library_still_missing_after_install_is_fatal() {
        let root = temp_dir("provision-library-fail");
        let provisioner = FakeProvisioner::default();
        let env = ExecutionEnv::new(root, Vec::new());

        let err = ensure_library_available(&provisioner, &env, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, ProvisionError::LibraryStillMissing { .. }));
    }

    #[test]
    fn failed_install_propagates_without_recheck() {
        let root = temp_dir("provision-installer-missing");
        let provisioner = FakeProvisioner {
            installer_missing: true,
            ..Default::default()
        };
        let env = ExecutionEnv::new(root, Vec::new());

        let err = ensure_library_available(&provisioner, &env, &mut Vec::new()).unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::InstallerSpawn { ref package, .. } if package == LIBRARY_PACKAGE
        ));
        assert_eq!(provisioner.library_installs.get(), 1);
        assert_eq!(provisioner.library_checks.get(), 1);
    }

    #[test]
    fn managed_tool_next_to_program_is_registered() {
        let root = temp_dir("provision-managed");
        let bin_dir = tool::ToolLayout::new(&root).bin_dir;
        write_executable(&bin_dir, MEDIA_TOOL);

        let mut env = ExecutionEnv::new(root, Vec::new());

        assert!(is_media_tool_available(&mut env));
        assert_eq!(env.appended(), [bin_dir.clone()]);
        assert_eq!(env.managed_location(MEDIA_TOOL), Some(bin_dir.as_path()));
    }

    #[test]
    fn missing_tool_is_installed_then_short_circuits() {
        let root = temp_dir("provision-tool");
        let provisioner = FakeProvisioner::ready();
        let mut env = ExecutionEnv::new(root, Vec::new());
        let mut out = Vec::new();

        ensure_media_tool(&provisioner, &mut env, &mut out).unwrap();
        ensure_media_tool(&provisioner, &mut env, &mut out).unwrap();

        assert_eq!(provisioner.tool_installs.get(), 1);
        assert!(env.managed_location(MEDIA_TOOL).is_some());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ffmpeg not found. Installing ffmpeg...\n"
        );
    }
}
