//! Execution environment threaded through provisioning and download.
//!
//! Holds the executable search path read once from `PATH`. Directories added by
//! provisioning are recorded here instead of mutating the process environment.

use std::env;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// Platform file name of an executable (`ffmpeg` or `ffmpeg.exe`).
pub fn exe_name(tool: &str) -> String {
    format!("{tool}{}", env::consts::EXE_SUFFIX)
}

/// Regular file with an execute bit (any file on Windows).
pub fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|metadata| metadata.is_file() && has_exec_bit(&metadata))
}

#[cfg(unix)]
fn has_exec_bit(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_metadata: &Metadata) -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct ExecutionEnv {
    program_dir: PathBuf,
    search_path: Vec<PathBuf>,
    appended: Vec<PathBuf>,
}

impl ExecutionEnv {
    pub fn new(program_dir: PathBuf, search_path: Vec<PathBuf>) -> Self {
        Self {
            program_dir,
            search_path,
            appended: Vec::new(),
        }
    }

    /// Snapshot `PATH`; `program_dir` defaults to the running executable's directory.
    pub fn from_process(program_dir: Option<PathBuf>) -> io::Result<Self> {
        let program_dir = match program_dir {
            Some(dir) => dir,
            None => {
                let exe = env::current_exe()?;
                exe.parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| io::Error::other("executable has no parent directory"))?
            }
        };

        let search_path = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();

        tracing::debug!(program_dir = %program_dir.display(), "execution environment");

        Ok(Self::new(program_dir, search_path))
    }

    /// Base directory for managed tools.
    pub fn program_dir(&self) -> &Path {
        &self.program_dir
    }

    /// Inherited entries followed by appended ones.
    pub fn search_path(&self) -> impl Iterator<Item = &Path> {
        self.search_path
            .iter()
            .chain(&self.appended)
            .map(PathBuf::as_path)
    }

    /// Directories added during this run.
    pub fn appended(&self) -> &[PathBuf] {
        &self.appended
    }

    /// Append a directory once; later lookups and spawned processes see it.
    pub fn append_path(&mut self, dir: PathBuf) {
        if self.search_path().any(|d| d == dir.as_path()) {
            return;
        }

        tracing::debug!(dir = %dir.display(), "append to search path");
        self.appended.push(dir);
    }

    /// Resolve a tool through the search path.
    pub fn find_executable(&self, tool: &str) -> Option<PathBuf> {
        let name = exe_name(tool);
        self.search_path()
            .map(|dir| dir.join(&name))
            .find(|path| is_executable(path))
    }

    /// Appended directory providing `tool`, for libraries that take an explicit location.
    pub fn managed_location(&self, tool: &str) -> Option<&Path> {
        let name = exe_name(tool);
        self.appended
            .iter()
            .find(|dir| is_executable(&dir.join(&name)))
            .map(PathBuf::as_path)
    }

    /// `PATH` value for child processes.
    pub fn joined_path(&self) -> Result<OsString, env::JoinPathsError> {
        env::join_paths(self.search_path())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Fresh directory under the system temp dir.
    pub(crate) fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join("ytmux-test").join(name);
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    /// Write an executable stub named after `tool` into `dir`.
    pub(crate) fn write_executable(dir: &Path, tool: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(exe_name(tool));
        fs::write(&path, b"#!/bin/sh\n").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        path
    }

    #[test]
    fn finds_tool_on_search_path() {
        let root = temp_dir("env-find");
        let bin = root.join("bin");
        let exe = write_executable(&bin, "fake-tool");

        let env = ExecutionEnv::new(root.clone(), vec![root.join("missing"), bin]);

        assert_eq!(env.find_executable("fake-tool"), Some(exe));
        assert_eq!(env.find_executable("other-tool"), None);
    }

    #[cfg(unix)]
    #[test]
    fn ignores_non_executable_files() {
        let root = temp_dir("env-nonexec");
        fs::write(root.join("fake-tool"), b"").unwrap();

        let env = ExecutionEnv::new(root.clone(), vec![root]);

        assert_eq!(env.find_executable("fake-tool"), None);
    }

    #[test]
    fn append_is_idempotent_and_searched() {
        let root = temp_dir("env-append");
        let bin = root.join("bin");
        write_executable(&bin, "fake-tool");

        let mut env = ExecutionEnv::new(root, Vec::new());
        assert!(env.find_executable("fake-tool").is_none());

        env.append_path(bin.clone());
        env.append_path(bin.clone());

        assert_eq!(env.appended(), [bin.clone()]);
        assert!(env.find_executable("fake-tool").is_some());
        assert_eq!(env.managed_location("fake-tool"), Some(bin.as_path()));
    }

    #[test]
    fn inherited_entries_are_not_managed() {
        let root = temp_dir("env-inherited");
        let bin = root.join("bin");
        write_executable(&bin, "fake-tool");

        let mut env = ExecutionEnv::new(root, vec![bin.clone()]);
        env.append_path(bin);

        assert!(env.appended().is_empty());
        assert!(env.managed_location("fake-tool").is_none());
    }

    #[test]
    fn joined_path_keeps_order() {
        let mut exec_env = ExecutionEnv::new(
            PathBuf::from("/opt/app"),
            vec![PathBuf::from("/usr/bin"), PathBuf::from("/bin")],
        );
        exec_env.append_path(PathBuf::from("/opt/app/ffmpeg/bin"));

        let joined = exec_env.joined_path().unwrap();
        let split: Vec<_> = env::split_paths(&joined).collect();

        assert_eq!(
            split,
            [
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
                PathBuf::from("/opt/app/ffmpeg/bin")
            ]
        );
    }
}
