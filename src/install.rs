use std::{
    env, fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use strum_macros::Display;

use crate::TaskError;

/// Host operating system family, as far as install conventions go.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HostOs {
    /// Installs under `ProgramFiles` / `LOCALAPPDATA`, binary named with `.exe`
    Windows,
    /// Installs under `/usr/local/bin` / `$HOME/.local/bin`
    Unix,
}

impl HostOs {
    /// The family this program was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            HostOs::Windows
        } else {
            HostOs::Unix
        }
    }
}

/// Whether a binary is installed for the current user only, or system-wide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum InstallScope {
    User,
    Global,
}

/// Host environment inputs used to resolve install directories.
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    pub home: Option<PathBuf>,
    pub program_files: Option<PathBuf>,
    pub local_app_data: Option<PathBuf>,
}

impl HostEnv {
    /// Read the relevant variables from the process environment.
    pub fn from_os() -> Self {
        Self {
            home: dirs::home_dir(),
            program_files: env::var_os("ProgramFiles").map(PathBuf::from),
            local_app_data: env::var_os("LOCALAPPDATA").map(PathBuf::from),
        }
    }
}

/// A resolved install destination: the directory and the binary file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub dest_dir: PathBuf,
    pub bin_name: String,
}

impl InstallTarget {
    /// Resolve the destination for `name` from {os, scope}.
    ///
    /// `dest_override` short-circuits the directory lookup but the binary
    /// name still follows the OS convention.
    pub fn resolve(
        name: &str,
        os: HostOs,
        scope: InstallScope,
        env: &HostEnv,
        dest_override: Option<PathBuf>,
    ) -> Result<Self, TaskError> {
        let bin_name = match os {
            HostOs::Windows => format!("{name}.exe"),
            HostOs::Unix => name.to_string(),
        };

        if let Some(dest_dir) = dest_override {
            debug!("Using install path override: {}", dest_dir.display());
            return Ok(Self { dest_dir, bin_name });
        }

        let dest_dir = match (os, scope) {
            (HostOs::Windows, InstallScope::Global) => env
                .program_files
                .clone()
                .ok_or(TaskError::MissingEnv {
                    name: "ProgramFiles",
                })?
                .join(name),
            (HostOs::Windows, InstallScope::User) => env
                .local_app_data
                .clone()
                .ok_or(TaskError::MissingEnv {
                    name: "LOCALAPPDATA",
                })?
                .join("Programs")
                .join(name),
            (HostOs::Unix, InstallScope::Global) => PathBuf::from("/usr/local/bin"),
            (HostOs::Unix, InstallScope::User) => env
                .home
                .clone()
                .ok_or(TaskError::NoHomeDir)?
                .join(".local")
                .join("bin"),
        };

        debug!("Using install path: {}", dest_dir.display());

        Ok(Self { dest_dir, bin_name })
    }

    /// Full path of the installed binary.
    pub fn dest(&self) -> PathBuf {
        self.dest_dir.join(&self.bin_name)
    }

    /// Copy `source` into place, creating the destination directory first.
    pub fn install_bin(&self, source: &Path) -> Result<(), TaskError> {
        fs::create_dir_all(&self.dest_dir)?;

        let dest = self.dest();
        info!("Installing {} -> {}", source.display(), dest.display());
        fs::copy(source, &dest)?;

        #[cfg(target_family = "unix")]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn env_with_everything() -> HostEnv {
        HostEnv {
            home: Some(PathBuf::from("/home/dev")),
            program_files: Some(PathBuf::from(r"C:\Program Files")),
            local_app_data: Some(PathBuf::from(r"C:\Users\dev\AppData\Local")),
        }
    }

    #[test]
    fn unix_global() {
        init();

        let target = InstallTarget::resolve(
            "gbax",
            HostOs::Unix,
            InstallScope::Global,
            &env_with_everything(),
            None,
        )
        .unwrap();

        assert_eq!(target.dest_dir, PathBuf::from("/usr/local/bin"));
        assert_eq!(target.bin_name, "gbax");
    }

    #[test]
    fn unix_user() {
        init();

        let target = InstallTarget::resolve(
            "gbax",
            HostOs::Unix,
            InstallScope::User,
            &env_with_everything(),
            None,
        )
        .unwrap();

        assert_eq!(target.dest_dir, PathBuf::from("/home/dev/.local/bin"));
        assert_eq!(target.bin_name, "gbax");
    }

    #[test]
    fn windows_global() {
        init();

        let target = InstallTarget::resolve(
            "gbax",
            HostOs::Windows,
            InstallScope::Global,
            &env_with_everything(),
            None,
        )
        .unwrap();

        assert_eq!(
            target.dest_dir,
            PathBuf::from(r"C:\Program Files").join("gbax")
        );
        assert_eq!(target.bin_name, "gbax.exe");
    }

    #[test]
    fn windows_user() {
        init();

        let target = InstallTarget::resolve(
            "gbax",
            HostOs::Windows,
            InstallScope::User,
            &env_with_everything(),
            None,
        )
        .unwrap();

        assert_eq!(
            target.dest_dir,
            PathBuf::from(r"C:\Users\dev\AppData\Local")
                .join("Programs")
                .join("gbax")
        );
        assert_eq!(target.bin_name, "gbax.exe");
    }

    #[test]
    fn unix_user_without_home_errors() {
        init();

        let err = InstallTarget::resolve(
            "gbax",
            HostOs::Unix,
            InstallScope::User,
            &HostEnv::default(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, TaskError::NoHomeDir));
    }

    #[test]
    fn windows_without_env_errors() {
        init();

        let err = InstallTarget::resolve(
            "gbax",
            HostOs::Windows,
            InstallScope::Global,
            &HostEnv::default(),
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TaskError::MissingEnv {
                name: "ProgramFiles"
            }
        ));

        let err = InstallTarget::resolve(
            "gbax",
            HostOs::Windows,
            InstallScope::User,
            &HostEnv::default(),
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TaskError::MissingEnv {
                name: "LOCALAPPDATA"
            }
        ));
    }

    #[test]
    fn override_wins_but_name_still_follows_os() {
        init();

        let target = InstallTarget::resolve(
            "gbax",
            HostOs::Windows,
            InstallScope::Global,
            &HostEnv::default(),
            Some(PathBuf::from(r"D:\tools")),
        )
        .unwrap();

        assert_eq!(target.dest_dir, PathBuf::from(r"D:\tools"));
        assert_eq!(target.bin_name, "gbax.exe");
    }

    #[test]
    fn install_copies_into_fresh_dir() {
        init();

        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("gbax");
        fs::write(&source, b"#!/bin/sh\n").unwrap();

        let target = InstallTarget {
            dest_dir: tmp.path().join("dest").join("bin"),
            bin_name: "gbax".to_string(),
        };
        target.install_bin(&source).unwrap();

        assert!(target.dest().is_file());
    }
}
