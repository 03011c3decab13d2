use std::{env, io, path::PathBuf};

pub mod errors;
pub use errors::*;

pub mod exec;
pub use exec::*;

pub mod install;
pub use install::*;

pub mod tasks;
pub use tasks::*;

/// Default name of the binary the tasks build and install.
pub const DEFAULT_BIN_NAME: &str = "gbax";

/// Default build output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "bin";

/// The project the tasks operate on.
///
/// External tools are invoked with `root` as their working directory; the
/// build output lands at `root/output_dir/name`.
#[derive(Clone, Debug)]
pub struct Project {
    pub root: PathBuf,
    pub name: String,
    pub output_dir: PathBuf,
}

impl Project {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            name: DEFAULT_BIN_NAME.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
        }
    }

    /// Create a project from an optional root override.
    ///
    /// A relative override is absolutized against the current directory, so
    /// `output_path` stays valid for child processes whose working directory
    /// is the root itself.
    pub fn resolve(root: Option<PathBuf>) -> io::Result<Self> {
        let cwd = env::current_dir()?;
        let root = match root {
            Some(p) => cwd.join(p),
            None => cwd,
        };
        Ok(Self::new(root))
    }

    /// Path of the build output binary.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir).join(&self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_path_is_under_the_root() {
        let project = Project::new(PathBuf::from("/work/gbax"));

        assert_eq!(
            project.output_path(),
            PathBuf::from("/work/gbax/bin/gbax")
        );
    }

    #[test]
    fn relative_root_is_absolutized() {
        let cwd = env::current_dir().unwrap();

        let project = Project::resolve(Some(PathBuf::from("subdir"))).unwrap();

        assert_eq!(project.root, cwd.join("subdir"));
        assert_eq!(project.output_path(), cwd.join("subdir/bin/gbax"));
    }

    #[test]
    fn absolute_root_is_kept_as_is() {
        let tmp = tempfile::tempdir().unwrap();

        let project = Project::resolve(Some(tmp.path().to_path_buf())).unwrap();

        assert_eq!(project.root, tmp.path());
    }

    #[test]
    fn missing_root_uses_the_current_dir() {
        let cwd = env::current_dir().unwrap();

        let project = Project::resolve(None).unwrap();

        assert_eq!(project.root, cwd);
    }
}
