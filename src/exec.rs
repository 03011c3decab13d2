use std::{ffi::OsStr, path::Path};

use log::{debug, error};
use tokio::process::Command;

use crate::TaskError;

/// Seam over external command execution.
///
/// Tasks only describe the command lines they need; running them goes through
/// this trait so task wiring can be exercised without the external tools
/// installed.
#[async_trait::async_trait]
pub trait Exec: Send + Sync {
    /// Run a command to completion in `cwd`, with stdio inherited from the
    /// parent. A non-zero exit status is an error.
    async fn run(&self, cwd: &Path, program: &OsStr, args: &[&str]) -> Result<(), TaskError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default)]
pub struct ProcessExec;

#[async_trait::async_trait]
impl Exec for ProcessExec {
    async fn run(&self, cwd: &Path, program: &OsStr, args: &[&str]) -> Result<(), TaskError> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);

        let command_string = format!("{} {}", program.to_string_lossy(), args.join(" "));
        debug!("Running `{command_string}` in {}", cwd.display());

        let mut child = cmd.spawn()?;
        debug!("Spawned command pid={:?}", child.id());

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            error!("Command `{command_string}` errored! {status:?}");
            Err(TaskError::SubProcess {
                command: command_string.into_boxed_str(),
                status,
            })
        }
    }
}
