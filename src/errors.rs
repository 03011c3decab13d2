use std::{
    io,
    process::{ExitCode, ExitStatus, Termination},
};

use log::error;
use miette::{Diagnostic, Report};
use thiserror::Error;

/// Error kinds emitted by task execution.
#[derive(Error, Diagnostic, Debug)]
pub enum TaskError {
    /// An external command was run and it failed.
    ///
    /// The exit status of the command is carried so the failure of e.g. a
    /// linter is distinguishable from the tool being absent.
    ///
    /// - Code: `task::subprocess`
    /// - Exit: 70
    #[error("command `{command}` failed with {status}")]
    #[diagnostic(code(task::subprocess))]
    SubProcess {
        command: Box<str>,
        status: ExitStatus,
    },

    /// A generic I/O error.
    ///
    /// Covers spawn failures (tool not installed), directory creation and
    /// file copy/removal failures.
    ///
    /// - Code: `task::io`
    /// - Exit: 74
    #[error(transparent)]
    #[diagnostic(code(task::io))]
    Io(#[from] io::Error),

    /// The home directory could not be determined.
    ///
    /// Required to resolve the per-user install directory on Unix-like hosts.
    ///
    /// - Code: `task::no_home`
    /// - Exit: 76
    #[error("could not determine the home directory")]
    #[diagnostic(code(task::no_home))]
    NoHomeDir,

    /// A required environment variable is unset.
    ///
    /// `ProgramFiles` and `LOCALAPPDATA` are needed to resolve install
    /// directories on Windows.
    ///
    /// - Code: `task::missing_env`
    /// - Exit: 77
    #[error("environment variable `{name}` is not set")]
    #[diagnostic(code(task::missing_env))]
    MissingEnv { name: &'static str },
}

impl TaskError {
    fn exit_number(&self) -> u8 {
        use TaskError::*;
        let code: u8 = match self {
            SubProcess { .. } => 70,
            Io(_) => 74,
            NoHomeDir => 76,
            MissingEnv { .. } => 77,
        };

        // reserved codes
        debug_assert!(code != 64 && code != 16 && code != 1 && code != 2 && code != 0);

        code
    }

    /// The recommended exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        self.exit_number().into()
    }
}

impl Termination for TaskError {
    fn report(self) -> ExitCode {
        let code = self.exit_code();
        error!("Fatal error:\n{:?}", Report::new(self));
        code
    }
}
