use std::{collections::BTreeSet, ffi::OsStr, fs, io, sync::Arc};

use log::{debug, info};
use strum_macros::Display;

use crate::{Exec, InstallTarget, Project, TaskError};

/// Task identifiers, used to track which tasks already ran in an invocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    Tools,
    Check,
    Build,
    Clean,
    Install,
    Test,
    Run,
    Lint,
}

/// Executes tasks against a project, running each prerequisite at most once.
///
/// A `Runner` is per-invocation state: a fresh one starts with no tasks
/// completed. Prerequisites are ordinary method calls, so a task invoked both
/// directly and as a prerequisite still runs exactly once.
pub struct Runner {
    project: Project,
    exec: Arc<dyn Exec>,
    done: BTreeSet<Task>,
}

impl Runner {
    pub fn new(project: Project, exec: Arc<dyn Exec>) -> Self {
        Self {
            project,
            exec,
            done: BTreeSet::new(),
        }
    }

    /// Record entry into a task. Returns false if it already ran.
    fn enter(&mut self, task: Task) -> bool {
        if self.done.insert(task) {
            info!("Running task: {task}");
            true
        } else {
            debug!("Task already ran, skipping: {task}");
            false
        }
    }

    async fn sh(&self, program: &str, args: &[&str]) -> Result<(), TaskError> {
        self.exec
            .run(&self.project.root, OsStr::new(program), args)
            .await
    }

    /// Install the pinned tool versions via asdf.
    pub async fn tools(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Tools) {
            return Ok(());
        }

        self.sh("asdf", &["install"]).await
    }

    /// Run all pre-commit hooks over the whole tree.
    pub async fn check(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Check) {
            return Ok(());
        }

        self.sh("pre-commit", &["run", "--all-files"]).await
    }

    /// Compile the project binary into the output directory.
    ///
    /// Prerequisite: [`check`](Self::check).
    pub async fn build(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Build) {
            return Ok(());
        }

        self.check().await?;

        fs::create_dir_all(self.project.root.join(&self.project.output_dir))?;

        let out = self.project.output_path();
        self.sh("go", &["build", "-o", &out.display().to_string(), "."])
            .await
    }

    /// Remove the build output. A missing output file is not an error.
    pub async fn clean(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Clean) {
            return Ok(());
        }

        let out = self.project.output_path();
        debug!("Removing {}", out.display());
        match fs::remove_file(&out) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    /// Copy the built binary to the resolved install destination.
    ///
    /// Prerequisite: [`build`](Self::build).
    pub async fn install(&mut self, target: &InstallTarget) -> Result<(), TaskError> {
        if !self.enter(Task::Install) {
            return Ok(());
        }

        self.build().await?;

        target.install_bin(&self.project.output_path())
    }

    /// Run the project test suite.
    ///
    /// Prerequisite: [`check`](Self::check).
    pub async fn test(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Test) {
            return Ok(());
        }

        self.check().await?;

        self.sh("go", &["test", "-v", "./..."]).await
    }

    /// Build, then execute the freshly built binary.
    ///
    /// Prerequisite: [`build`](Self::build). This is the default task.
    pub async fn run(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Run) {
            return Ok(());
        }

        self.build().await?;

        let bin = self.project.output_path();
        self.exec
            .run(&self.project.root, bin.as_os_str(), &[])
            .await
    }

    /// Run the linters: golangci-lint, codespell, then govulncheck.
    ///
    /// Sequential; the first failure aborts the rest.
    pub async fn lint(&mut self) -> Result<(), TaskError> {
        if !self.enter(Task::Lint) {
            return Ok(());
        }

        self.sh("golangci-lint", &["run", "./..."]).await?;
        self.sh("codespell", &[]).await?;
        self.sh(
            "go",
            &["tool", "golang.org/x/vuln/cmd/govulncheck", "./..."],
        )
        .await
    }
}
