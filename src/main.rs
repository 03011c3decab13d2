use std::{
    path::PathBuf,
    process::{ExitCode, Termination},
    sync::Arc,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use log::{debug, error, info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use tokio::{runtime::Runtime, task::JoinError};

use gbax_tasks::*;

#[derive(Debug, Parser)]
#[clap(version, about = "Build automation tasks for the gbax binary")]
struct Options {
    /// Task to run. Defaults to `run`.
    #[clap(subcommand)]
    task: Option<TaskCmd>,

    /// Utility log level
    ///
    /// Set to `debug` when submitting a bug report.
    #[clap(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    /// Override the project root directory.
    ///
    /// External tools run with this as their working directory. Defaults to
    /// the current directory.
    #[clap(help_heading = "OVERRIDES", long, global = true)]
    root: Option<PathBuf>,

    /// Override the name of the binary being built.
    #[clap(help_heading = "OVERRIDES", long, global = true)]
    bin_name: Option<String>,
}

#[derive(Debug, Subcommand)]
enum TaskCmd {
    /// Install the pinned tool versions (asdf install)
    Tools,
    /// Run pre-commit over all files
    Check,
    /// Compile the binary into the output directory (runs check first)
    Build,
    /// Remove the build output
    Clean,
    /// Copy the built binary into an install directory (runs build first)
    Install {
        /// Install system-wide for all users instead of for the current user
        #[clap(long)]
        global: bool,

        /// Override the install directory.
        ///
        /// The binary file name still follows the host OS convention.
        #[clap(help_heading = "OVERRIDES", long)]
        install_path: Option<PathBuf>,
    },
    /// Run the test suite (runs check first)
    Test,
    /// Build, then execute the binary (the default)
    Run,
    /// Run golangci-lint, codespell and govulncheck
    Lint,
}

enum MainExit {
    Success(Duration),
    Error(TaskError),
    JoinErr(JoinError),
}

impl Termination for MainExit {
    fn report(self) -> ExitCode {
        match self {
            Self::Success(spent) => {
                info!("Task completed in {spent:?}");
                ExitCode::SUCCESS
            }
            Self::Error(err) => err.report(),
            Self::JoinErr(err) => {
                error!("Fatal error:");
                eprintln!("{err:?}");
                ExitCode::from(17)
            }
        }
    }
}

fn main() -> MainExit {
    let start = Instant::now();

    let rt = Runtime::new().unwrap();
    let handle = rt.spawn(entry());
    let result = rt.block_on(handle);
    drop(rt);

    let done = start.elapsed();
    debug!("run time: {done:?}");

    result.map_or_else(MainExit::JoinErr, |res| {
        res.map_or_else(MainExit::Error, |()| MainExit::Success(done))
    })
}

async fn entry() -> Result<(), TaskError> {
    // Load options
    let opts = Options::parse();

    // Setup logging
    let mut log_config = ConfigBuilder::new();
    log_config.set_location_level(LevelFilter::Off);
    TermLogger::init(
        opts.log_level,
        log_config.build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    let mut project = Project::resolve(opts.root)?;
    if let Some(name) = opts.bin_name {
        project.name = name;
    }
    debug!("Project root: {}", project.root.display());

    let mut runner = Runner::new(project.clone(), Arc::new(ProcessExec));

    match opts.task.unwrap_or(TaskCmd::Run) {
        TaskCmd::Tools => runner.tools().await,
        TaskCmd::Check => runner.check().await,
        TaskCmd::Build => runner.build().await,
        TaskCmd::Clean => runner.clean().await,
        TaskCmd::Install {
            global,
            install_path,
        } => {
            let scope = if global {
                InstallScope::Global
            } else {
                InstallScope::User
            };
            let target = InstallTarget::resolve(
                &project.name,
                HostOs::current(),
                scope,
                &HostEnv::from_os(),
                install_path,
            )?;
            runner.install(&target).await
        }
        TaskCmd::Test => runner.test().await,
        TaskCmd::Run => runner.run().await,
        TaskCmd::Lint => runner.lint().await,
    }
}
