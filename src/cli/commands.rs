//! Command execution

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, info, instrument};

use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::expand_path;

/// Run the command line and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(exitcode::OK);
    }

    let settings = load_settings(cli)?;

    if cli.show_config {
        output::info(&settings.to_toml()?);
        return Ok(exitcode::OK);
    }

    let (file1, file2) = match (&cli.file1, &cli.file2) {
        (Some(a), Some(b)) => (expand_path(a), expand_path(b)),
        _ => return Err(CliError::Usage("file1 and file2 are required".to_string())),
    };

    diff(settings, &file1, &file2)
}

/// Settings from all config layers with command-line flags on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let config_file: Option<PathBuf> = cli.config.as_deref().map(expand_path);
    let settings = Settings::load(config_file.as_deref())?.merge_with(&cli.overrides());
    settings.validate()?;
    debug!("load_settings: {settings:?}");
    Ok(settings)
}

#[instrument(skip(settings))]
fn diff(settings: Settings, file1: &Path, file2: &Path) -> CliResult<i32> {
    let container = ServiceContainer::open(settings, file1, file2)?;
    let report = container.diff_service().run()?;

    let stdout = io::stdout();
    output::report(&mut stdout.lock(), &report, container.settings.report_missing)
        .map_err(|e| InfraError::io("write diff report", e))?;

    info!(
        "compared {} datasets: {} differ, {} missing, {} failed",
        report.compared(),
        report.diffs().count(),
        report.missing().count(),
        report.failures().count()
    );

    if container.settings.fail_on_diff && (report.has_differences() || report.has_failures()) {
        Ok(exitcode::DIFFERENT)
    } else {
        Ok(exitcode::OK)
    }
}
