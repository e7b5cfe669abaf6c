//! create-migration - generates an EF Core migration for a project
//!
//! Runs `dotnet ef migrations add <Name> --output-dir <Dir>` in the project
//! directory, then relays the tool's stdout, stderr and exit code.
//! Every value comes from layered configuration (see `config`).

mod cli;
mod config;
mod host;
mod logging;
mod redact;

use anyhow::Context;
use clap::Parser;
use cli::{exit_codes, Cli};
use config::{ConfigError, MigrationConfig};
use host::{relay, CommandError, CommandRunner};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    match execute(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "create-migration failed");
            eprintln!("Error: {:#}", e);
            categorize_error(&e)
        }
    }
}

/// Resolve configuration, run the tool, relay its output
fn execute(cli: &Cli) -> anyhow::Result<i32> {
    let config = MigrationConfig::resolve(cli)?;
    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let invocation = config.invocation(&base_dir);

    if cli.dry_run {
        println!("cwd: {}", invocation.working_directory.display());
        println!("{}", invocation);
        return Ok(exit_codes::SUCCESS);
    }

    let result = CommandRunner::new()
        .with_envs(config.env.clone())
        .run(&invocation)?;

    if !result.success() {
        tracing::debug!(exit_code = result.exit_code, "migration tool reported failure");
    }

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let code = relay(&result, &mut stdout.lock(), &mut stderr.lock())
        .context("Failed to write tool output")?;
    Ok(code)
}

/// Categorize an error into the appropriate exit code
fn categorize_error(e: &anyhow::Error) -> i32 {
    if let Some(err) = e.downcast_ref::<CommandError>() {
        err.exit_code()
    } else if e.downcast_ref::<ConfigError>().is_some() {
        exit_codes::CONFIG_ERROR
    } else {
        exit_codes::UNEXPECTED_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_categorize_command_errors() {
        let e = anyhow::Error::new(CommandError::BinaryNotFound("dotnet".into()));
        assert_eq!(categorize_error(&e), exit_codes::TOOL_NOT_FOUND);

        let e = anyhow::Error::new(CommandError::WorkingDirectoryMissing(PathBuf::from("/x")));
        assert_eq!(categorize_error(&e), exit_codes::LAUNCH_FAILURE);
    }

    #[test]
    fn test_categorize_config_error() {
        let e = anyhow::Error::new(ConfigError::NotFound(PathBuf::from("cfg.toml")));
        assert_eq!(categorize_error(&e), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_categorize_with_context() {
        let e = anyhow::Error::new(CommandError::LaunchFailed("denied".into()))
            .context("while generating migration");
        assert_eq!(categorize_error(&e), exit_codes::LAUNCH_FAILURE);
    }

    #[test]
    fn test_categorize_other() {
        let e = anyhow::anyhow!("disk full");
        assert_eq!(categorize_error(&e), exit_codes::UNEXPECTED_FAILURE);
    }

    fn write_config(dir: &std::path::Path, body: String) -> PathBuf {
        let path = dir.join("cfg.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn toml_path(path: &std::path::Path) -> toml::Value {
        toml::Value::String(path.display().to_string())
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("none.toml");
        let cli = Cli::try_parse_from(["create-migration", "--config", absent.to_str().unwrap()])
            .unwrap();

        let e = execute(&cli).unwrap_err();
        assert_eq!(categorize_error(&e), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_dry_run_does_not_launch() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            format!(
                "project_dir = {}\ntool = \"definitely-not-a-real-tool-xyz\"\n",
                toml_path(&dir.path().join("no-such-project"))
            ),
        );

        let cli = Cli::try_parse_from([
            "create-migration",
            "--dry-run",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(execute(&cli).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_missing_project_dir_reports_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            format!("project_dir = {}\n", toml_path(&dir.path().join("LP_app"))),
        );

        let cli = Cli::try_parse_from(["create-migration", "--config", config_path.to_str().unwrap()])
            .unwrap();
        let e = execute(&cli).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<CommandError>(),
            Some(CommandError::WorkingDirectoryMissing(_))
        ));
        assert_eq!(categorize_error(&e), exit_codes::LAUNCH_FAILURE);
    }
}
