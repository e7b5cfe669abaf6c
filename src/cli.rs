//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Exit codes the wrapper uses for its own failures.
///
/// When the tool runs, its exit code is passed through instead.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    /// Same code clap uses for usage errors
    pub const CONFIG_ERROR: i32 = 2;
    pub const LAUNCH_FAILURE: i32 = 126;
    pub const TOOL_NOT_FOUND: i32 = 127;
}

/// Generate an EF Core migration and relay the tool's output and exit code
#[derive(Debug, Parser)]
#[command(name = "create-migration", version, about)]
pub struct Cli {
    /// Migration name [default: InitialCreate]
    #[arg(env = "CREATE_MIGRATION_NAME")]
    pub name: Option<String>,

    /// Project directory the tool runs in [default: .]
    #[arg(short = 'p', long, env = "CREATE_MIGRATION_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Tool to invoke [default: dotnet]
    #[arg(long, env = "CREATE_MIGRATION_TOOL")]
    pub tool: Option<String>,

    /// Directory for generated migration files, relative to the project [default: Data/Migrations]
    #[arg(short = 'o', long, env = "CREATE_MIGRATION_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// DbContext to use when the project has more than one
    #[arg(long, env = "CREATE_MIGRATION_CONTEXT")]
    pub context: Option<String>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the command that would run, without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_output: bool,

    /// Extra arguments appended to the tool's command line
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "create-migration",
            "AddQuizzes",
            "--project-dir",
            "LP_app",
            "--output-dir",
            "Migrations",
            "--context",
            "LearningPlatformContext",
            "--dry-run",
            "-v",
            "--",
            "--no-build",
        ])
        .unwrap();

        assert_eq!(cli.name.as_deref(), Some("AddQuizzes"));
        assert_eq!(cli.project_dir, Some(PathBuf::from("LP_app")));
        assert_eq!(cli.output_dir.as_deref(), Some("Migrations"));
        assert_eq!(cli.context.as_deref(), Some("LearningPlatformContext"));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert!(!cli.json_output);
        assert_eq!(cli.extra_args, vec!["--no-build"]);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["create-migration", "--bogus"]).is_err());
    }
}
