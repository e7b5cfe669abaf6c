//! Migration configuration
//!
//! Values are layered: built-in defaults, then a TOML file, then
//! environment variables and command-line flags (clap merges those two).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::host::Invocation;

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "create-migration.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything needed to build the tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory the tool runs in; relative paths resolve against the caller's cwd
    pub project_dir: PathBuf,
    /// Executable to launch
    pub tool: String,
    /// Subcommand tokens placed before the migration name
    pub tool_args: Vec<String>,
    pub migration_name: String,
    /// Passed as `--output-dir`
    pub output_dir: String,
    /// Passed as `--context` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Appended after everything else
    pub extra_args: Vec<String>,
    /// Extra environment for the child
    pub env: BTreeMap<String, String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            tool: "dotnet".to_string(),
            tool_args: vec!["ef".to_string(), "migrations".to_string(), "add".to_string()],
            migration_name: "InitialCreate".to_string(),
            output_dir: "Data/Migrations".to_string(),
            context: None,
            extra_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

impl MigrationConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file that must exist
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Default file locations, most specific first
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("create-migration").join("config.toml"));
        }
        paths
    }

    /// Load the first existing file among `candidates`, or the defaults if none exists
    pub fn load_first(candidates: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in candidates {
            if path.is_file() {
                return Ok((Self::load_file(path)?, Some(path.clone())));
            }
        }
        Ok((Self::default(), None))
    }

    /// Resolve the effective configuration for a command line
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let (mut config, source) = match &cli.config {
            Some(path) => (Self::load_file(path)?, Some(path.clone())),
            None => Self::load_first(&Self::candidate_paths())?,
        };

        match &source {
            Some(path) => tracing::debug!(path = %path.display(), "loaded config file"),
            None => tracing::debug!("no config file found, using defaults"),
        }

        config.apply_cli(cli);
        Ok(config)
    }

    /// Overlay values given on the command line or through the environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(name) = &cli.name {
            self.migration_name = name.clone();
        }
        if let Some(dir) = &cli.project_dir {
            self.project_dir = dir.clone();
        }
        if let Some(tool) = &cli.tool {
            self.tool = tool.clone();
        }
        if let Some(output_dir) = &cli.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(context) = &cli.context {
            self.context = Some(context.clone());
        }
        self.extra_args.extend(cli.extra_args.iter().cloned());
    }

    /// Build the invocation; `base_dir` anchors a relative `project_dir`
    pub fn invocation(&self, base_dir: &Path) -> Invocation {
        let working_directory = if self.project_dir.is_absolute() {
            self.project_dir.clone()
        } else {
            base_dir.join(&self.project_dir)
        };

        let mut invocation = Invocation::new(&self.tool, working_directory)
            .args(self.tool_args.iter().cloned())
            .arg(&self.migration_name)
            .args(["--output-dir", self.output_dir.as_str()]);

        if let Some(context) = &self.context {
            invocation = invocation.args(["--context", context.as_str()]);
        }

        invocation.args(self.extra_args.iter().cloned())
    }
}
