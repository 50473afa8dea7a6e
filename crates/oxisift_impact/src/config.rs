use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info, warn};
use serde::Deserialize;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "affected")]
#[command(about = "Select the test files affected by a set of changes")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// A changed source file, relative to the root (repeatable)
    #[arg(long = "changed-file")]
    pub changed_files: Vec<PathBuf>,

    /// A changed package name (repeatable)
    #[arg(long = "changed-package")]
    pub changed_packages: Vec<String>,

    /// Discover changed files and manifest changes with git, diffing this
    /// base revision against HEAD
    #[arg(long)]
    pub since: Option<String>,

    /// File holding a unified diff of a package manifest, mined for changed
    /// dependency names
    #[arg(long)]
    pub manifest_diff: Option<PathBuf>,

    /// Comma-separated package names whose change forces a full test run
    #[arg(long, default_value = "")]
    pub run_all_tests_packages: String,

    /// JSON config file with a "runAllTestsPackages" list
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(skip)]
    pub tsconfig_paths: HashMap<String, Vec<String>>,
}

impl Config {
    /// Initialize the config by resolving the root directory and loading
    /// tsconfig paths
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for git root");
            oxisift_core::find_git_root(&env::current_dir()?)?
        };
        info!("Using root directory: {}", root.display());

        debug!("Reading tsconfig paths");
        self.tsconfig_paths = oxisift_core::read_tsconfig_paths(&root);
        debug!("Found {} tsconfig path aliases", self.tsconfig_paths.len());

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

/// On-disk configuration, a free-form JSON object with recognized fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiftConfig {
    #[serde(default)]
    pub run_all_tests_packages: Vec<String>,
}

/// Load the JSON config file. A missing file is a normal condition and an
/// unparsable one is downgraded to a warning; both yield defaults.
pub fn load_sift_config(path: &Path) -> SiftConfig {
    if !path.is_file() {
        debug!("No config file at {}", path.display());
        return SiftConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config file {}: {}", path.display(), e);
                SiftConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            SiftConfig::default()
        }
    }
}
