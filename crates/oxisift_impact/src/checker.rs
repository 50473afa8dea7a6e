use anyhow::{Context, Result};
use log::{debug, info};
use path_clean::clean;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{Config, SiftConfig, load_sift_config},
    filters::affected_test_paths,
    graph::{affected_closure, build_module_graph},
    manifest::parse_manifest_diff,
    packages::files_using_packages,
    policy::{merge_run_all_packages, should_run_all_tests},
    types::ImpactResult,
    vcs::changes_since,
};

/// Run the full affected-test analysis for a change set.
///
/// The run-all-tests policy is evaluated before any graph work: when a
/// high-impact package changed, the result is an empty affected list with
/// the flag set and nothing is parsed at all.
pub fn run_affected_check(mut cfg: Config) -> Result<ImpactResult> {
    info!("Starting affected-test analysis");

    cfg.initialize()?;
    let root = cfg.root()?.clone();

    let (changed_files, changed_packages) = gather_changes(&cfg, &root)?;
    debug!(
        "Change set: {} files, {} packages",
        changed_files.len(),
        changed_packages.len()
    );

    let file_config = match &cfg.config {
        Some(path) => load_sift_config(path),
        None => SiftConfig::default(),
    };
    let run_all_packages =
        merge_run_all_packages(&cfg.run_all_tests_packages, &file_config.run_all_tests_packages);

    if should_run_all_tests(&changed_packages, &run_all_packages) {
        let triggers: Vec<&str> = changed_packages
            .iter()
            .filter(|package| run_all_packages.contains(package))
            .map(String::as_str)
            .collect();
        info!("Running all tests because of changed packages: {}", triggers.join(", "));
        return Ok(ImpactResult { affected_tests: Vec::new(), should_run_all_tests: true });
    }

    if changed_files.is_empty() && changed_packages.is_empty() {
        info!("Nothing changed, no tests affected");
        return Ok(ImpactResult { affected_tests: Vec::new(), should_run_all_tests: false });
    }

    let graph = build_module_graph(&root, &cfg.tsconfig_paths)?;
    info!("Module graph has {} files", graph.len());

    let mut seeds: Vec<PathBuf> =
        changed_files.iter().map(|file| absolutize(file, &root)).collect();

    // Files that consume a changed package are seeded exactly like directly
    // changed files, so their dependents get marked too.
    if !changed_packages.is_empty() {
        for relative in files_using_packages(&changed_packages, &graph) {
            seeds.push(absolutize(Path::new(&relative), &root));
        }
    }

    let affected = affected_closure(&seeds, &graph);
    let affected_tests = affected_test_paths(&affected, &root);
    info!("{} affected test files", affected_tests.len());

    Ok(ImpactResult { affected_tests, should_run_all_tests: false })
}

/// Union the explicitly passed changes with git discovery (`--since`) and a
/// manifest diff file, deduplicated.
fn gather_changes(cfg: &Config, root: &Path) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let mut changed_files: Vec<PathBuf> = Vec::new();
    let mut seen_files: HashSet<PathBuf> = HashSet::new();
    let mut changed_packages: Vec<String> = Vec::new();
    let mut seen_packages: HashSet<String> = HashSet::new();

    let mut add_file = |file: PathBuf| {
        if seen_files.insert(file.clone()) {
            changed_files.push(file);
        }
    };

    for file in &cfg.changed_files {
        add_file(file.clone());
    }

    let mut add_package = |package: String| {
        if seen_packages.insert(package.clone()) {
            changed_packages.push(package);
        }
    };

    for package in &cfg.changed_packages {
        add_package(package.clone());
    }

    if let Some(base) = &cfg.since {
        let discovered = changes_since(root, base)?;
        for file in discovered.changed_files {
            add_file(file);
        }
        for package in discovered.changed_packages {
            add_package(package);
        }
    }

    if let Some(diff_path) = &cfg.manifest_diff {
        let diff = fs::read_to_string(diff_path)
            .with_context(|| format!("Failed to read manifest diff {}", diff_path.display()))?;
        for package in parse_manifest_diff(&diff) {
            add_package(package);
        }
    }

    Ok((changed_files, changed_packages))
}

/// Anchor a possibly relative path at the root and normalize it. Existing
/// files are canonicalized so seeds compare equal to graph keys; deleted
/// files keep their cleaned form and fall out at the existence filter.
fn absolutize(path: &Path, root: &Path) -> PathBuf {
    let absolute =
        if path.is_absolute() { path.to_path_buf() } else { clean(root.join(path)) };
    absolute.canonicalize().unwrap_or(absolute)
}
