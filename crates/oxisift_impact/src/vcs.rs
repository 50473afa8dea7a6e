use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    process::Command,
};

use oxisift_core::find_workspace_root;

use crate::manifest::parse_manifest_diff;

/// Changes discovered between a base revision and HEAD.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Changed TypeScript sources, absolute paths under the project root
    pub changed_files: Vec<PathBuf>,
    /// Dependency names changed in package manifests
    pub changed_packages: Vec<String>,
}

/// Diff `base..HEAD` with system git and split the result into changed
/// source files and changed dependency names.
///
/// Manifest diffs that cannot be fetched are warned about and skipped; a
/// failing name-only diff is fatal since nothing can be analyzed without it.
/// When no per-package manifest changed, the workspace root manifest (if the
/// project sits inside one) is checked as a fallback.
pub fn changes_since(root: &Path, base: &str) -> Result<ChangeSet> {
    let range = format!("{}..HEAD", base);
    let name_output = git_output(root, &["diff", "--relative", "--name-only", &range])?;

    let changed: Vec<&str> =
        name_output.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    debug!("{} files changed in {}", changed.len(), range);

    let changed_files: Vec<PathBuf> = changed
        .iter()
        .filter(|name| name.ends_with(".ts") || name.ends_with(".tsx"))
        .map(|name| root.join(name))
        .collect();

    let manifests: Vec<&str> =
        changed.iter().filter(|name| name.ends_with("package.json")).copied().collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut changed_packages: Vec<String> = Vec::new();
    for manifest in &manifests {
        match git_output(root, &["diff", "--relative", &range, "--", manifest]) {
            Ok(diff) => {
                for name in parse_manifest_diff(&diff) {
                    if seen.insert(name.clone()) {
                        changed_packages.push(name);
                    }
                }
            }
            Err(e) => warn!("Failed to analyze {}: {}", manifest, e),
        }
    }

    // A dependency bump may live in the workspace root manifest rather than
    // the project's own.
    if changed_packages.is_empty()
        && let Some(workspace_root) = find_workspace_root(root)
        && workspace_root != root
    {
        debug!("Checking workspace root manifest at {}", workspace_root.display());
        match git_output(&workspace_root, &["diff", "--relative", &range, "--", "package.json"]) {
            Ok(diff) if !diff.trim().is_empty() => {
                for name in parse_manifest_diff(&diff) {
                    if seen.insert(name.clone()) {
                        changed_packages.push(name);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to check workspace root manifest: {}", e),
        }
    }

    info!(
        "Discovered {} changed sources, {} changed packages since {}",
        changed_files.len(),
        changed_packages.len(),
        base
    );
    Ok(ChangeSet { changed_files, changed_packages })
}

fn git_output(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
