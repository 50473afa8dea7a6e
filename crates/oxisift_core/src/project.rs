use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use log::{debug, trace, warn};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Walk upward from `start` until a directory containing `.git` is found.
///
/// Failing to find one is fatal: without a root there is no project to
/// analyze.
pub fn find_git_root(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root from {}", start.display());
    let mut current_dir = start.to_path_buf();

    loop {
        if current_dir.join(".git").exists() {
            debug!("Found git root at: {}", current_dir.display());
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Walk upward from `start` looking for a package manifest that declares a
/// workspace (`workspaces` or `pnpm.workspace`). Returns `None` when no such
/// manifest exists; manifests that fail to parse are skipped.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current_dir = start.to_path_buf();

    loop {
        let manifest = current_dir.join("package.json");
        if manifest.is_file()
            && let Ok(content) = fs::read_to_string(&manifest)
            && let Ok(json) = serde_json::from_str::<serde_json::Value>(&content)
            && (json.get("workspaces").is_some()
                || json.get("pnpm").and_then(|p| p.get("workspace")).is_some())
        {
            debug!("Found workspace root at: {}", current_dir.display());
            return Some(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Collect `compilerOptions.paths` aliases from every tsconfig.json under
/// `root`, with `/*` suffixes stripped and targets made absolute against each
/// tsconfig's baseUrl.
pub fn read_tsconfig_paths(root: &Path) -> HashMap<String, Vec<String>> {
    debug!("Reading tsconfig paths from root: {}", root.display());
    let mut paths = HashMap::new();

    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) != Some("tsconfig.json") {
            continue;
        }
        trace!("Found tsconfig at: {}", path.display());
        match alias_map_from(path, root) {
            Some(aliases) => paths.extend(aliases),
            None => warn!("Skipping unparsable tsconfig: {}", path.display()),
        }
    }

    debug!("Loaded {} tsconfig path aliases", paths.len());
    paths
}

fn alias_map_from(tsconfig_path: &Path, root: &Path) -> Option<HashMap<String, Vec<String>>> {
    let content = fs::read_to_string(tsconfig_path).ok()?;

    // tsconfig.json allows // comments; strip them before parsing
    let content_no_comments: String = content
        .lines()
        .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
        .collect::<Vec<_>>()
        .join("\n");

    let json = serde_json::from_str::<serde_json::Value>(&content_no_comments).ok()?;
    let mut aliases = HashMap::new();

    let Some(paths_obj) =
        json.get("compilerOptions").and_then(|c| c.get("paths")).and_then(|p| p.as_object())
    else {
        return Some(aliases);
    };

    let compiler_options = &json["compilerOptions"];

    let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
    let tsconfig_dir = tsconfig_path.parent().unwrap_or(root);
    let base_path = tsconfig_dir.join(base_url);

    for (alias, targets) in paths_obj {
        let Some(target_arr) = targets.as_array() else { continue };
        let resolved_targets: Vec<String> = target_arr
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| base_path.join(t.trim_end_matches("/*")).to_string_lossy().to_string())
            .collect();

        if !resolved_targets.is_empty() {
            let alias_key = alias.trim_end_matches("/*").to_string();
            trace!("Found tsconfig path alias: '{}' -> {:?}", alias_key, resolved_targets);
            aliases.insert(alias_key, resolved_targets);
        }
    }

    Some(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_find_git_root_from_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let subdir = root.join("src").join("components");
        fs::create_dir_all(&subdir).unwrap();

        let git_root = find_git_root(&subdir).unwrap();
        assert_eq!(git_root, root);
    }

    #[test]
    fn test_find_git_root_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested").join("deep");
        fs::create_dir_all(&subdir).unwrap();

        assert!(find_git_root(&subdir).is_err());
    }

    #[test]
    fn test_find_workspace_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", r#"{ "workspaces": ["packages/*"] }"#);
        let nested = root.join("packages").join("app");
        fs::create_dir_all(&nested).unwrap();
        create_test_file(root, "packages/app/package.json", r#"{ "name": "app" }"#);

        assert_eq!(find_workspace_root(&nested), Some(root.to_path_buf()));
    }

    #[test]
    fn test_find_workspace_root_pnpm() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", r#"{ "pnpm": { "workspace": {} } }"#);

        assert_eq!(find_workspace_root(root), Some(root.to_path_buf()));
    }

    #[test]
    fn test_find_workspace_root_none() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", r#"{ "name": "plain" }"#);

        assert_eq!(find_workspace_root(root), None);
    }

    #[test]
    fn test_read_tsconfig_paths_simple() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let tsconfig_content = r#"
{
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@components/*": ["src/components/*"],
      "@utils": ["src/utils"]
    }
  }
}
"#;
        create_test_file(root, "tsconfig.json", tsconfig_content);

        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains_key("@components"));
        assert!(paths.contains_key("@utils"));
        assert!(paths.get("@components").unwrap()[0].contains("src/components"));
    }

    #[test]
    fn test_read_tsconfig_paths_with_comments() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let tsconfig_content = r#"
{
  // This is a comment
  "compilerOptions": {
    "baseUrl": ".", // Another comment
    "paths": {
      "@components/*": ["src/components/*"]
    }
  }
}
"#;
        create_test_file(root, "tsconfig.json", tsconfig_content);

        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains_key("@components"));
    }

    #[test]
    fn test_read_tsconfig_paths_multiple_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(
            root,
            "tsconfig.json",
            r#"{ "compilerOptions": { "paths": { "@root/*": ["src/*"] } } }"#,
        );
        create_test_file(
            root,
            "apps/web/tsconfig.json",
            r#"{ "compilerOptions": { "paths": { "@app/*": ["app/*"] } } }"#,
        );

        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains_key("@root"));
        assert!(paths.contains_key("@app"));
    }

    #[test]
    fn test_read_tsconfig_paths_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_tsconfig_paths(temp_dir.path()).is_empty());
    }
}
