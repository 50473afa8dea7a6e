use dashmap::DashMap;
use log::trace;
use path_clean::clean;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::constants::{INDEX_FILES, RESOLVE_EXTENSIONS};

/// Resolve an import specifier to a project-local file.
///
/// Relative specifiers and tsconfig path aliases can resolve; bare package
/// specifiers never do (their targets live in node_modules, outside the
/// project graph) and yield `None`. Unresolvable specifiers also yield
/// `None` rather than an error.
pub fn resolve(
    root: &Path,
    tsconfig_paths: &HashMap<String, Vec<String>>,
    from_file: &Path,
    request: &str,
    cache: &DashMap<(PathBuf, String), Option<PathBuf>>,
) -> Option<PathBuf> {
    let key = (from_file.to_path_buf(), request.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
        return v.clone();
    }
    trace!("Resolving: '{}' from {}", request, from_file.display());

    let resolved =
        if request.starts_with("./") || request.starts_with("../") || request.starts_with('/') {
            let base = from_file.parent().unwrap_or(root);
            resolve_file(&clean(base.join(request)))
        } else {
            resolve_alias(tsconfig_paths, request)
            // No alias match: a bare specifier names an external package and
            // contributes no edge.
        };

    match &resolved {
        Some(target) => trace!("Resolved '{}' to {}", request, target.display()),
        None => trace!("No project-local target for '{}'", request),
    }
    cache.insert(key, resolved.clone());
    resolved
}

fn resolve_alias(tsconfig_paths: &HashMap<String, Vec<String>>, request: &str) -> Option<PathBuf> {
    for (alias, targets) in tsconfig_paths {
        if !request.starts_with(alias.as_str()) {
            continue;
        }
        trace!("Matched tsconfig alias '{}' for '{}'", alias, request);
        let remainder = request.trim_start_matches(alias.as_str()).trim_start_matches('/');
        for target in targets {
            let candidate = if remainder.is_empty() {
                PathBuf::from(target)
            } else {
                PathBuf::from(target).join(remainder)
            };
            if let Some(resolved) = resolve_file(&candidate) {
                return Some(resolved);
            }
        }
    }
    None
}

fn resolve_file(p: &Path) -> Option<PathBuf> {
    // Exact path first
    if p.is_file() {
        return Some(p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
    }

    // Extensionless import: try each known extension
    for ext in RESOLVE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    // Directory import: try index files
    for index_file in INDEX_FILES {
        let candidate = p.join(index_file);
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    None
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
        file_path.canonicalize().unwrap_or(file_path)
    }

    #[test]
    fn test_relative_import_with_extension_inference() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");
        let target = create_test_file(root, "src/b.ts", "");

        let cache = DashMap::new();
        let resolved = resolve(root, &HashMap::new(), &from, "./b", &cache);
        assert_eq!(resolved, Some(target));
    }

    #[test]
    fn test_parent_relative_import() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/nested/a.ts", "");
        let target = create_test_file(root, "src/b.ts", "");

        let cache = DashMap::new();
        let resolved = resolve(root, &HashMap::new(), &from, "../b", &cache);
        assert_eq!(resolved, Some(target));
    }

    #[test]
    fn test_directory_import_resolves_index() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");
        let target = create_test_file(root, "src/utils/index.ts", "");

        let cache = DashMap::new();
        let resolved = resolve(root, &HashMap::new(), &from, "./utils", &cache);
        assert_eq!(resolved, Some(target));
    }

    #[test]
    fn test_bare_package_specifier_has_no_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");

        let cache = DashMap::new();
        assert_eq!(resolve(root, &HashMap::new(), &from, "react", &cache), None);
        assert_eq!(resolve(root, &HashMap::new(), &from, "@types/node", &cache), None);
    }

    #[test]
    fn test_unresolvable_relative_import() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");

        let cache = DashMap::new();
        assert_eq!(resolve(root, &HashMap::new(), &from, "./missing", &cache), None);
    }

    #[test]
    fn test_tsconfig_alias_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");
        let target = create_test_file(root, "src/components/Button.tsx", "");

        let mut aliases = HashMap::new();
        aliases.insert(
            "@components".to_string(),
            vec![root.join("src/components").to_string_lossy().to_string()],
        );

        let cache = DashMap::new();
        let resolved = resolve(root, &aliases, &from, "@components/Button", &cache);
        assert_eq!(resolved, Some(target));
    }

    #[test]
    fn test_resolution_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let from = create_test_file(root, "src/a.ts", "");
        create_test_file(root, "src/b.ts", "");

        let cache = DashMap::new();
        resolve(root, &HashMap::new(), &from, "./b", &cache);
        resolve(root, &HashMap::new(), &from, "./b", &cache);
        assert_eq!(cache.len(), 1);
    }
}
