use log::trace;
use std::{
    collections::HashSet,
    path::{Component, Path, PathBuf},
};

use oxisift_core::TEST_SUFFIXES;

/// True for files matching the test naming convention.
pub fn is_test_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    TEST_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Reduce an affected set to runnable test paths: test-named files that
/// still exist on disk, relativized to `root`, with anything outside the
/// project boundary dropped. Sorted for stable output.
///
/// The order is load-bearing: existence is checked on the absolute path,
/// and the boundary check operates on the relativized form.
pub fn affected_test_paths(affected: &HashSet<PathBuf>, root: &Path) -> Vec<String> {
    let tests = affected.iter().filter(|p| is_test_file(p)).cloned().collect::<Vec<_>>();
    relativize_existing(tests.iter(), root)
}

/// Existence filter, relativization, and project-boundary filter, applied in
/// that order; result is sorted.
pub(crate) fn relativize_existing<'a>(
    paths: impl Iterator<Item = &'a PathBuf>,
    root: &Path,
) -> Vec<String> {
    let mut result: Vec<String> = paths
        .filter(|p| {
            let exists = p.is_file();
            if !exists {
                trace!("Dropping deleted file: {}", p.display());
            }
            exists
        })
        .filter_map(|p| relative_to(p, root))
        .map(|rel| rel.to_string_lossy().to_string())
        .filter(|rel| {
            let inside = !rel.starts_with("..");
            if !inside {
                trace!("Dropping file outside project root: {}", rel);
            }
            inside
        })
        .collect();
    result.sort();
    result
}

/// Relative path from `base` to `target`, climbing with `..` components
/// where needed. `None` when the two share no filesystem root.
fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components().peekable();
    let mut base_components = base.components().peekable();

    // Strip the common prefix
    while let (Some(t), Some(b)) = (target_components.peek(), base_components.peek()) {
        if t != b {
            break;
        }
        target_components.next();
        base_components.next();
    }

    let mut result = PathBuf::new();
    for component in base_components {
        match component {
            // Differing roots: no relative form exists
            Component::RootDir | Component::Prefix(_) => return None,
            Component::CurDir => {}
            _ => result.push(".."),
        }
    }
    for component in target_components {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, "// test").expect("Failed to write test file");
        file_path.canonicalize().unwrap_or(file_path)
    }

    #[test]
    fn test_is_test_file_suffixes() {
        assert!(is_test_file(Path::new("/p/src/foo.test.ts")));
        assert!(is_test_file(Path::new("/p/src/foo.test.tsx")));
        assert!(is_test_file(Path::new("/p/src/foo.spec.ts")));
        assert!(is_test_file(Path::new("/p/src/foo.spec.tsx")));
        assert!(!is_test_file(Path::new("/p/src/foo.ts")));
        assert!(!is_test_file(Path::new("/p/src/test.ts")));
        assert!(!is_test_file(Path::new("/p/src/foo.test.js")));
    }

    #[test]
    fn test_non_tests_are_filtered_out() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let source = create_test_file(&root, "src/foo.ts");
        let test = create_test_file(&root, "src/foo.test.ts");

        let affected: HashSet<PathBuf> = [source, test].into_iter().collect();
        let tests = affected_test_paths(&affected, &root);
        assert_eq!(tests, vec!["src/foo.test.ts"]);
    }

    #[test]
    fn test_deleted_tests_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let existing = create_test_file(&root, "src/foo.test.ts");
        let deleted = root.join("src/deleted.test.ts");

        let affected: HashSet<PathBuf> = [existing, deleted].into_iter().collect();
        let tests = affected_test_paths(&affected, &root);
        assert_eq!(tests, vec!["src/foo.test.ts"]);
    }

    #[test]
    fn test_files_outside_root_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().canonicalize().unwrap();
        let root = base.join("packages").join("app");
        fs::create_dir_all(&root).unwrap();
        let inside = create_test_file(&root, "src/foo.test.ts");
        // Sibling package in the same workspace
        let outside = create_test_file(&base, "packages/other/src/bar.test.ts");

        let affected: HashSet<PathBuf> = [inside, outside].into_iter().collect();
        let tests = affected_test_paths(&affected, &root);
        assert_eq!(tests, vec!["src/foo.test.ts"]);
    }

    #[test]
    fn test_output_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let b = create_test_file(&root, "src/b.test.ts");
        let a = create_test_file(&root, "src/a.test.ts");
        let c = create_test_file(&root, "src/c.spec.ts");

        let affected: HashSet<PathBuf> = [b, a, c].into_iter().collect();
        let tests = affected_test_paths(&affected, &root);
        assert_eq!(tests, vec!["src/a.test.ts", "src/b.test.ts", "src/c.spec.ts"]);
    }

    #[test]
    fn test_relative_to_climbs_out() {
        let rel = relative_to(Path::new("/w/other/x.ts"), Path::new("/w/app")).unwrap();
        assert_eq!(rel, PathBuf::from("../other/x.ts"));
    }

    #[test]
    fn test_relative_to_inside() {
        let rel = relative_to(Path::new("/w/app/src/x.ts"), Path::new("/w/app")).unwrap();
        assert_eq!(rel, PathBuf::from("src/x.ts"));
    }
}
