use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::JS_TS_EXTENSIONS;

/// Collect every analyzable source file under `root`.
///
/// Test files are included: they are nodes in the module graph like any
/// other source. node_modules is always skipped; gitignored files are
/// skipped via the walker.
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>> {
    debug!("Collecting source files under {}", root.display());

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(|entry| entry.file_name().to_str() != Some("node_modules"))
        .build();

    let mut files: Vec<PathBuf> = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }

        if let Some(ext) = p.extension().and_then(|e| e.to_str())
            && JS_TS_EXTENSIONS.contains(&ext)
        {
            trace!("Found source file: {}", p.display());
            // Canonicalize so graph keys line up with resolver output
            files.push(p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
        }
    }

    debug!("Collected {} source files", files.len());
    Ok(files)
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
    fn test_collects_sources_and_tests() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = create_test_file(root, "src/a.ts", "// a");
        let a_test = create_test_file(root, "src/a.test.ts", "// test");
        create_test_file(root, "README.md", "# readme");

        let files = collect_sources(root).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&a));
        assert!(files.contains(&a_test));
    }

    #[test]
    fn test_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "// a");
        create_test_file(root, "node_modules/react/index.js", "// react");

        let files = collect_sources(root).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collects_all_extension_variants() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "a.ts", "");
        create_test_file(root, "b.tsx", "");
        create_test_file(root, "c.mjs", "");
        create_test_file(root, "d.cjs", "");

        let files = collect_sources(root).unwrap();
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_empty_project() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_sources(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
