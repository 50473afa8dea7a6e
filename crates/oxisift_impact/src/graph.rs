use anyhow::{Result, anyhow};
use dashmap::DashMap;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use oxisift_core::{collect_sources, imports_for, resolve};

use crate::types::ResolvedImport;

/// Import graph of a project: a forward view (file to its imports) and a
/// reverse view (file to the set of files importing it).
///
/// Only resolved project-local imports produce reverse edges; a bare package
/// specifier is kept in the forward view as a raw request with no target.
/// The graph is built once per analysis and never mutated afterwards.
#[derive(Debug)]
pub struct ModuleGraph {
    root: PathBuf,
    files: HashMap<PathBuf, Vec<ResolvedImport>>,
    dependents: HashMap<PathBuf, HashSet<PathBuf>>,
}

impl ModuleGraph {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Forward view: every file with its imports.
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &[ResolvedImport])> {
        self.files.iter().map(|(path, imports)| (path, imports.as_slice()))
    }

    /// Reverse view: who imports `path`.
    pub fn dependents_of(&self, path: &Path) -> Option<&HashSet<PathBuf>> {
        self.dependents.get(path)
    }
}

/// Parse and resolve every source file under `root` into a [`ModuleGraph`].
///
/// Parsing runs in parallel with shared caches; files that fail to parse are
/// logged and contribute no edges. An empty project is a hard error: it
/// means the root is wrong, not that nothing is affected.
pub fn build_module_graph(
    root: &Path,
    tsconfig_paths: &HashMap<String, Vec<String>>,
) -> Result<ModuleGraph> {
    // Canonical root so graph keys and later relativization agree
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let root = root.as_path();
    let sources = collect_sources(root)?;
    if sources.is_empty() {
        return Err(anyhow!("No source files found under {}", root.display()));
    }
    info!("Building module graph over {} source files", sources.len());

    let import_cache: Arc<DashMap<PathBuf, Vec<String>>> = Arc::new(DashMap::new());
    let resolve_cache: Arc<DashMap<(PathBuf, String), Option<PathBuf>>> = Arc::new(DashMap::new());

    let parsed: Vec<(PathBuf, Vec<ResolvedImport>)> = sources
        .par_iter()
        .map(|file| {
            let import_cache = Arc::clone(&import_cache);
            let resolve_cache = Arc::clone(&resolve_cache);

            let specs = match imports_for(file, &import_cache) {
                Ok(specs) => specs,
                Err(e) => {
                    warn!("Error parsing imports for {}: {}", file.display(), e);
                    Vec::new()
                }
            };

            let imports = specs
                .into_iter()
                .map(|request| ResolvedImport {
                    target: resolve(root, tsconfig_paths, file, &request, &resolve_cache),
                    request,
                })
                .collect();

            (file.clone(), imports)
        })
        .collect();

    let mut files: HashMap<PathBuf, Vec<ResolvedImport>> = HashMap::with_capacity(parsed.len());
    let mut dependents: HashMap<PathBuf, HashSet<PathBuf>> = HashMap::new();

    for (file, imports) in parsed {
        for import in &imports {
            if let Some(target) = &import.target
                && target != &file
            {
                dependents.entry(target.clone()).or_default().insert(file.clone());
            }
        }
        files.insert(file, imports);
    }

    debug!(
        "Module graph: {} files, {} files with dependents",
        files.len(),
        dependents.len()
    );
    Ok(ModuleGraph { root: root.to_path_buf(), files, dependents })
}

/// Closure of `seeds` under the reverse-dependency relation.
///
/// Explicit worklist with a visited set; the visited set is what terminates
/// traversal on cyclic graphs. Seeds themselves are always part of the
/// result, whether or not they are graph nodes.
pub fn affected_closure(seeds: &[PathBuf], graph: &ModuleGraph) -> HashSet<PathBuf> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack: Vec<PathBuf> = seeds.to_vec();

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }

        if let Some(importers) = graph.dependents_of(&current) {
            for importer in importers {
                if !visited.contains(importer) {
                    stack.push(importer.clone());
                }
            }
        }
    }

    debug!("Propagated {} seeds to {} affected files", seeds.len(), visited.len());
    visited
}
