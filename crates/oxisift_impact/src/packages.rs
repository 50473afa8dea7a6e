use log::debug;
use std::{collections::HashSet, path::PathBuf};

use crate::{filters::relativize_existing, graph::ModuleGraph};

/// Whether an import specifier references `package`.
///
/// Three independent rules, any one suffices:
/// - exact: `react` matches `react`
/// - subpath: `react/jsx-runtime` matches `react` (but `react-dom` does not)
/// - scoped prefix: for `@scope/...` names, plain string-prefix match. This
///   lets `@types/node` match `@types/node-other` as well; the looser rule
///   is intentional and covered by tests.
pub fn import_matches_package(specifier: &str, package: &str) -> bool {
    if specifier == package {
        return true;
    }

    if let Some(rest) = specifier.strip_prefix(package)
        && rest.starts_with('/')
    {
        return true;
    }

    package.starts_with('@') && specifier.starts_with(package)
}

/// Project-relative paths of all source files importing any of the given
/// packages. Empty input short-circuits to an empty result. Files are
/// reported once regardless of how many imports match, run through the same
/// existence and boundary filters as affected tests, and sorted.
pub fn files_using_packages(package_names: &[String], graph: &ModuleGraph) -> Vec<String> {
    if package_names.is_empty() {
        return Vec::new();
    }

    let mut using: HashSet<&PathBuf> = HashSet::new();
    for (file, imports) in graph.files() {
        'file: for import in imports {
            for package in package_names {
                if import_matches_package(&import.request, package) {
                    using.insert(file);
                    break 'file;
                }
            }
        }
    }

    debug!("{} files use changed packages {:?}", using.len(), package_names);
    relativize_existing(using.into_iter(), graph.root())
}
