use serde::Serialize;
use std::path::PathBuf;

/// A raw import specifier together with its project-local target, if any.
/// External packages and unresolvable paths have no target.
#[derive(Debug, Clone)]
pub struct ResolvedImport {
    pub request: String,
    pub target: Option<PathBuf>,
}

/// Outcome of an affected-test analysis.
///
/// When `should_run_all_tests` is true the caller runs the entire suite and
/// `affected_tests` is empty by contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Project-relative test file paths, sorted
    pub affected_tests: Vec<String>,
    pub should_run_all_tests: bool,
}
