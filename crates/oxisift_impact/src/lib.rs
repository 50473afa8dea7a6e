//! Change-impact analysis for JavaScript/TypeScript test suites.
//!
//! Given a set of changed source files and/or changed package names, this
//! crate computes the minimal set of test files that must be re-run: it
//! builds the project's import graph, inverts it, propagates "changed"
//! status to transitive dependents, and filters the result down to test
//! files. Changed dependency names can be mined from a unified diff of a
//! package manifest, and a configured set of high-impact packages forces a
//! full-suite run instead of targeted selection.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use oxisift_impact::{Config, run_affected_check};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     root: Some(std::path::PathBuf::from("/path/to/project")),
//!     changed_files: vec![std::path::PathBuf::from("src/foo.ts")],
//!     changed_packages: vec![],
//!     since: None,
//!     manifest_diff: None,
//!     run_all_tests_packages: String::new(),
//!     config: None,
//!     json: false,
//!     tsconfig_paths: Default::default(),
//! };
//!
//! let result = run_affected_check(cfg)?;
//! if result.should_run_all_tests {
//!     // hand the whole suite to the test runner
//! } else {
//!     for test in &result.affected_tests {
//!         println!("{}", test);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod filters;
mod graph;
mod manifest;
mod packages;
mod policy;
mod reporter;
mod types;
mod vcs;

// Re-export public API
pub use checker::run_affected_check;
pub use config::{Config, SiftConfig, load_sift_config};
pub use filters::{affected_test_paths, is_test_file};
pub use graph::{ModuleGraph, affected_closure, build_module_graph};
pub use manifest::parse_manifest_diff;
pub use packages::{files_using_packages, import_matches_package};
pub use policy::{merge_run_all_packages, should_run_all_tests};
pub use reporter::{print_affected_tests, print_no_affected_message, print_run_all_notice};
pub use types::{ImpactResult, ResolvedImport};
pub use vcs::{ChangeSet, changes_since};
