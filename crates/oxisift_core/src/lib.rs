//! Project model shared by oxisift tools.
//!
//! This crate turns a JavaScript/TypeScript project on disk into data the
//! impact engine can work with:
//! - Walking the project tree and collecting analyzable source files
//! - Extracting import specifiers from JS/TS files with the oxc parser
//! - Resolving specifiers to project-local files (relative paths and
//!   tsconfig path aliases); bare package specifiers stay unresolved
//! - Locating the project root and, for monorepos, the workspace root

mod collector;
mod constants;
mod parser;
mod project;
mod resolver;

// Re-export public API
pub use collector::collect_sources;
pub use constants::{INDEX_FILES, JS_TS_EXTENSIONS, RESOLVE_EXTENSIONS, TEST_SUFFIXES};
pub use parser::imports_for;
pub use project::{find_git_root, find_workspace_root, read_tsconfig_paths};
pub use resolver::resolve;
