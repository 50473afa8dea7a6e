use log::debug;
use std::collections::HashSet;

/// True iff any changed package is configured to force a full-suite run.
/// When true, callers skip impact analysis entirely and report an empty
/// affected list alongside the flag.
pub fn should_run_all_tests(changed_packages: &[String], run_all_tests_packages: &[String]) -> bool {
    changed_packages.iter().any(|package| run_all_tests_packages.contains(package))
}

/// Union of the caller-supplied comma-separated list and the configured
/// list, deduplicated, first occurrence wins.
pub fn merge_run_all_packages(from_input: &str, from_config: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut packages: Vec<String> = Vec::new();

    let input_names = from_input.split(',').map(str::trim).filter(|name| !name.is_empty());
    for name in input_names.chain(from_config.iter().map(String::as_str)) {
        if seen.insert(name) {
            packages.push(name.to_string());
        }
    }

    debug!("Run-all-tests package set: {:?}", packages);
    packages
}
