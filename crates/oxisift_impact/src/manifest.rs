use log::{debug, trace};
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

/// A changed line carrying a quoted key/value pair, either quote style.
/// Diff file headers (`--- a/...`, `+++ b/...`) fail the quote position and
/// never match.
static DEP_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[+-]\s*["']([^"']+)["']\s*:\s*["'][^"']*["']"#).expect("dependency line pattern")
});

/// Manifest section headers whose entries are dependency declarations.
const SECTION_MARKERS: &[&str] = &[
    r#""dependencies":"#,
    r#""devDependencies":"#,
    r#""peerDependencies":"#,
    r#""optionalDependencies":"#,
];

/// Extract the distinct dependency names changed in a unified diff of a
/// package manifest.
///
/// Line-oriented: every added or removed line with a quoted key/value shape
/// is a candidate (a version bump shows up as one removal plus one
/// addition of the same key), accepted only when the line sits in a
/// dependency section. Output order is first-occurrence order; callers may
/// only rely on membership.
pub fn parse_manifest_diff(diff: &str) -> Vec<String> {
    let lines: Vec<&str> = diff.lines().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut changed: Vec<String> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !(line.starts_with('-') || line.starts_with('+')) {
            continue;
        }
        let Some(caps) = DEP_ENTRY.captures(line) else { continue };
        if !in_dependencies_section(&lines, index) {
            trace!("Skipping changed key outside dependency sections: {}", line);
            continue;
        }

        let name = caps[1].trim().to_string();
        if seen.insert(name.clone()) {
            changed.push(name);
        }
    }

    debug!("Manifest diff changed {} dependencies", changed.len());
    changed
}

/// Backward scan from `index`: true once a dependency section marker is
/// found, false once some other top-level quoted key appears first (a
/// sibling section closes off the search) or the scan runs out of lines.
///
/// The scan is purely textual and does not track brace depth, so a key named
/// "dependencies" nested inside an unrelated object can mislead it. Accepted
/// limitation of diff-based parsing; the full manifest is not available here.
fn in_dependencies_section(lines: &[&str], index: usize) -> bool {
    for raw in lines[..=index].iter().rev() {
        let line = raw.trim();
        if SECTION_MARKERS.iter().any(|marker| line.contains(marker)) {
            return true;
        }
        if line.starts_with('"') && line.contains("\":") && !line.contains("dependencies") {
            return false;
        }
    }
    false
}
