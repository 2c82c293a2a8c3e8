//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No blocking sleep in production code
//! - Timing waits on engine deadlines, never on fixed naps
//!
//! The helpers below walk the production sources of the workspace and hand
//! the tests only the lines that ship, with comments and test modules
//! stripped.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["typewriter/core/src", "typewriter/cli/src"];

/// Root of the workspace this package lives in
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// All `.rs` files below `dir`
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// A line of production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// 1-based line number
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
}

/// Lines of `content` that end up in a release build
///
/// Stops at the first `#[cfg(test)]`; test-only items sit at the end of
/// every file in this workspace.
pub fn production_lines(content: &str) -> Vec<CodeLine> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter_map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line).trim_end();
            (!code.trim().is_empty()).then(|| CodeLine {
                number: idx + 1,
                code: code.to_string(),
            })
        })
        .collect()
}

/// Every production line matching `is_violation`, as `path:line - code`
pub fn find_violations(is_violation: impl Fn(&str) -> bool) -> Vec<String> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for path in rust_files(&root.join(dir)) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for line in production_lines(&content) {
                if is_violation(&line.code) {
                    violations.push(format!(
                        "{}:{} - {}",
                        path.display(),
                        line.number,
                        line.code.trim()
                    ));
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_strip_comments_and_tests() {
        let source = "\
fn run() {
    // std::thread::sleep(d);
    tick(); // then sleep(d)
}

#[cfg(test)]
mod tests {
    fn nap() { std::thread::sleep(d); }
}
";
        let lines = production_lines(source);
        let codes: Vec<&str> = lines.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["fn run() {", "    tick();", "}"]);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_workspace_root_holds_production_dirs() {
        let root = workspace_root();
        for dir in PRODUCTION_DIRS {
            assert!(root.join(dir).is_dir(), "missing {dir}");
        }
    }
}
