//! Library Hygiene
//!
//! Library code propagates errors instead of panicking and carries no
//! dead-code allowances. Everything from the first `#[cfg(test)]` line of a
//! file onward is treated as test code and exempt.

use std::fs;
use std::path::{Path, PathBuf};

/// Crate source roots checked, relative to the workspace root.
const LIBRARY_ROOTS: &[&str] = &["trustroute-core/src", "trustroute-sim/src", "trustroute-cli/src"];

/// Patterns forbidden outside test code.
const FORBIDDEN: &[&str] = &[
    ".unwrap()",
    ".expect(",
    "panic!(",
    "todo!(",
    "unimplemented!(",
    "#[allow(dead_code)]",
];

/// A forbidden pattern found in library code
#[derive(Debug)]
struct HygieneViolation {
    file_path: String,
    line_number: usize,
    pattern: &'static str,
    context: String,
}

/// Checker for library hygiene violations
struct HygieneChecker {
    violations: Vec<HygieneViolation>,
    files_checked: usize,
}

impl HygieneChecker {
    fn new() -> Self {
        Self {
            violations: Vec::new(),
            files_checked: 0,
        }
    }

    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".."))
    }

    fn find_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::find_rust_files(&path, files)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Whole files holding only tests
    fn is_test_file(path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "tests.rs")
    }

    /// Scans `content` up to its test section
    fn check_content(&mut self, file_path: &str, content: &str) {
        self.files_checked += 1;
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            for &pattern in FORBIDDEN {
                if trimmed.contains(pattern) {
                    self.violations.push(HygieneViolation {
                        file_path: file_path.to_string(),
                        line_number: index + 1,
                        pattern,
                        context: trimmed.to_string(),
                    });
                }
            }
        }
    }

    fn check_workspace(&mut self) -> std::io::Result<()> {
        let root = Self::workspace_root();
        let mut files = Vec::new();
        for library in LIBRARY_ROOTS {
            Self::find_rust_files(&root.join(library), &mut files)?;
        }
        for file in files.iter().filter(|file| !Self::is_test_file(file)) {
            let content = fs::read_to_string(file)?;
            self.check_content(&file.to_string_lossy(), &content);
        }
        Ok(())
    }

    fn report_violations(&self) -> bool {
        if self.violations.is_empty() {
            println!(
                "Library hygiene: {} files checked, no violations found",
                self.files_checked
            );
            return true;
        }

        println!("Library hygiene violations found:");
        for violation in &self.violations {
            println!(
                "{}:{} uses `{}`",
                violation.file_path, violation.line_number, violation.pattern
            );
            println!("  {}", violation.context);
        }
        println!(
            "Found {} violation(s) in {} file(s) checked",
            self.violations.len(),
            self.files_checked
        );
        false
    }
}

#[test]
fn test_library_code_has_no_panicking_shortcuts() {
    let mut checker = HygieneChecker::new();
    checker.check_workspace().unwrap();
    assert!(checker.files_checked > 0);
    assert!(checker.report_violations());
}

#[test]
fn test_test_sections_are_exempt() {
    let mut checker = HygieneChecker::new();
    let content = "fn run() -> Result<(), E> {\n    // value.unwrap() in a comment\n    Ok(())\n}\n\n#[cfg(test)]\nmod tests {\n    fn t() { run().unwrap(); }\n}\n";
    checker.check_content("lib.rs", content);
    assert!(checker.violations.is_empty());

    checker.check_content("lib.rs", "fn run() { value.expect(\"x\"); }\n");
    assert_eq!(checker.violations.len(), 1);
    assert_eq!(checker.violations[0].pattern, ".expect(");
}

#[test]
fn test_whole_test_files_are_skipped() {
    assert!(HygieneChecker::is_test_file(Path::new(
        "trustroute-sim/src/deterministic/tests.rs"
    )));
    assert!(!HygieneChecker::is_test_file(Path::new(
        "trustroute-sim/src/deterministic/simulation.rs"
    )));
}
