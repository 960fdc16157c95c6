//! Standalone filesystem delta tracker.
//!
//! Scans a root directory, diffs the file set against the saved baseline,
//! appends a timestamped ADDED/REMOVED block to the change log, and
//! rewrites the baseline. Completely independent of the pipeline: no data
//! or control coupling, only the shared error/logging stack.

use anyhow::Context;
use chrono::Local;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const BASELINE_FILENAME: &str = "file_delta_baseline.log";
pub const CHANGELOG_FILENAME: &str = "file_delta_change.log";

/// The tracker's own log files never count as tracked content.
fn is_excluded(name: &str) -> bool {
    name == BASELINE_FILENAME || name == CHANGELOG_FILENAME
}

/// Outcome of one scan, for rendering by the caller.
#[derive(Debug)]
pub struct Report {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub seen: BTreeSet<String>,
}

pub struct DeltaScanner {
    root: PathBuf,
    baseline_path: PathBuf,
    change_log_path: PathBuf,
}

impl DeltaScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            baseline_path: root.join(BASELINE_FILENAME),
            change_log_path: root.join(CHANGELOG_FILENAME),
            root,
        }
    }

    /// Scan, diff against the baseline, log the delta, save the new
    /// baseline, and return the report.
    pub fn run(&self) -> anyhow::Result<Report> {
        let previous = load_baseline(&self.baseline_path)?;
        let current = scan_files(&self.root)?;

        let added: BTreeSet<String> = current.difference(&previous).cloned().collect();
        let removed: BTreeSet<String> = previous.difference(&current).cloned().collect();

        tracing::debug!(
            seen = current.len(),
            added = added.len(),
            removed = removed.len(),
            "scan complete"
        );

        append_change_log(&self.change_log_path, &added, &removed)?;
        save_baseline(&self.baseline_path, &current)?;

        Ok(Report {
            added,
            removed,
            seen: current,
        })
    }

    pub fn baseline_path(&self) -> &Path {
        &self.baseline_path
    }

    pub fn change_log_path(&self) -> &Path {
        &self.change_log_path
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn load_baseline(path: &Path) -> anyhow::Result<BTreeSet<String>> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read baseline {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_excluded(line))
        .map(ToString::to_string)
        .collect())
}

fn save_baseline(path: &Path, files: &BTreeSet<String>) -> anyhow::Result<()> {
    let mut body = String::new();
    for file in files {
        body.push_str(file);
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("write baseline {}", path.display()))
}

fn scan_files(root: &Path) -> anyhow::Result<BTreeSet<String>> {
    let mut results = BTreeSet::new();
    for entry in WalkDir::new(root) {
        let entry = entry.context("walk scan root")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_excluded(&name) {
            continue;
        }
        // Paths are recorded relative to the scan root so the baseline
        // survives the root directory being moved.
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        results.insert(relative.display().to_string());
    }
    Ok(results)
}

fn append_change_log(
    path: &Path,
    added: &BTreeSet<String>,
    removed: &BTreeSet<String>,
) -> anyhow::Result<()> {
    let mut block = String::new();
    block.push('\n');
    block.push_str(&format!("[RUN {}]\n", timestamp()));

    if added.is_empty() {
        block.push_str("ADDED: (none)\n");
    } else {
        block.push_str("ADDED:\n");
        for item in added {
            block.push_str(&format!("+ {item}\n"));
        }
    }

    if removed.is_empty() {
        block.push_str("REMOVED: (none)\n");
    } else {
        block.push_str("REMOVED:\n");
        for item in removed {
            block.push_str(&format!("- {item}\n"));
        }
    }

    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("read change log {}", path.display()))?
    } else {
        String::new()
    };
    fs::write(path, existing + &block)
        .with_context(|| format!("append change log {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn first_run_reports_everything_as_added() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "b.txt");

        let scanner = DeltaScanner::new(dir.path());
        let report = scanner.run().unwrap();

        assert_eq!(report.added.len(), 2);
        assert!(report.removed.is_empty());
        assert!(report.added.contains("a.txt"));
        assert!(scanner.baseline_path().exists());
        assert!(scanner.change_log_path().exists());
    }

    #[test]
    fn second_run_reports_only_the_delta() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep.txt");
        touch(dir.path(), "doomed.txt");

        let scanner = DeltaScanner::new(dir.path());
        scanner.run().unwrap();

        fs::remove_file(dir.path().join("doomed.txt")).unwrap();
        touch(dir.path(), "fresh.txt");

        let report = scanner.run().unwrap();
        assert_eq!(report.added, BTreeSet::from(["fresh.txt".to_string()]));
        assert_eq!(report.removed, BTreeSet::from(["doomed.txt".to_string()]));
        assert!(report.seen.contains("keep.txt"));
    }

    #[test]
    fn log_files_exclude_themselves() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");

        let scanner = DeltaScanner::new(dir.path());
        scanner.run().unwrap();
        // Baseline + change log now exist on disk but must not be tracked.
        let report = scanner.run().unwrap();

        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.seen, BTreeSet::from(["a.txt".to_string()]));
    }

    #[test]
    fn change_log_accumulates_runs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");

        let scanner = DeltaScanner::new(dir.path());
        scanner.run().unwrap();
        scanner.run().unwrap();

        let log = fs::read_to_string(scanner.change_log_path()).unwrap();
        assert_eq!(log.matches("[RUN ").count(), 2);
        assert!(log.contains("+ a.txt"));
        assert!(log.contains("ADDED: (none)"));
    }
}
