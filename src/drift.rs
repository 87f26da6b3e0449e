//! Drift detection
//!
//! Compares freshly generated code with what is already on disk, so CI can
//! fail when a committed file is stale.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Line-level difference between the file on disk and regenerated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Unified diff, old = on disk, new = generated
    pub diff: String,
}

impl DriftReport {
    pub fn summary(&self) -> String {
        format!("{} line(s) added, {} line(s) removed", self.lines_added, self.lines_removed)
    }
}

/// Compare `current` (on disk) with `generated`. `None` when identical.
pub fn detect(current: &str, generated: &str, label: &str) -> Option<DriftReport> {
    if current == generated {
        return None;
    }

    let diff = TextDiff::from_lines(current, generated);
    let mut lines_added = 0;
    let mut lines_removed = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => lines_added += 1,
            ChangeTag::Delete => lines_removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("{} (on disk)", label), &format!("{} (generated)", label))
        .to_string();

    Some(DriftReport {
        lines_added,
        lines_removed,
        diff: unified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_has_no_drift() {
        assert!(detect("a\nb\n", "a\nb\n", "out.rs").is_none());
    }

    #[test]
    fn test_changed_line_is_reported() {
        let report = detect("a\nb\nc\n", "a\nB\nc\nd\n", "out.rs").unwrap();
        assert_eq!(report.lines_added, 2);
        assert_eq!(report.lines_removed, 1);
        assert!(report.diff.contains("--- out.rs (on disk)"));
        assert!(report.diff.contains("+++ out.rs (generated)"));
        assert!(report.diff.contains("-b\n"));
        assert!(report.diff.contains("+B\n"));
        assert_eq!(report.summary(), "2 line(s) added, 1 line(s) removed");
    }

    #[test]
    fn test_missing_file_counts_as_all_added() {
        let report = detect("", "x\ny\n", "out.rs").unwrap();
        assert_eq!(report.lines_added, 2);
        assert_eq!(report.lines_removed, 0);
    }
}
