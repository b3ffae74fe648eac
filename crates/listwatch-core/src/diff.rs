//! Line-based change detection between two snapshots.
//!
//! The watched list grows by appending lines, so a plain line diff is enough to
//! spot new entries. It is position-sensitive: an edited line shows up as an
//! insertion, and a moved line shows up as an insertion at its new position.
//! Deletions are never reported.

use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// Context lines per hunk, matching `diff -u`.
const CONTEXT_LINES: usize = 3;

/// Upper bound on diff computation; past this the algorithm falls back to a
/// coarser but still correct edit script.
const DIFF_DEADLINE: Duration = Duration::from_secs(5);

/// Lines inserted in `current` relative to `previous`, in diff order.
///
/// Line terminators are not part of the compared content, so `"a\nb"` and
/// `"a\nb\n"` have identical lines. Only insertions are returned; hunk and file
/// headers never appear in the output.
///
/// # Examples
///
/// ```rust
/// use listwatch_core::detect_additions;
///
/// let previous = "# List\n- [A](https://a.example) - A.";
/// let current = "# List\n- [A](https://a.example) - A.\n- [B](https://b.example) - B.";
/// assert_eq!(detect_additions(previous, current), ["- [B](https://b.example) - B."]);
/// assert!(detect_additions(current, current).is_empty());
/// ```
#[must_use]
pub fn detect_additions(previous: &str, current: &str) -> Vec<String> {
    if previous == current {
        return Vec::new();
    }

    let old_lines: Vec<&str> = previous.lines().collect();
    let new_lines: Vec<&str> = current.lines().collect();

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_DEADLINE)
        .diff_slices(&old_lines, &new_lines);

    let mut added = Vec::new();
    for hunk in diff.grouped_ops(CONTEXT_LINES) {
        for op in &hunk {
            for change in diff.iter_changes(op) {
                if change.tag() == ChangeTag::Insert {
                    added.push(change.value().to_string());
                }
            }
        }
    }
    added
}
