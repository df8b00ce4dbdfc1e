//! Line-level diff between two versions of a block's content.
//!
//! The backend can compute a diff itself (`GET /versioning/block/{id}/diff`);
//! this one runs locally so the editor can compare unsaved content with a
//! snapshot without a round trip.

use serde::Serialize;

/// The type of a line in a diff result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineType {
    Added,
    Removed,
    Unchanged,
}

impl DiffLineType {
    /// Marker used when printing a diff, in the style of `ndiff`.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Added => "+ ",
            Self::Removed => "- ",
            Self::Unchanged => "  ",
        }
    }
}

/// A single line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
}

/// Compute a line-level diff between two texts using LCS.
pub fn compute_line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let m = old_lines.len();
    let n = new_lines.len();

    let mut lcs = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            lcs[i][j] = if old_lines[i - 1] == new_lines[j - 1] {
                lcs[i - 1][j - 1] + 1
            } else {
                lcs[i - 1][j].max(lcs[i][j - 1])
            };
        }
    }

    let mut result = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let (line_type, content) = if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            i -= 1;
            j -= 1;
            (DiffLineType::Unchanged, old_lines[i])
        } else if j > 0 && (i == 0 || lcs[i][j - 1] >= lcs[i - 1][j]) {
            j -= 1;
            (DiffLineType::Added, new_lines[j])
        } else {
            i -= 1;
            (DiffLineType::Removed, old_lines[i])
        };
        result.push(DiffLine {
            line_type,
            content: content.to_string(),
        });
    }

    result.reverse();
    result
}

/// Render a diff as text, one marked line per entry.
pub fn format_diff(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}{}", l.line_type.marker(), l.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether a diff contains any change at all.
pub fn has_changes(lines: &[DiffLine]) -> bool {
    lines.iter().any(|l| l.line_type != DiffLineType::Unchanged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_have_no_changes() {
        let diff = compute_line_diff("<p>a</p>\n<p>b</p>", "<p>a</p>\n<p>b</p>");
        assert_eq!(diff.len(), 2);
        assert!(!has_changes(&diff));
    }

    #[test]
    fn added_line_at_end() {
        let diff = compute_line_diff("one", "one\ntwo");
        assert_eq!(diff[0].line_type, DiffLineType::Unchanged);
        assert_eq!(diff[1].line_type, DiffLineType::Added);
        assert_eq!(diff[1].content, "two");
    }

    #[test]
    fn replaced_line_is_removed_then_added() {
        let diff = compute_line_diff("A", "B");
        assert_eq!(format_diff(&diff), "- A\n+ B");
    }

    #[test]
    fn empty_old_text_is_all_added() {
        let diff = compute_line_diff("", "x\ny");
        assert!(diff.iter().all(|l| l.line_type == DiffLineType::Added));
    }
}
