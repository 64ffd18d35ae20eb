//! Shared formatting helpers for CLI output

use crate::core::issue::Issue;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Join list values for display, `-` when empty
pub fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Plain-text preview of an issue, as shown by `--dry-run`
pub fn format_issue(issue: &Issue) -> String {
    let mut out = String::new();
    out.push_str(&format!("Title:     {}\n", issue.title));
    out.push_str(&format!("Labels:    {}\n", format_list(&issue.labels)));
    out.push_str(&format!("Assignees: {}\n", format_list(&issue.assignees)));
    if let Some(ref milestone) = issue.milestone {
        out.push_str(&format!("Milestone: {}\n", milestone));
    }
    out.push_str("Body:\n");
    out.push_str(&issue.body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[]), "-");
        assert_eq!(
            format_list(&["bug".to_string(), "docs".to_string()]),
            "bug, docs"
        );
    }

    #[test]
    fn test_format_issue() {
        let issue = Issue::new("Broken build", "Steps:\n1. run")
            .with_labels(vec!["bug".to_string()])
            .with_milestone("v2");

        assert_eq!(
            format_issue(&issue),
            "Title:     Broken build\nLabels:    bug\nAssignees: -\nMilestone: v2\nBody:\nSteps:\n1. run"
        );
    }

    #[test]
    fn test_format_issue_without_milestone() {
        let issue = Issue::new("T", "B");
        assert!(!format_issue(&issue).contains("Milestone"));
    }
}
