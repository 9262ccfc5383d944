use serde::Serialize;
use uuid::Uuid;

use crate::domain::BranchHighlight;

/// One rendering segment of a message body: plain text, or a highlighted
/// span carrying the id of the branch it opens.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Segment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Uuid>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Segment {
            text: text.to_string(),
            branch_id: None,
        }
    }

    fn highlighted(text: &str, branch_id: Uuid) -> Self {
        Segment {
            text: text.to_string(),
            branch_id: Some(branch_id),
        }
    }
}

/// Split message content into plain and highlighted segments.
///
/// No offsets are stored with a highlight, so each one is re-found by
/// scanning for the first occurrence of its literal text in the content not
/// yet consumed. Highlights are processed in discovered left-to-right order
/// regardless of insertion order, and ones whose text no longer matches are
/// skipped. Duplicate substrings therefore resolve to the first occurrence
/// only; later identical spans cannot be highlighted independently.
pub fn split_segments(content: &str, highlights: &[BranchHighlight]) -> Vec<Segment> {
    if highlights.is_empty() {
        return vec![Segment::plain(content)];
    }

    let mut sorted: Vec<&BranchHighlight> = highlights.iter().collect();
    sorted.sort_by_key(|h| content.find(&h.text).unwrap_or(usize::MAX));

    let mut segments = Vec::new();
    let mut remaining = content;

    for hl in sorted {
        let Some(idx) = remaining.find(&hl.text) else {
            continue;
        };

        if idx > 0 {
            segments.push(Segment::plain(&remaining[..idx]));
        }
        segments.push(Segment::highlighted(&hl.text, hl.branch_id));
        remaining = &remaining[idx + hl.text.len()..];
    }

    if !remaining.is_empty() {
        segments.push(Segment::plain(remaining));
    }

    segments
}
