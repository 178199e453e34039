//! Document comparison: similarity, line-level and word-level differences.
//!
//! ```text
//!  text_a, text_b
//!     │
//!     ├─ chars ──▶ matcher::ratio ──▶ similarity_percent
//!     ├─ lines ──▶ unified::unified_diff ──▶ TextDiff records ──▶ summary
//!     ├─ lines ──▶ html::side_by_side ──▶ HTML page
//!     └─ words ──▶ matcher::opcodes ──▶ WordChange records
//! ```
//!
//! Everything here is pure and synchronous; callers in async contexts can
//! invoke it from any number of tasks at once.

pub mod html;
pub mod matcher;
pub mod unified;

use matcher::{SequenceMatcher, Tag};
use serde::{Deserialize, Serialize};
use unified::DiffLine;

/// Default display name of the first document.
pub const DEFAULT_DOC1_NAME: &str = "Document 1";
/// Default display name of the second document.
pub const DEFAULT_DOC2_NAME: &str = "Document 2";
/// Default number of context lines around each change.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Kind of a line-level difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// A single line-level difference.
///
/// `line_number` is 1-based and follows the destination-side numbering of
/// the hunk it came from, for removals as well as additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDiff {
    #[serde(rename = "type")]
    pub change: ChangeType,
    pub line_number: usize,
    pub content: String,
    /// Prior content, only for [`ChangeType::Changed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
}

/// A word-level change. Positions are zero-based word indices: in the first
/// document for `Changed`/`Removed`, in the second for `Added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WordChange {
    Changed {
        old: String,
        new: String,
        position: usize,
    },
    Removed {
        content: String,
        position: usize,
    },
    Added {
        content: String,
        position: usize,
    },
}

impl WordChange {
    pub fn position(&self) -> usize {
        match self {
            WordChange::Changed { position, .. }
            | WordChange::Removed { position, .. }
            | WordChange::Added { position, .. } => *position,
        }
    }
}

/// Result of comparing two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub doc1_name: String,
    pub doc2_name: String,
    /// 0–100, rounded to two decimals.
    pub similarity_percent: f64,
    pub total_lines_doc1: usize,
    pub total_lines_doc2: usize,
    pub added_lines: usize,
    pub removed_lines: usize,
    /// Always 0 on the line-level path: adjacent removals and additions are
    /// reported separately, never paired.
    pub changed_lines: usize,
    pub diffs: Vec<TextDiff>,
    pub summary: String,
}

/// Names and context window for [`compare_documents`].
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub doc1_name: String,
    pub doc2_name: String,
    pub context_lines: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            doc1_name: DEFAULT_DOC1_NAME.to_string(),
            doc2_name: DEFAULT_DOC2_NAME.to_string(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Split text on universal newlines (`\n`, `\r\n`, `\r` and the Unicode line
/// and paragraph separators). A trailing terminator adds no empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        let is_break = matches!(
            ch,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}'
                | '\u{2028}' | '\u{2029}'
        );
        if !is_break {
            continue;
        }
        lines.push(&text[start..idx]);
        let mut end = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next_idx, '\n')) = iter.peek() {
                iter.next();
                end = next_idx + 1;
            }
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Character-level similarity of two texts as a percentage (not rounded).
pub fn similarity_ratio(text_a: &str, text_b: &str) -> f64 {
    let a: Vec<char> = text_a.chars().collect();
    let b: Vec<char> = text_b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio() * 100.0
}

/// Two-decimal rounding with exact ties going to the even neighbour.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Qualitative sentence for a similarity percentage.
pub fn similarity_band(similarity: f64) -> &'static str {
    if similarity > 95.0 {
        "Documents are nearly identical."
    } else if similarity > 80.0 {
        "Documents are similar with minor differences."
    } else if similarity > 50.0 {
        "Documents have moderate differences."
    } else {
        "Documents are substantially different."
    }
}

/// Convert unified-diff lines into line records.
///
/// The running counter tracks destination-side line numbers: a hunk header
/// resets it to the `+` start, context and added lines advance it, removed
/// lines are recorded at its current value without advancing it.
fn collect_line_diffs(lines: &[DiffLine<'_>]) -> Vec<TextDiff> {
    let mut diffs = Vec::new();
    let mut line_num = 0usize;

    for line in lines {
        match line {
            DiffLine::FileHeader { .. } => {}
            DiffLine::HunkHeader { new_start, .. } => line_num = *new_start,
            DiffLine::Removed(content) => diffs.push(TextDiff {
                change: ChangeType::Removed,
                line_number: line_num,
                content: content.to_string(),
                old_content: None,
            }),
            DiffLine::Added(content) => {
                diffs.push(TextDiff {
                    change: ChangeType::Added,
                    line_number: line_num,
                    content: content.to_string(),
                    old_content: None,
                });
                line_num += 1;
            }
            DiffLine::Context(_) => line_num += 1,
        }
    }
    diffs
}

/// Compare two documents line by line.
///
/// Similarity is computed over the raw character sequences, differences over
/// the line lists with `context_lines` of unified-diff context.
pub fn compare_documents(
    text_a: &str,
    text_b: &str,
    doc1_name: &str,
    doc2_name: &str,
    context_lines: usize,
) -> ComparisonResult {
    let lines_a = split_lines(text_a);
    let lines_b = split_lines(text_b);

    let similarity = similarity_ratio(text_a, text_b);
    let unified = unified::unified_diff(&lines_a, &lines_b, doc1_name, doc2_name, context_lines);
    let diffs = collect_line_diffs(&unified);

    let added = diffs.iter().filter(|d| d.change == ChangeType::Added).count();
    let removed = diffs.iter().filter(|d| d.change == ChangeType::Removed).count();
    let changed = 0;

    let summary = format!(
        "{} {} lines added, {} lines removed.",
        similarity_band(similarity),
        added,
        removed
    );
    tracing::debug!(
        "Compared '{}' ({} lines) with '{}' ({} lines): {:.2}% similar",
        doc1_name,
        lines_a.len(),
        doc2_name,
        lines_b.len(),
        similarity
    );

    ComparisonResult {
        doc1_name: doc1_name.to_string(),
        doc2_name: doc2_name.to_string(),
        similarity_percent: round2(similarity),
        total_lines_doc1: lines_a.len(),
        total_lines_doc2: lines_b.len(),
        added_lines: added,
        removed_lines: removed,
        changed_lines: changed,
        diffs,
        summary,
    }
}

/// [`compare_documents`] with names and context taken from `options`.
pub fn compare_with(text_a: &str, text_b: &str, options: &CompareOptions) -> ComparisonResult {
    compare_documents(
        text_a,
        text_b,
        &options.doc1_name,
        &options.doc2_name,
        options.context_lines,
    )
}

/// Textual unified diff of the two documents (empty when identical).
pub fn unified_diff_text(
    text_a: &str,
    text_b: &str,
    doc1_name: &str,
    doc2_name: &str,
    context_lines: usize,
) -> String {
    let lines_a = split_lines(text_a);
    let lines_b = split_lines(text_b);
    unified::render(&unified::unified_diff(
        &lines_a,
        &lines_b,
        doc1_name,
        doc2_name,
        context_lines,
    ))
}

/// Self-contained side-by-side HTML view with three lines of context.
pub fn generate_html_diff(text_a: &str, text_b: &str, doc1_name: &str, doc2_name: &str) -> String {
    let lines_a = split_lines(text_a);
    let lines_b = split_lines(text_b);
    html::side_by_side(&lines_a, &lines_b, doc1_name, doc2_name, DEFAULT_CONTEXT_LINES)
}

/// Whitespace including the information separators U+001C..U+001F.
fn is_word_break(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(is_word_break).filter(|w| !w.is_empty()).collect()
}

/// Word-level changes between two documents, whitespace-tokenised.
pub fn get_word_level_diff(text_a: &str, text_b: &str) -> Vec<WordChange> {
    let words_a = split_words(text_a);
    let words_b = split_words(text_b);

    SequenceMatcher::new(&words_a, &words_b)
        .opcodes()
        .into_iter()
        .filter_map(|op| {
            let old = || words_a[op.a_start..op.a_end].join(" ");
            let new = || words_b[op.b_start..op.b_end].join(" ");
            match op.tag {
                Tag::Equal => None,
                Tag::Replace => Some(WordChange::Changed {
                    old: old(),
                    new: new(),
                    position: op.a_start,
                }),
                Tag::Delete => Some(WordChange::Removed {
                    content: old(),
                    position: op.a_start,
                }),
                Tag::Insert => Some(WordChange::Added {
                    content: new(),
                    position: op.b_start,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(a: &str, b: &str) -> ComparisonResult {
        compare_with(a, b, &CompareOptions::default())
    }

    #[test]
    fn identical_documents() {
        let r = compare("a\nb\nc", "a\nb\nc");
        assert_eq!(r.similarity_percent, 100.0);
        assert_eq!(r.added_lines, 0);
        assert_eq!(r.removed_lines, 0);
        assert!(r.diffs.is_empty());
        assert_eq!(
            r.summary,
            "Documents are nearly identical. 0 lines added, 0 lines removed."
        );
        assert_eq!(r.doc1_name, "Document 1");
        assert_eq!(r.total_lines_doc1, 3);
    }

    #[test]
    fn appended_line_is_added() {
        let r = compare("a\nb", "a\nb\nc");
        assert_eq!(r.added_lines, 1);
        assert_eq!(r.removed_lines, 0);
        assert_eq!(
            r.diffs,
            vec![TextDiff {
                change: ChangeType::Added,
                line_number: 3,
                content: "c".into(),
                old_content: None,
            }]
        );
    }

    #[test]
    fn replaced_line_is_removed_plus_added() {
        let r = compare("one\ntwo\nthree", "one\n2\nthree");
        assert_eq!(r.changed_lines, 0);
        let kinds: Vec<ChangeType> = r.diffs.iter().map(|d| d.change).collect();
        assert_eq!(kinds, vec![ChangeType::Removed, ChangeType::Added]);
        // The removal is numbered on the destination-side counter.
        assert_eq!(r.diffs[0].line_number, 2);
        assert_eq!(r.diffs[1].line_number, 2);
        assert_eq!(r.diffs[0].content, "two");
        assert_eq!(r.diffs[1].content, "2");
    }

    #[test]
    fn summary_counts_match_records() {
        let r = compare("a\nb\nc\nd", "a\nx\ny\nd\ne");
        let added = r.diffs.iter().filter(|d| d.change == ChangeType::Added).count();
        let removed = r.diffs.iter().filter(|d| d.change == ChangeType::Removed).count();
        assert_eq!(r.added_lines, added);
        assert_eq!(r.removed_lines, removed);
        assert!(r
            .summary
            .ends_with(&format!("{added} lines added, {removed} lines removed.")));
    }

    #[test]
    fn swapping_arguments_keeps_band() {
        let a = "The quick brown fox\njumps over\nthe lazy dog";
        let b = "The quick brown cat\njumps over\nthe lazy dog\nand runs";
        let ab = compare(a, b);
        let ba = compare(b, a);
        assert_eq!(similarity_band(ab.similarity_percent), similarity_band(ba.similarity_percent));
        assert_eq!(ab.added_lines, ba.removed_lines);
        assert_eq!(ab.removed_lines, ba.added_lines);
    }

    #[test]
    fn empty_inputs() {
        let r = compare("", "");
        assert_eq!(r.similarity_percent, 100.0);
        assert_eq!(r.total_lines_doc1, 0);
        assert!(r.diffs.is_empty());

        let r = compare("", "new");
        assert_eq!(r.similarity_percent, 0.0);
        assert_eq!(r.added_lines, 1);
        assert_eq!(r.diffs[0].line_number, 1);
        assert!(r.summary.starts_with("Documents are substantially different."));
    }

    #[test]
    fn similarity_bands() {
        assert_eq!(similarity_band(96.0), "Documents are nearly identical.");
        assert_eq!(similarity_band(95.0), "Documents are similar with minor differences.");
        assert_eq!(similarity_band(80.5), "Documents are similar with minor differences.");
        assert_eq!(similarity_band(80.0), "Documents have moderate differences.");
        assert_eq!(similarity_band(50.0), "Documents are substantially different.");
    }

    #[test]
    fn similarity_is_rounded() {
        let r = compare("abc", "abd");
        // 2 * 2 / 6 = 66.666…
        assert_eq!(r.similarity_percent, 66.67);
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round2(40.625), 40.62);
        assert_eq!(round2(65.625), 65.62);
        assert_eq!(round2(12.375), 12.38);

        let a = "++y\n \na\nbar\na\n \n";
        let b = "the cat\n\na\n\n\n++y\nc\n \n--x\n++y\nbar\nx y z\nthe cat\nb";
        assert_eq!(similarity_ratio(a, b), 40.625);
        assert_eq!(compare(a, b).similarity_percent, 40.62);
    }

    #[test]
    fn second_hunk_numbers_from_its_header() {
        let old: Vec<String> = (1..=30).map(|n| format!("line {n}")).collect();
        let mut new = old.clone();
        new[2] = "changed 3".into();
        new[24] = "changed 25".into();

        let r = compare_documents(&old.join("\n"), &new.join("\n"), "old", "new", 3);
        let unified = unified_diff_text(&old.join("\n"), &new.join("\n"), "old", "new", 3);
        assert!(unified.contains("@@ -1,6 +1,6 @@"));
        assert!(unified.contains("@@ -22,7 +22,7 @@"));

        let records: Vec<(ChangeType, usize, &str)> = r
            .diffs
            .iter()
            .map(|d| (d.change, d.line_number, d.content.as_str()))
            .collect();
        assert_eq!(
            records,
            vec![
                (ChangeType::Removed, 3, "line 3"),
                (ChangeType::Added, 3, "changed 3"),
                (ChangeType::Removed, 25, "line 25"),
                (ChangeType::Added, 25, "changed 25"),
            ]
        );
    }

    #[test]
    fn word_diff_splits_on_information_separators() {
        assert_eq!(split_words("a\u{1C}b\u{1F} c"), vec!["a", "b", "c"]);
        assert_eq!(
            get_word_level_diff("a\u{1C}b", "a b"),
            Vec::<WordChange>::new()
        );
        assert_eq!(
            get_word_level_diff("a\u{1D}b", "a c"),
            vec![WordChange::Changed {
                old: "b".into(),
                new: "c".into(),
                position: 1
            }]
        );
    }

    #[test]
    fn split_lines_handles_terminators() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn word_diff_single_change() {
        let changes = get_word_level_diff("the cat sat", "the dog sat");
        assert_eq!(
            changes,
            vec![WordChange::Changed {
                old: "cat".into(),
                new: "dog".into(),
                position: 1
            }]
        );
    }

    #[test]
    fn word_diff_insert_and_delete() {
        let changes = get_word_level_diff("a b c", "a c d");
        assert_eq!(
            changes,
            vec![
                WordChange::Removed {
                    content: "b".into(),
                    position: 1
                },
                WordChange::Added {
                    content: "d".into(),
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn word_diff_json_shape() {
        let changes = get_word_level_diff("x", "y");
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json[0]["type"], "changed");
        assert_eq!(json[0]["old"], "x");
        assert_eq!(json[0]["position"], 0);
    }

    #[test]
    fn word_diff_of_empty_texts() {
        assert!(get_word_level_diff("", "").is_empty());
        assert!(get_word_level_diff("  ", "\n").is_empty());
    }

    #[test]
    fn text_diff_json_omits_old_content() {
        let r = compare("a", "b");
        let json = serde_json::to_value(&r.diffs[0]).unwrap();
        assert_eq!(json["type"], "removed");
        assert!(json.get("old_content").is_none());
    }

    #[test]
    fn unified_text_matches_hunk_format() {
        let text = unified_diff_text("a\nb", "a\nb\nc", "x", "y", 3);
        assert!(text.contains("@@ -1,2 +1,3 @@"));
        assert!(text.ends_with("+c"));
    }

    #[test]
    fn html_diff_mentions_names() {
        let html = generate_html_diff("a\nb", "a\nc", "left.md", "right.md");
        assert!(html.contains("left.md"));
        assert!(html.contains("right.md"));
    }
}
