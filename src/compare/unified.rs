//! Unified-diff reconstruction over two line lists.
//!
//! Lines are produced as typed [`DiffLine`] values rather than prefixed
//! strings, so a removed line whose text starts with `--` is never mistaken
//! for a file header. `Display` renders the familiar textual form.

use super::matcher::{SequenceMatcher, Tag};
use std::fmt;

/// One line of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// `--- name` (old) or `+++ name` (new).
    FileHeader { old: bool, name: &'a str },
    /// `@@ -old_start,old_len +new_start,new_len @@`, starts as displayed.
    HunkHeader {
        old_start: usize,
        old_len: usize,
        new_start: usize,
        new_len: usize,
    },
    Context(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Displayed start of a range: 1-based, or the preceding line for an empty
/// range.
fn range_start(start: usize, len: usize) -> usize {
    if len == 0 {
        start
    } else {
        start + 1
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, start: usize, len: usize) -> fmt::Result {
    if len == 1 {
        write!(f, "{start}")
    } else {
        write!(f, "{start},{len}")
    }
}

impl fmt::Display for DiffLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::FileHeader { old: true, name } => write!(f, "--- {name}"),
            DiffLine::FileHeader { old: false, name } => write!(f, "+++ {name}"),
            DiffLine::HunkHeader {
                old_start,
                old_len,
                new_start,
                new_len,
            } => {
                f.write_str("@@ -")?;
                write_range(f, *old_start, *old_len)?;
                f.write_str(" +")?;
                write_range(f, *new_start, *new_len)?;
                f.write_str(" @@")
            }
            DiffLine::Context(line) => write!(f, " {line}"),
            DiffLine::Removed(line) => write!(f, "-{line}"),
            DiffLine::Added(line) => write!(f, "+{line}"),
        }
    }
}

/// Build a unified diff from `a` to `b` with `context` lines around each
/// change. Identical inputs produce an empty diff (no file headers either).
pub fn unified_diff<'a>(
    a: &[&'a str],
    b: &[&'a str],
    from_name: &'a str,
    to_name: &'a str,
    context: usize,
) -> Vec<DiffLine<'a>> {
    let mut out = Vec::new();
    let groups = SequenceMatcher::new(a, b).grouped_opcodes(context);

    for (n, group) in groups.iter().enumerate() {
        if n == 0 {
            out.push(DiffLine::FileHeader {
                old: true,
                name: from_name,
            });
            out.push(DiffLine::FileHeader {
                old: false,
                name: to_name,
            });
        }

        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_len = last.a_end - first.a_start;
        let new_len = last.b_end - first.b_start;
        out.push(DiffLine::HunkHeader {
            old_start: range_start(first.a_start, old_len),
            old_len,
            new_start: range_start(first.b_start, new_len),
            new_len,
        });

        for op in group {
            if op.tag == Tag::Equal {
                out.extend(a[op.a_start..op.a_end].iter().copied().map(DiffLine::Context));
                continue;
            }
            if matches!(op.tag, Tag::Replace | Tag::Delete) {
                out.extend(a[op.a_start..op.a_end].iter().copied().map(DiffLine::Removed));
            }
            if matches!(op.tag, Tag::Replace | Tag::Insert) {
                out.extend(b[op.b_start..op.b_end].iter().copied().map(DiffLine::Added));
            }
        }
    }
    out
}

/// Render a diff as text, one line per entry, without trailing newlines.
pub fn render(lines: &[DiffLine<'_>]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_nothing() {
        let a = ["x", "y"];
        assert!(unified_diff(&a, &a, "a", "b", 3).is_empty());
    }

    #[test]
    fn appended_line() {
        let a = ["a", "b"];
        let b = ["a", "b", "c"];
        let diff = render(&unified_diff(&a, &b, "old", "new", 3));
        assert_eq!(diff, "--- old\n+++ new\n@@ -1,2 +1,3 @@\n a\n b\n+c");
    }

    #[test]
    fn insertion_into_empty_document() {
        let a: [&str; 0] = [];
        let b = ["only"];
        let lines = unified_diff(&a, &b, "old", "new", 3);
        assert_eq!(lines[2].to_string(), "@@ -0,0 +1 @@");
        assert_eq!(lines[3], DiffLine::Added("only"));
    }

    #[test]
    fn replace_emits_removals_before_additions() {
        let a = ["keep", "old"];
        let b = ["keep", "new"];
        let lines = unified_diff(&a, &b, "a", "b", 0);
        assert_eq!(
            lines[2..],
            [
                DiffLine::HunkHeader {
                    old_start: 2,
                    old_len: 1,
                    new_start: 2,
                    new_len: 1
                },
                DiffLine::Removed("old"),
                DiffLine::Added("new"),
            ]
        );
    }

    #[test]
    fn dashed_content_is_not_a_header() {
        let a = ["-- note"];
        let b: [&str; 0] = [];
        let lines = unified_diff(&a, &b, "a", "b", 3);
        assert_eq!(lines.last(), Some(&DiffLine::Removed("-- note")));
        assert_eq!(lines.last().map(ToString::to_string).as_deref(), Some("--- note"));
    }
}
