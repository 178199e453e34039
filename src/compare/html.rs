//! Side-by-side HTML rendering of a line diff.
//!
//! The page is self-contained (inline CSS, no scripts). Hunks come from the
//! same grouped opcodes as the unified diff; replaced lines are paired and
//! highlighted at character level, long lines wrap onto continuation rows
//! marked with `>`.

use super::matcher::{Opcode, SequenceMatcher, Tag};
use std::fmt::Write;

/// Column at which long lines wrap.
pub const WRAP_COLUMN: usize = 80;

const STYLES: &str = r#"
    table.diff {font-family:Courier; border:medium;}
    .diff_header {background-color:#e0e0e0}
    td.diff_header {text-align:right}
    .diff_next {background-color:#c0c0c0}
    .diff_add {background-color:#aaffaa}
    .diff_chg {background-color:#ffff77}
    .diff_sub {background-color:#ffaaaa}"#;

const LEGEND: &str = r#"
    <table class="diff" summary="Legends">
        <tr> <th colspan="2"> Legends </th> </tr>
        <tr> <td> <table border="" summary="Colors">
                      <tr><th> Colors </th> </tr>
                      <tr><td class="diff_add">&nbsp;Added&nbsp;</td></tr>
                      <tr><td class="diff_chg">Changed</td> </tr>
                      <tr><td class="diff_sub">Deleted</td> </tr>
                  </table></td>
             <td> <table border="" summary="Links">
                      <tr><th colspan="2"> Context </th> </tr>
                      <tr><td> (3) </td><td>lines around each change</td> </tr>
                      <tr><td> (&gt;) </td><td>wrapped line continuation</td> </tr>
                  </table></td> </tr>
    </table>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Plain,
    Added,
    Changed,
    Deleted,
}

impl Mark {
    fn class(self) -> Option<&'static str> {
        match self {
            Mark::Plain => None,
            Mark::Added => Some("diff_add"),
            Mark::Changed => Some("diff_chg"),
            Mark::Deleted => Some("diff_sub"),
        }
    }
}

type Segments = Vec<(Mark, String)>;

/// One side of a table row: optional line number plus marked text.
#[derive(Debug, Default)]
struct Cell {
    number: Option<usize>,
    segments: Segments,
}

impl Cell {
    fn line(number: usize, segments: Segments) -> Self {
        Self {
            number: Some(number),
            segments,
        }
    }
}

fn whole(mark: Mark, text: &str) -> Segments {
    vec![(mark, text.to_string())]
}

/// Character-level highlighting of a replaced line pair.
fn intraline(old: &str, new: &str) -> (Segments, Segments) {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let mut left = Segments::new();
    let mut right = Segments::new();

    for Opcode {
        tag,
        a_start,
        a_end,
        b_start,
        b_end,
    } in SequenceMatcher::new(&a, &b).opcodes()
    {
        let (lm, rm) = match tag {
            Tag::Equal => (Mark::Plain, Mark::Plain),
            Tag::Replace => (Mark::Changed, Mark::Changed),
            Tag::Delete => (Mark::Deleted, Mark::Plain),
            Tag::Insert => (Mark::Plain, Mark::Added),
        };
        if a_end > a_start {
            left.push((lm, a[a_start..a_end].iter().collect()));
        }
        if b_end > b_start {
            right.push((rm, b[b_start..b_end].iter().collect()));
        }
    }
    (left, right)
}

/// Split marked text into rows of at most `width` characters.
fn wrap(segments: &Segments, width: usize) -> Vec<Segments> {
    let mut rows = vec![Segments::new()];
    let mut used = 0usize;
    for (mark, text) in segments {
        let mut chunk = String::new();
        for ch in text.chars() {
            if used == width {
                if !chunk.is_empty() {
                    if let Some(row) = rows.last_mut() {
                        row.push((*mark, std::mem::take(&mut chunk)));
                    }
                }
                rows.push(Segments::new());
                used = 0;
            }
            chunk.push(ch);
            used += 1;
        }
        if !chunk.is_empty() {
            if let Some(row) = rows.last_mut() {
                row.push((*mark, chunk));
            }
        }
    }
    rows
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).replace(' ', "&nbsp;")
}

fn render_segments(out: &mut String, segments: &Segments) {
    for (mark, text) in segments {
        match mark.class() {
            Some(class) => {
                let _ = write!(out, r#"<span class="{class}">{}</span>"#, escape(text));
            }
            None => out.push_str(&escape(text)),
        }
    }
}

fn push_row(out: &mut String, left: &Cell, right: &Cell) {
    let left_rows = wrap(&left.segments, WRAP_COLUMN);
    let right_rows = wrap(&right.segments, WRAP_COLUMN);
    let height = left_rows.len().max(right_rows.len());

    for n in 0..height {
        out.push_str("<tr>");
        for (cell, rows) in [(left, &left_rows), (right, &right_rows)] {
            let label = match (n, cell.number) {
                (0, Some(num)) => num.to_string(),
                (_, Some(_)) if n < rows.len() => "&gt;".to_string(),
                _ => String::new(),
            };
            let _ = write!(out, r#"<td class="diff_header">{label}</td><td nowrap="nowrap">"#);
            if let Some(row) = rows.get(n) {
                render_segments(out, row);
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
}

fn push_group(out: &mut String, a: &[&str], b: &[&str], group: &[Opcode]) {
    for op in group {
        let olds = &a[op.a_start..op.a_end];
        let news = &b[op.b_start..op.b_end];
        match op.tag {
            Tag::Equal => {
                for (k, (old, new)) in olds.iter().zip(news).enumerate() {
                    push_row(
                        out,
                        &Cell::line(op.a_start + k + 1, whole(Mark::Plain, old)),
                        &Cell::line(op.b_start + k + 1, whole(Mark::Plain, new)),
                    );
                }
            }
            Tag::Delete => {
                for (k, old) in olds.iter().enumerate() {
                    push_row(
                        out,
                        &Cell::line(op.a_start + k + 1, whole(Mark::Deleted, old)),
                        &Cell::default(),
                    );
                }
            }
            Tag::Insert => {
                for (k, new) in news.iter().enumerate() {
                    push_row(
                        out,
                        &Cell::default(),
                        &Cell::line(op.b_start + k + 1, whole(Mark::Added, new)),
                    );
                }
            }
            Tag::Replace => {
                let paired = olds.len().max(news.len());
                for k in 0..paired {
                    let (left, right) = match (olds.get(k), news.get(k)) {
                        (Some(old), Some(new)) => {
                            let (l, r) = intraline(old, new);
                            (
                                Cell::line(op.a_start + k + 1, l),
                                Cell::line(op.b_start + k + 1, r),
                            )
                        }
                        (Some(old), None) => (
                            Cell::line(op.a_start + k + 1, whole(Mark::Deleted, old)),
                            Cell::default(),
                        ),
                        (None, Some(new)) => (
                            Cell::default(),
                            Cell::line(op.b_start + k + 1, whole(Mark::Added, new)),
                        ),
                        (None, None) => continue,
                    };
                    push_row(out, &left, &right);
                }
            }
        }
    }
}

/// Render a complete HTML page comparing `a` and `b` side by side.
pub fn side_by_side(a: &[&str], b: &[&str], from_name: &str, to_name: &str, context: usize) -> String {
    let groups = SequenceMatcher::new(a, b).grouped_opcodes(context);

    let mut body = String::new();
    if groups.is_empty() {
        let message = if a.is_empty() && b.is_empty() {
            "Empty File"
        } else {
            "No Differences Found"
        };
        let _ = writeln!(
            body,
            r#"<tbody><tr><td class="diff_header"></td><td>&nbsp;{message}&nbsp;</td><td class="diff_header"></td><td>&nbsp;{message}&nbsp;</td></tr></tbody>"#
        );
    }
    for (n, group) in groups.iter().enumerate() {
        if n > 0 {
            body.push_str(
                "<tbody><tr><td class=\"diff_next\" colspan=\"4\">&hellip;</td></tr></tbody>\n",
            );
        }
        body.push_str("<tbody>\n");
        push_group(&mut body, a, b, group);
        body.push_str("</tbody>\n");
    }

    let from = escape(from_name);
    let to = escape(to_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="Content-Type" content="text/html; charset=utf-8" />
    <title>{from} vs {to}</title>
    <style type="text/css">{STYLES}
    </style>
</head>
<body>
    <table class="diff" cellspacing="0" cellpadding="0" rules="groups">
        <colgroup></colgroup> <colgroup></colgroup>
        <colgroup></colgroup> <colgroup></colgroup>
        <thead><tr><th class="diff_header" colspan="2">{from}</th><th class="diff_header" colspan="2">{to}</th></tr></thead>
{body}    </table>{LEGEND}
</body>
</html>
"#
    )
}
