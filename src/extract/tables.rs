//! GFM table discovery and CSV rendering.
//!
//! Used when a converter hands back Markdown without structured tables: any
//! pipe table with a header separator row is lifted out as an
//! [`ExtractedTable`].

use super::ExtractedTable;

const FENCE: &str = "```";

pub(crate) fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() > 2
}

pub(crate) fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    is_table_row(trimmed)
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c == ' ')
}

/// Split a table row into trimmed cell texts. `\|` is kept as a literal pipe.
fn split_cells(row: &str) -> Vec<String> {
    let inner = row.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a GFM table as CSV: header first, separator dropped, one record
/// per line with a trailing newline.
pub fn table_to_csv(markdown: &str) -> String {
    let mut out = String::new();
    for line in markdown.lines().filter(|l| is_table_row(l) && !is_separator_row(l)) {
        let record: Vec<String> = split_cells(line).iter().map(|c| csv_field(c)).collect();
        out.push_str(&record.join(","));
        out.push('\n');
    }
    out
}

fn flush_table(block: &mut Vec<&str>, tables: &mut Vec<ExtractedTable>, page: usize) {
    if block.len() >= 2 && is_separator_row(block[1]) && !is_separator_row(block[0]) {
        let md = block.join("\n");
        tables.push(ExtractedTable {
            index: tables.len(),
            page,
            csv: Some(table_to_csv(&md)),
            markdown: md,
        });
    }
    block.clear();
}

/// Find every GFM table in `markdown` outside fenced code blocks.
///
/// A table is a run of pipe rows whose second row is a separator. All
/// tables are attributed to `page`.
pub fn find_tables(markdown: &str, page: usize) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with(FENCE) {
            in_code = !in_code;
            flush_table(&mut block, &mut tables, page);
            continue;
        }
        if !in_code && is_table_row(line) {
            block.push(line.trim());
        } else {
            flush_table(&mut block, &mut tables, page);
        }
    }
    flush_table(&mut block, &mut tables, page);
    tables
}
