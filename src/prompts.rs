//! Prompt texts for the model-backed services in [`crate::assist`].
//!
//! Every prompt asks for a single JSON object; the replies are decoded by
//! [`crate::assist::decode`]. Document content is cut to a fixed number of
//! characters before it is embedded.

/// Characters of document content sent for a summary.
pub const SUMMARY_CONTENT_CHARS: usize = 15_000;
/// Characters of document content sent for structured-data extraction.
pub const STRUCTURED_CONTENT_CHARS: usize = 10_000;
/// Characters of OCR text sent for correction.
pub const OCR_CONTENT_CHARS: usize = 5_000;

/// System message shared by all services.
pub const SYSTEM_PROMPT: &str = "You are a meticulous document analyst. \
You answer with a single valid JSON object and nothing else.";

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Prompt for an itemised document summary.
pub fn summary_prompt(content: &str, table_count: usize, max_bullets: usize) -> String {
    format!(
        r#"Analyze this document and create a concise, itemized summary.

DOCUMENT CONTENT:
{content}

NUMBER OF TABLES: {table_count}

INSTRUCTIONS:
1. Write a 1-2 sentence summary
2. Extract up to {max_bullets} key points as bullet items
3. Identify important numbers/statistics with context
4. Note any figures or diagrams mentioned
5. Summarize key data from tables

OUTPUT FORMAT (JSON only):
{{
    "summary": "Brief 1-2 sentence overview",
    "key_points": ["Key point 1", "Key point 2"],
    "tables_summary": [{{"title": "Table name/topic", "key_data": ["fact1", "fact2"]}}],
    "figures_mentioned": ["Figure 1: Description"],
    "important_numbers": [{{"value": "42%", "context": "market share"}}]
}}

Return ONLY valid JSON."#,
        content = truncate_chars(content, SUMMARY_CONTENT_CHARS),
    )
}

/// Prompt for document-type detection and field extraction.
pub fn structured_data_prompt(content: &str) -> String {
    format!(
        r#"Extract structured data from this document.

DOCUMENT:
{content}

Identify the document type and extract relevant fields.

For INVOICES/RECEIPTS:
- vendor, date, items, totals, payment info

For FORMS:
- field names and values

For REPORTS:
- title, authors, date, key findings, conclusions

For CONTRACTS:
- parties, dates, terms, obligations

OUTPUT FORMAT (JSON):
{{
    "document_type": "invoice|receipt|form|report|academic|contract|other",
    "confidence": 0.95,
    "extracted_fields": {{"field_name": "value"}},
    "line_items": [{{"description": "...", "quantity": 1, "amount": "..."}}]
}}

Return ONLY valid JSON."#,
        content = truncate_chars(content, STRUCTURED_CONTENT_CHARS),
    )
}

const CHART_PROMPT: &str = r#"Analyze this chart/graph image and extract the data.

Return a JSON object with:
1. "chart_type": The type of chart (bar, line, pie, scatter, area, table, other)
2. "title": The chart title if visible
3. "data": Array of data points. Format depends on chart type:
   - Bar/Line: [{"label": "X value", "value": Y value}, ...]
   - Pie: [{"label": "Category", "value": percentage}, ...]
   - Scatter: [{"x": X, "y": Y}, ...]
   - Table: [{"column1": "value", "column2": "value"}, ...]
4. "x_axis": X-axis label if visible
5. "y_axis": Y-axis label if visible
6. "legend": Array of legend items if present
7. "insights": 2-3 key insights from the data

Be as accurate as possible with the values. If you can't read exact values, estimate based on the scale.

Return ONLY valid JSON, no explanation."#;

const DIAGRAM_PROMPT: &str = r#"Analyze this diagram/schematic and extract its information.

Return a JSON object with:
1. "diagram_type": Type (flowchart, circuit, architecture, org_chart, uml, process, network, other)
2. "title": Title if visible
3. "components": Array of identified components/nodes
   [{"id": "1", "label": "Start", "type": "node"}, ...]
4. "connections": Array of connections between components
   [{"from": "1", "to": "2", "label": "optional edge label"}, ...]
5. "hierarchy": For org charts or hierarchical diagrams
6. "description": Brief description of what the diagram shows
7. "key_elements": Most important elements to note

Return ONLY valid JSON."#;

fn with_hint(base: &str, kind: &str, hint: Option<&str>) -> String {
    match hint.map(str::trim).filter(|h| !h.is_empty()) {
        Some(h) => format!("{base}\n\nHint: the {kind} is expected to be a {h}."),
        None => base.to_string(),
    }
}

/// Prompt for chart data extraction, optionally hinting the chart type.
pub fn chart_prompt(hint: Option<&str>) -> String {
    with_hint(CHART_PROMPT, "chart", hint)
}

/// Prompt for diagram analysis, optionally hinting the diagram type.
pub fn diagram_prompt(hint: Option<&str>) -> String {
    with_hint(DIAGRAM_PROMPT, "diagram", hint)
}

/// Prompt for context-aware OCR correction.
pub fn ocr_fix_prompt(text: &str, language: &str, context: Option<&str>) -> String {
    let context_line = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("CONTEXT: {c}"))
        .unwrap_or_default();
    format!(
        r#"Fix OCR errors in this text. The text was extracted via OCR and may contain character recognition errors.

LANGUAGE: {language}
{context_line}

TEXT TO FIX:
{text}

INSTRUCTIONS:
1. Fix character confusion errors (0/O, 1/l/I, rn/m, etc.)
2. Fix word boundary issues
3. Fix obvious spelling errors caused by OCR
4. Preserve intentional formatting and structure
5. Do NOT change content meaning, only fix recognition errors

Return JSON:
{{
    "corrected_text": "the corrected text",
    "corrections": [
        {{"original": "tne", "corrected": "the", "confidence": 0.99}}
    ],
    "overall_confidence": 0.95
}}

Return ONLY valid JSON."#,
        text = truncate_chars(text, OCR_CONTENT_CHARS),
    )
}
