use gherkin_stream::{Token, TokenKind};

use crate::group::GroupChain;

const TAG_COMMENT: &[TokenKind] = &[TokenKind::TagLine, TokenKind::Comment];
const EMPTY: &[TokenKind] = &[TokenKind::Empty];

/// Render the grouped token stream as a canonical document: one
/// string per source line, padded per kind, joined with `\n` and a
/// single trailing newline.
pub fn render(chain: &GroupChain, indent: usize) -> String {
    let mut document: Vec<String> = Vec::new();
    // Entered at the first `Rule:` and never left; every later
    // group shifts right by one unit.
    let mut rule_padding = 0usize;
    let mut accumulator: Vec<Token> = Vec::new();

    for index in 0..chain.len() {
        let group = chain.group(index);

        if accumulates(chain, index, &accumulator) {
            accumulator.extend(group.values.iter().cloned());
            continue;
        }

        let merged: Vec<Token>;
        let values: &[Token] = if group.kind == TokenKind::TableRow && !accumulator.is_empty() {
            let mut taken = core::mem::take(&mut accumulator);
            taken.extend(group.values.iter().cloned());
            merged = taken;
            &merged
        } else {
            &group.values
        };

        let mut padding = base_padding(group.kind, indent) + rule_padding;
        let mut lines = render_lines(group.kind, values);

        match group.kind {
            TokenKind::RuleLine => {
                rule_padding = indent;
                padding = indent;
            }
            TokenKind::TagLine => {
                padding = tag_comment_padding(chain, index, indent) + rule_padding;
            }
            TokenKind::Comment => {
                padding = tag_comment_padding(chain, index, indent) + rule_padding;
                trim_lines(&mut lines);
            }
            TokenKind::Other => {
                if is_feature_description(chain, index) {
                    // Feature descriptions indent one level, not three.
                    padding = indent + rule_padding;
                } else if inside_docstring(chain, index)
                    && let Some(rendered) = docstring_json(&lines, padding, indent)
                {
                    lines = vec![rendered];
                }
                trim_lines(&mut lines);
            }
            _ => {}
        }

        for line in &lines {
            document.push(pad_line(padding, line));
        }
    }

    let mut out = document.join("\n");
    out.push('\n');
    out
}

/// Comments interleaved between table rows stay attached to the
/// table so the whole block aligns as one. A row whose next group
/// is an interleaved comment (comment followed by more rows) opens
/// or extends the accumulation; the row that ends the table flushes
/// it.
fn accumulates(chain: &GroupChain, index: usize, accumulator: &[Token]) -> bool {
    let kind = chain.group(index).kind;
    if kind == TokenKind::TableRow
        && chain.kind_at(index + 1) == Some(TokenKind::Comment)
        && chain.kind_at(index + 2) == Some(TokenKind::TableRow)
    {
        return true;
    }
    kind == TokenKind::Comment && !accumulator.is_empty()
}

fn base_padding(kind: TokenKind, indent: usize) -> usize {
    match kind {
        TokenKind::BackgroundLine | TokenKind::ScenarioLine => indent,
        TokenKind::StepLine | TokenKind::ExamplesLine => 2 * indent,
        TokenKind::DocStringSeparator | TokenKind::TableRow | TokenKind::Other => 3 * indent,
        _ => 0,
    }
}

fn render_lines(kind: TokenKind, values: &[Token]) -> Vec<String> {
    match kind {
        TokenKind::FeatureLine
        | TokenKind::BackgroundLine
        | TokenKind::ScenarioLine
        | TokenKind::RuleLine
        | TokenKind::ExamplesLine => values
            .iter()
            .map(|t| format!("{}: {}", t.keyword, t.text))
            .collect(),
        TokenKind::StepLine => values
            .iter()
            .map(|t| format!("{}{}", t.keyword, t.text))
            .collect(),
        TokenKind::Comment | TokenKind::Other => {
            values.iter().map(|t| t.text.clone()).collect()
        }
        TokenKind::TagLine | TokenKind::Empty => values.iter().map(items_text).collect(),
        TokenKind::DocStringSeparator => values.iter().map(|t| t.keyword.clone()).collect(),
        TokenKind::Language => values
            .iter()
            .map(|t| format!("# language: {}", t.text))
            .collect(),
        TokenKind::TableRow => table_lines(values),
        TokenKind::Eof => Vec::new(),
    }
}

fn items_text(token: &Token) -> String {
    token
        .items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Padding of a tag or comment group follows its nearest
/// non-tag/comment neighbour, preferring the next one. A trailing
/// tag or comment (nothing but blank lines after it) sits at
/// scenario level.
fn tag_comment_padding(chain: &GroupChain, index: usize, indent: usize) -> usize {
    let mut kind = chain.next_skipping(index, TAG_COMMENT).map(|g| g.kind);
    if kind.is_none() {
        kind = chain.prev_skipping(index, TAG_COMMENT).map(|g| g.kind);
    }
    if chain.next_skipping(index, EMPTY).is_none() {
        return indent;
    }
    kind.map_or(0, |k| base_padding(k, indent))
}

fn is_feature_description(chain: &GroupChain, index: usize) -> bool {
    chain
        .prev_skipping(index, EMPTY)
        .is_some_and(|g| g.kind == TokenKind::FeatureLine)
}

fn inside_docstring(chain: &GroupChain, index: usize) -> bool {
    index > 0
        && chain.kind_at(index - 1) == Some(TokenKind::DocStringSeparator)
        && chain.kind_at(index + 1) == Some(TokenKind::DocStringSeparator)
}

/// Join the docstring lines and, when they form a relaxed-JSON
/// value, pretty-print them at the docstring's own padding. Content
/// that merely looks JSON-shaped is left alone.
fn docstring_json(lines: &[String], padding: usize, indent: usize) -> Option<String> {
    let source = lines.join(" ");
    if !relaxed_json::valid(source.as_bytes()) {
        return None;
    }
    let prefix = " ".repeat(padding);
    let unit = " ".repeat(indent);
    let mut buf = Vec::new();
    relaxed_json::indent(&mut buf, source.as_bytes(), &prefix, &unit).ok()?;
    String::from_utf8(buf).ok()
}

fn trim_lines(lines: &mut [String]) {
    for line in lines {
        let trimmed = line.trim().to_string();
        *line = trimmed;
    }
}

fn pad_line(padding: usize, line: &str) -> String {
    let padded = format!("{}{line}", " ".repeat(padding));
    padded.trim_end_matches([' ', '\t']).to_string()
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

enum TableElement {
    Comment(String),
    Row(Vec<String>),
}

/// Render rows and interleaved comments. Cells holding standard
/// JSON are compacted; every cell is re-escaped so pipes, newlines,
/// and backslashes round-trip; columns align on the widest cell
/// measured in Unicode scalars.
fn table_lines(values: &[Token]) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut elements = Vec::new();

    for token in values {
        if token.kind == TokenKind::Comment {
            elements.push(TableElement::Comment(token.text.trim().to_string()));
        } else {
            let row: Vec<String> = token
                .items
                .iter()
                .map(|item| escape_cell(&compact_json_cell(&item.text)))
                .collect();
            rows.push(row.clone());
            elements.push(TableElement::Row(row));
        }
    }

    let widths = column_widths(&rows);
    elements
        .into_iter()
        .map(|element| match element {
            TableElement::Comment(text) => text,
            TableElement::Row(cells) => render_row(&cells, &widths),
        })
        .collect()
}

/// Compact a cell that contains standard JSON. Placeholder cells and
/// plain text pass through; compaction is textual so number
/// spellings and key order are preserved.
fn compact_json_cell(text: &str) -> String {
    if serde_json::from_str::<serde_json::Value>(text).is_err() {
        return text.to_string();
    }
    let mut buf = Vec::new();
    if relaxed_json::compact(&mut buf, text.as_bytes()).is_err() {
        return text.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| text.to_string())
}

/// The tokenizer resolved `\|`, `\\`, and `\n` while splitting
/// cells; reintroduce the escape sequences so the output parses to
/// the same cells.
fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('|', "\\|")
}

fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (column, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if column >= widths.len() {
                widths.push(width);
            } else if widths[column] < width {
                widths[column] = width;
            }
        }
    }
    widths
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (column, cell) in cells.iter().enumerate() {
        let width = widths.get(column).copied().unwrap_or(0);
        line.push_str("| ");
        line.push_str(cell);
        for _ in cell.chars().count()..width {
            line.push(' ');
        }
        line.push(' ');
    }
    line.push('|');
    line
}
