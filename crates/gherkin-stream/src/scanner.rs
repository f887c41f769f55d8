use crate::token::{LineItem, Token, TokenKind};

const TITLE_KEYWORDS: &[(&str, TokenKind)] = &[
    ("Feature", TokenKind::FeatureLine),
    ("Background", TokenKind::BackgroundLine),
    ("Rule", TokenKind::RuleLine),
    ("Scenario Outline", TokenKind::ScenarioLine),
    ("Scenario Template", TokenKind::ScenarioLine),
    ("Scenario", TokenKind::ScenarioLine),
    ("Example", TokenKind::ScenarioLine),
    ("Examples", TokenKind::ExamplesLine),
    ("Scenarios", TokenKind::ExamplesLine),
];

// Step keywords carry their trailing space; `{keyword}{text}` must
// reproduce the line.
const STEP_KEYWORDS: &[&str] = &["Given ", "When ", "Then ", "And ", "But ", "* "];

const DOCSTRING_DELIMITERS: &[&str] = &["\"\"\"", "```"];

pub(crate) struct ScanResult {
    pub tokens: Vec<Token>,
    /// Line number of a docstring separator left unclosed at EOF.
    pub open_docstring: Option<usize>,
    pub line_count: usize,
}

/// Tokenize normalized (`\n`-terminated, tab/space indented) content
/// into one raw token per line.
pub(crate) fn scan(content: &str) -> ScanResult {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if content.ends_with('\n') {
        lines.pop();
    }

    let mut tokens = Vec::with_capacity(lines.len());
    let mut docstring: Option<(&'static str, usize)> = None;

    for (idx, raw) in lines.iter().enumerate() {
        let line = idx + 1;
        let token = match docstring {
            Some((delimiter, _)) => {
                let tok = match_docstring_line(raw, delimiter, line);
                if tok.kind == TokenKind::DocStringSeparator {
                    docstring = None;
                }
                tok
            }
            None => {
                let tok = match_line(raw, line);
                if tok.kind == TokenKind::DocStringSeparator {
                    docstring = Some((delimiter_of(&tok.keyword), line));
                }
                tok
            }
        };
        tokens.push(token);
    }

    ScanResult {
        tokens,
        open_docstring: docstring.map(|(_, line)| line),
        line_count: lines.len(),
    }
}

fn delimiter_of(keyword: &str) -> &'static str {
    if keyword == "```" { "```" } else { "\"\"\"" }
}

/// Inside a docstring only the matching bare delimiter closes it;
/// every other line is content.
fn match_docstring_line(raw: &str, delimiter: &str, line: usize) -> Token {
    if raw.trim() == delimiter {
        return Token {
            kind: TokenKind::DocStringSeparator,
            keyword: delimiter.to_string(),
            text: String::new(),
            items: Vec::new(),
            line,
        };
    }
    other_token(raw, line)
}

fn match_line(raw: &str, line: usize) -> Token {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return simple_token(TokenKind::Empty, "", "", line);
    }
    if let Some(lang) = match_language(trimmed) {
        return simple_token(TokenKind::Language, "", lang, line);
    }
    if trimmed.starts_with('#') {
        return simple_token(TokenKind::Comment, "", raw, line);
    }
    if trimmed.starts_with('@') {
        return tag_token(trimmed, line);
    }
    for (keyword, kind) in TITLE_KEYWORDS {
        if let Some(rest) = trimmed.strip_prefix(keyword).and_then(|r| r.strip_prefix(':')) {
            return simple_token(*kind, *keyword, rest.trim(), line);
        }
    }
    for keyword in STEP_KEYWORDS {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            return simple_token(TokenKind::StepLine, *keyword, rest.trim(), line);
        }
    }
    for delimiter in DOCSTRING_DELIMITERS {
        if let Some(rest) = trimmed.strip_prefix(delimiter) {
            return simple_token(TokenKind::DocStringSeparator, *delimiter, rest.trim(), line);
        }
    }
    if trimmed.starts_with('|') {
        return Token {
            kind: TokenKind::TableRow,
            keyword: String::new(),
            text: String::new(),
            items: table_cells(trimmed),
            line,
        };
    }
    other_token(raw, line)
}

fn simple_token(kind: TokenKind, keyword: &str, text: &str, line: usize) -> Token {
    Token {
        kind,
        keyword: keyword.to_string(),
        text: text.to_string(),
        items: Vec::new(),
        line,
    }
}

fn other_token(raw: &str, line: usize) -> Token {
    simple_token(TokenKind::Other, "", raw, line)
}

/// `# language: xx` header.
fn match_language(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("language")?.trim_start();
    let lang = rest.strip_prefix(':')?.trim();
    if lang.is_empty() { None } else { Some(lang) }
}

fn tag_token(trimmed: &str, line: usize) -> Token {
    let items = trimmed
        .split_whitespace()
        .map(|tag| LineItem {
            keyword: "@".to_string(),
            text: tag.to_string(),
        })
        .collect();
    Token {
        kind: TokenKind::TagLine,
        keyword: String::new(),
        text: String::new(),
        items,
        line,
    }
}

/// Split a `|`-delimited row into cells, resolving the cell escapes
/// `\|`, `\\`, and `\n`. Text after the final pipe is ignored.
fn table_cells(trimmed: &str) -> Vec<LineItem> {
    let mut cells = Vec::new();
    let Some(rest) = trimmed.strip_prefix('|') else {
        return cells;
    };

    let mut cell = String::new();
    let mut chars = rest.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => cell.push('\n'),
                Some('\\') => cell.push('\\'),
                Some('|') => cell.push('|'),
                Some(unknown) => {
                    cell.push('\\');
                    cell.push(unknown);
                }
                None => cell.push('\\'),
            },
            '|' => {
                cells.push(LineItem {
                    keyword: String::new(),
                    text: cell.trim().to_string(),
                });
                cell.clear();
            }
            _ => cell.push(ch),
        }
    }
    cells
}
