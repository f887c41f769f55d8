/// Kind of a raw Gherkin token. One token per source line; the kind
/// decides how the line's keyword, text, and items are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    FeatureLine,
    BackgroundLine,
    ScenarioLine,
    RuleLine,
    ExamplesLine,
    StepLine,
    TagLine,
    Comment,
    DocStringSeparator,
    TableRow,
    /// Description text, docstring content, or anything unmatched.
    Other,
    Empty,
    /// A `# language: xx` header.
    Language,
    Eof,
}

/// A sub-span of a line: one tag of a tag line or one cell of a
/// table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub keyword: String,
    pub text: String,
}

/// A raw token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Matched keyword. Step keywords keep their trailing space
    /// (`"Given "`, `"* "`); docstring separators hold the delimiter.
    pub keyword: String,
    pub text: String,
    pub items: Vec<LineItem>,
    /// One-based source line.
    pub line: usize,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub(crate) fn eof(line: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            keyword: String::new(),
            text: String::new(),
            items: Vec::new(),
            line,
        }
    }
}
