use core::fmt::Write;

/// Per-byte classification produced by [`Scanner::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Uninteresting byte; copy through.
    Continue,
    /// First byte of a string, number, `true`, `false`, or `null`.
    BeginLiteral,
    BeginObject,
    /// Just finished an object key (the byte is the `:`).
    ObjectKey,
    /// Just finished a non-final object value (the byte is the `,`).
    ObjectValue,
    EndObject,
    BeginArray,
    /// Just finished a non-final array value (the byte is the `,`).
    ArrayValue,
    EndArray,
    /// Insignificant whitespace; may be dropped.
    SkipSpace,
    /// The `<` opening a placeholder value.
    BeginPlaceholder,
    /// The `>` closing the outermost placeholder.
    EndPlaceholder,
    /// A `"` or `<` starting the next element where a comma was
    /// expected; parsing continues as if the comma were present.
    ContinueAfterMissingComma,
    /// The top-level value ended before this byte.
    End,
    /// Syntax error; see [`Scanner::take_error`].
    Error,
}

/// A JSON syntax error with a one-based byte offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{msg}")]
pub struct SyntaxError {
    pub msg: String,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    ObjectKey,
    ObjectValue,
    ArrayValue,
}

/// Scanner states. One variant per position in the grammar; literal
/// keywords are walked with a cursor into the expected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    BeginValue,
    BeginValueOrEmpty,
    BeginStringOrEmpty,
    InString,
    InStringEsc,
    InStringEscU(u8),
    InPlaceholder,
    InLiteral { want: &'static str, pos: usize },
    Neg,
    Zero,
    One,
    Dot,
    Dot0,
    Exp,
    ExpSign,
    Exp0,
    EndValue,
    EndTop,
    Failed,
}

// Permitted by RFC 7159 §9; prevents unbounded stack growth on
// deeply nested input.
const MAX_NESTING_DEPTH: usize = 10_000;

// Residual-memory cap applied on reset after a pathological scan.
const MAX_RETAINED_DEPTH: usize = 1024;

/// Reports whether `data` is a complete value of the relaxed grammar.
pub fn valid(data: &[u8]) -> bool {
    let mut scan = Scanner::new();
    scan.check_valid(data).is_ok()
}

/// Byte-driven state machine over the relaxed JSON grammar.
///
/// Call [`Scanner::step`] for every input byte and
/// [`Scanner::end_of_input`] once afterwards. The scanner is
/// reusable across inputs via [`Scanner::reset`].
#[derive(Debug)]
pub struct Scanner {
    step: Step,
    end_top: bool,
    parse_state: Vec<ParseState>,
    placeholder_stack: Vec<u8>,
    bytes: u64,
    err: Option<SyntaxError>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            step: Step::BeginValue,
            end_top: false,
            parse_state: Vec::new(),
            placeholder_stack: Vec::new(),
            bytes: 0,
            err: None,
        }
    }

    /// Prepare the scanner for a fresh input.
    pub fn reset(&mut self) {
        if self.parse_state.capacity() > MAX_RETAINED_DEPTH {
            self.parse_state = Vec::new();
        } else {
            self.parse_state.clear();
        }
        self.placeholder_stack.clear();
        self.step = Step::BeginValue;
        self.end_top = false;
        self.bytes = 0;
        self.err = None;
    }

    /// Consume one byte and classify it.
    pub fn step(&mut self, c: u8) -> Class {
        self.bytes += 1;
        self.dispatch(c)
    }

    /// Signal end of input. Returns [`Class::End`] for a complete
    /// value, [`Class::Error`] otherwise.
    pub fn end_of_input(&mut self) -> Class {
        if self.err.is_some() {
            return Class::Error;
        }
        if self.end_top {
            return Class::End;
        }
        // A trailing space flushes any literal still in progress
        // (numbers have no terminator of their own).
        self.dispatch(b' ');
        if self.end_top {
            return Class::End;
        }
        if self.err.is_none() {
            self.err = Some(SyntaxError {
                msg: "unexpected end of JSON input".to_string(),
                offset: self.bytes,
            });
        }
        Class::Error
    }

    /// The recorded syntax error, if any.
    pub fn take_error(&mut self) -> Option<SyntaxError> {
        self.err.take()
    }

    pub(crate) fn check_valid(&mut self, data: &[u8]) -> Result<(), SyntaxError> {
        self.reset();
        for &c in data {
            if self.step(c) == Class::Error {
                return Err(self.err.take().unwrap_or_else(missing_error));
            }
        }
        if self.end_of_input() == Class::Error {
            return Err(self.err.take().unwrap_or_else(missing_error));
        }
        Ok(())
    }

    fn dispatch(&mut self, c: u8) -> Class {
        match self.step {
            Step::BeginValue => self.begin_value(c),
            Step::BeginValueOrEmpty => self.begin_value_or_empty(c),
            Step::BeginStringOrEmpty => self.begin_string_or_empty(c),
            Step::InString => self.in_string(c),
            Step::InStringEsc => self.in_string_esc(c),
            Step::InStringEscU(seen) => self.in_string_esc_u(c, seen),
            Step::InPlaceholder => self.in_placeholder(c),
            Step::InLiteral { want, pos } => self.in_literal(c, want, pos),
            Step::Neg => self.neg(c),
            Step::Zero => self.zero(c),
            Step::One => self.one(c),
            Step::Dot => self.dot(c),
            Step::Dot0 => self.dot0(c),
            Step::Exp => self.exp(c),
            Step::ExpSign => self.exp_sign(c),
            Step::Exp0 => self.exp0(c),
            Step::EndValue => self.end_value(c),
            Step::EndTop => self.end_top_state(c),
            Step::Failed => Class::Error,
        }
    }

    fn push_parse_state(&mut self, c: u8, state: ParseState, success: Class) -> Class {
        self.parse_state.push(state);
        if self.parse_state.len() <= MAX_NESTING_DEPTH {
            success
        } else {
            self.error(c, "exceeded max JSON depth")
        }
    }

    fn pop_parse_state(&mut self) {
        self.parse_state.pop();
        if self.parse_state.is_empty() {
            self.step = Step::EndTop;
            self.end_top = true;
        } else {
            self.step = Step::EndValue;
        }
    }

    /// State at the beginning of the input or of any value position.
    fn begin_value(&mut self, c: u8) -> Class {
        if is_space(c) {
            return Class::SkipSpace;
        }
        match c {
            b'{' => {
                self.step = Step::BeginStringOrEmpty;
                self.push_parse_state(c, ParseState::ObjectKey, Class::BeginObject)
            }
            b'[' => {
                self.step = Step::BeginValueOrEmpty;
                self.push_parse_state(c, ParseState::ArrayValue, Class::BeginArray)
            }
            b'"' => {
                self.step = Step::InString;
                Class::BeginLiteral
            }
            b'-' => {
                self.step = Step::Neg;
                Class::BeginLiteral
            }
            b'0' => {
                self.step = Step::Zero;
                Class::BeginLiteral
            }
            b'1'..=b'9' => {
                self.step = Step::One;
                Class::BeginLiteral
            }
            b't' => {
                self.step = Step::InLiteral { want: "true", pos: 1 };
                Class::BeginLiteral
            }
            b'f' => {
                self.step = Step::InLiteral { want: "false", pos: 1 };
                Class::BeginLiteral
            }
            b'n' => {
                self.step = Step::InLiteral { want: "null", pos: 1 };
                Class::BeginLiteral
            }
            b'<' => {
                self.step = Step::InPlaceholder;
                self.placeholder_stack.push(c);
                Class::BeginPlaceholder
            }
            _ => self.error(c, "looking for beginning of value"),
        }
    }

    /// State after reading `[`.
    fn begin_value_or_empty(&mut self, c: u8) -> Class {
        if is_space(c) {
            return Class::SkipSpace;
        }
        if c == b']' {
            return self.end_value(c);
        }
        self.begin_value(c)
    }

    /// State after reading `{`.
    fn begin_string_or_empty(&mut self, c: u8) -> Class {
        if is_space(c) {
            return Class::SkipSpace;
        }
        if c == b'}' {
            if let Some(last) = self.parse_state.last_mut() {
                *last = ParseState::ObjectValue;
            }
            return self.end_value(c);
        }
        self.begin_string_or_placeholder(c)
    }

    /// Key position: after `{` or after `{"key": value,`.
    fn begin_string_or_placeholder(&mut self, c: u8) -> Class {
        if is_space(c) {
            return Class::SkipSpace;
        }
        match c {
            b'"' => {
                self.step = Step::InString;
                Class::BeginLiteral
            }
            b'<' => {
                self.step = Step::InPlaceholder;
                self.placeholder_stack.push(c);
                Class::BeginPlaceholder
            }
            _ => self.error(c, "looking for beginning of object key string or placeholder"),
        }
    }

    /// Inside `<...>`. Nested `<` pushes; the matching `>` of the
    /// outermost pair completes the placeholder as a value.
    fn in_placeholder(&mut self, c: u8) -> Class {
        match c {
            b'>' => {
                if self.placeholder_stack.pop().is_none() {
                    return self.error(c, "invalid placeholder");
                }
                if !self.placeholder_stack.is_empty() {
                    return Class::Continue;
                }
                if self.parse_state.is_empty() {
                    // Completed top-level before the current byte.
                    self.step = Step::EndTop;
                    self.end_top = true;
                    return self.end_top_state(c);
                }
                // A placeholder standing where a key was expected
                // (`{<p>, ...}`) counts as a finished key:value pair.
                if self.parse_state.last() == Some(&ParseState::ObjectKey)
                    && let Some(last) = self.parse_state.last_mut()
                {
                    *last = ParseState::ObjectValue;
                }
                self.step = Step::EndValue;
                Class::EndPlaceholder
            }
            b'<' => {
                self.placeholder_stack.push(c);
                Class::Continue
            }
            _ => Class::Continue,
        }
    }

    /// State after completing a value.
    fn end_value(&mut self, c: u8) -> Class {
        if self.parse_state.is_empty() {
            // Completed top-level before the current byte.
            self.step = Step::EndTop;
            self.end_top = true;
            return self.end_top_state(c);
        }
        if is_space(c) {
            self.step = Step::EndValue;
            return Class::SkipSpace;
        }
        match self.parse_state[self.parse_state.len() - 1] {
            ParseState::ObjectKey => {
                if c == b':' {
                    let last = self.parse_state.len() - 1;
                    self.parse_state[last] = ParseState::ObjectValue;
                    self.step = Step::BeginValue;
                    return Class::ObjectKey;
                }
                self.error(c, "after object key")
            }
            ParseState::ObjectValue => {
                if c == b',' {
                    let last = self.parse_state.len() - 1;
                    self.parse_state[last] = ParseState::ObjectKey;
                    self.step = Step::BeginValue;
                    return Class::ObjectValue;
                }
                if c == b'}' {
                    self.pop_parse_state();
                    return Class::EndObject;
                }
                // `{<p>"key": ...}` or `{<p><q>}`: no comma after the
                // previous element; the next key or placeholder starts
                // directly.
                if c == b'"' || c == b'<' {
                    let last = self.parse_state.len() - 1;
                    self.parse_state[last] = ParseState::ObjectKey;
                    return self.continue_after_missing_comma(c);
                }
                self.error(c, "after object key:value pair or placeholder")
            }
            ParseState::ArrayValue => {
                if c == b',' {
                    self.step = Step::BeginValue;
                    return Class::ArrayValue;
                }
                if c == b'<' {
                    return self.continue_after_missing_comma(c);
                }
                if c == b']' {
                    self.pop_parse_state();
                    return Class::EndArray;
                }
                self.error(c, "after array element")
            }
        }
    }

    fn continue_after_missing_comma(&mut self, c: u8) -> Class {
        match c {
            b'"' => {
                self.step = Step::InString;
                Class::ContinueAfterMissingComma
            }
            b'<' => {
                self.step = Step::InPlaceholder;
                self.placeholder_stack.push(c);
                Class::ContinueAfterMissingComma
            }
            _ => Class::Continue,
        }
    }

    /// State after the top-level value; only whitespace may follow.
    fn end_top_state(&mut self, c: u8) -> Class {
        if !is_space(c) {
            // Complain about the non-space byte on the next call.
            self.error(c, "after top-level value");
        }
        Class::End
    }

    fn in_string(&mut self, c: u8) -> Class {
        match c {
            b'"' => {
                self.step = Step::EndValue;
                Class::Continue
            }
            b'\\' => {
                self.step = Step::InStringEsc;
                Class::Continue
            }
            _ if c < 0x20 => self.error(c, "in string literal"),
            _ => Class::Continue,
        }
    }

    fn in_string_esc(&mut self, c: u8) -> Class {
        match c {
            b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'/' | b'"' => {
                self.step = Step::InString;
                Class::Continue
            }
            b'u' => {
                self.step = Step::InStringEscU(0);
                Class::Continue
            }
            _ => self.error(c, "in string escape code"),
        }
    }

    fn in_string_esc_u(&mut self, c: u8, seen: u8) -> Class {
        if c.is_ascii_hexdigit() {
            self.step = if seen == 3 {
                Step::InString
            } else {
                Step::InStringEscU(seen + 1)
            };
            return Class::Continue;
        }
        self.error(c, "in \\u hexadecimal character escape")
    }

    fn in_literal(&mut self, c: u8, want: &'static str, pos: usize) -> Class {
        let expect = want.as_bytes()[pos];
        if c != expect {
            return self.error(
                c,
                &format!("in literal {want} (expecting '{}')", expect as char),
            );
        }
        self.step = if pos + 1 == want.len() {
            Step::EndValue
        } else {
            Step::InLiteral { want, pos: pos + 1 }
        };
        Class::Continue
    }

    /// After `-`.
    fn neg(&mut self, c: u8) -> Class {
        match c {
            b'0' => {
                self.step = Step::Zero;
                Class::Continue
            }
            b'1'..=b'9' => {
                self.step = Step::One;
                Class::Continue
            }
            _ => self.error(c, "in numeric literal"),
        }
    }

    /// After a leading non-zero digit, e.g. `1` or `100`.
    fn one(&mut self, c: u8) -> Class {
        if c.is_ascii_digit() {
            self.step = Step::One;
            return Class::Continue;
        }
        self.zero(c)
    }

    /// After `0` or a completed integer part.
    fn zero(&mut self, c: u8) -> Class {
        match c {
            b'.' => {
                self.step = Step::Dot;
                Class::Continue
            }
            b'e' | b'E' => {
                self.step = Step::Exp;
                Class::Continue
            }
            _ => self.end_value(c),
        }
    }

    /// After the decimal point, e.g. `1.`.
    fn dot(&mut self, c: u8) -> Class {
        if c.is_ascii_digit() {
            self.step = Step::Dot0;
            return Class::Continue;
        }
        self.error(c, "after decimal point in numeric literal")
    }

    /// After decimal digits, e.g. `3.14`.
    fn dot0(&mut self, c: u8) -> Class {
        if c.is_ascii_digit() {
            return Class::Continue;
        }
        if c == b'e' || c == b'E' {
            self.step = Step::Exp;
            return Class::Continue;
        }
        self.end_value(c)
    }

    /// After the `e`, e.g. `314e`.
    fn exp(&mut self, c: u8) -> Class {
        if c == b'+' || c == b'-' {
            self.step = Step::ExpSign;
            return Class::Continue;
        }
        self.exp_sign(c)
    }

    /// After the exponent sign, e.g. `314e-`.
    fn exp_sign(&mut self, c: u8) -> Class {
        if c.is_ascii_digit() {
            self.step = Step::Exp0;
            return Class::Continue;
        }
        self.error(c, "in exponent of numeric literal")
    }

    /// After at least one exponent digit, e.g. `314e-2`.
    fn exp0(&mut self, c: u8) -> Class {
        if c.is_ascii_digit() {
            return Class::Continue;
        }
        self.end_value(c)
    }

    fn error(&mut self, c: u8, context: &str) -> Class {
        self.step = Step::Failed;
        self.err = Some(SyntaxError {
            msg: format!("invalid character {} {context}", quote_char(c)),
            offset: self.bytes,
        });
        Class::Error
    }
}

fn missing_error() -> SyntaxError {
    SyntaxError {
        msg: "scanner error".to_string(),
        offset: 0,
    }
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

/// Format `c` as a quoted character literal for error messages.
fn quote_char(c: u8) -> String {
    match c {
        b'\'' => r"'\''".to_string(),
        b'"' => "'\"'".to_string(),
        b'\n' => r"'\n'".to_string(),
        b'\r' => r"'\r'".to_string(),
        b'\t' => r"'\t'".to_string(),
        0x20..=0x7e => format!("'{}'", c as char),
        0x00..=0x1f => format!("'\\x{c:02x}'"),
        _ => {
            let mut s = String::new();
            let _ = write!(s, "'\\u{:04x}'", u32::from(c));
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bare_words_and_unbalanced_composites() {
        assert!(!valid(b"foo"));
        assert!(!valid(b"}{"));
        assert!(!valid(b"{]"));
        assert!(!valid(b"[1}"));
        assert!(!valid(b"5.1.2"));
    }

    #[test]
    fn accepts_standard_json() {
        assert!(valid(b"{}"));
        assert!(valid(b"[]"));
        assert!(valid(b"1"));
        assert!(valid(b"-5e+2"));
        assert!(valid(b"true"));
        assert!(valid(b"null"));
        assert!(valid(b"\"x\""));
        assert!(valid(br#"{"foo":"bar"}"#));
        assert!(valid(br#"{"foo":"bar","bar":{"baz":["qux"]}}"#));
        assert!(valid(b" [1, 2.5, 3e-1] "));
    }

    #[test]
    fn accepts_placeholders_inside_composites() {
        assert!(valid(b"[<id>]"));
        assert!(valid(b"{<p>}"));
        assert!(valid(br#"{"key": <value>}"#));
        assert!(valid(br#"{<p1>, <p2>, "z": {<p3>, "key": <p5>}}"#));
    }

    #[test]
    fn accepts_nested_placeholders() {
        assert!(valid(b"[<outer<inner>tail>]"));
        assert!(valid(b"[<a<b<c>>>]"));
        assert!(!valid(b"[<a<b>]"));
    }

    #[test]
    fn bare_top_level_placeholder_is_rejected() {
        // The closing `>` lands in the end-of-top state, which only
        // admits whitespace.
        assert!(!valid(b"<any>"));
    }

    #[test]
    fn unmatched_closing_angle_is_an_error() {
        assert!(!valid(b"[>]"));
        assert!(!valid(b">"));
    }

    #[test]
    fn accepts_missing_comma_before_placeholder() {
        assert!(valid(br#"{<p1><p2>}"#));
        assert!(valid(br#"{<p1>"key": 1}"#));
        assert!(valid(b"[<p1><p2>]"));
        assert!(valid(br#"[1, <p1><p2>, 2]"#));
    }

    #[test]
    fn missing_comma_between_plain_values_still_fails_in_arrays() {
        assert!(!valid(b"[1 2]"));
        assert!(!valid(br#"["a" "b"]"#));
    }

    #[test]
    fn string_escapes() {
        assert!(valid(br#""a\"b\\c\/\b\f\n\r\t""#));
        assert!(valid(b"\"A\xeb\xbb\xaf\""));
        assert!(!valid(br#""\q""#));
        assert!(!valid(br#""\u00g0""#));
        assert!(!valid(b"\"a\x01b\""));
    }

    #[test]
    fn error_offsets_are_one_based() {
        let mut scan = Scanner::new();
        let err = scan.check_valid(br#"{"X": "foo", "Y"}"#).unwrap_err();
        assert_eq!(err.offset, 17);
        assert_eq!(err.msg, "invalid character '}' after object key");
    }

    #[test]
    fn truncated_input_reports_unexpected_end() {
        let mut scan = Scanner::new();
        let err = scan.check_valid(br#"{"open": ["#).unwrap_err();
        assert_eq!(err.msg, "unexpected end of JSON input");
    }

    #[test]
    fn scanner_is_reusable_after_reset() {
        let mut scan = Scanner::new();
        assert!(scan.check_valid(b"garbage").is_err());
        assert!(scan.check_valid(b"{}").is_ok());
    }
}
