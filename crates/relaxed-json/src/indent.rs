use crate::scanner::{Class, Scanner, SyntaxError};

// Growth factor for the output of indenting. Observed expansion for
// compact input with small indents stays below 2x, and a factor of 2
// keeps wasted space under 50%.
const INDENT_GROWTH_FACTOR: usize = 2;

fn append_newline(dst: &mut Vec<u8>, prefix: &str, indent: &str, depth: usize) {
    dst.push(b'\n');
    dst.extend_from_slice(prefix.as_bytes());
    for _ in 0..depth {
        dst.extend_from_slice(indent.as_bytes());
    }
}

/// Append an indented form of `src` to `dst`.
///
/// Each element of an object or array begins on a new line starting
/// with `prefix` followed by one copy of `indent` per nesting level.
/// The appended data does not begin with the prefix or any
/// indentation, so it can be embedded in other formatted output.
/// Leading whitespace in `src` is dropped; trailing whitespace is
/// preserved. A value following another value without a comma (the
/// placeholder relaxation) starts its own line as if the comma were
/// present.
///
/// # Errors
///
/// On a syntax error `dst` is restored to its length before the call
/// and the error is returned.
pub fn indent(dst: &mut Vec<u8>, src: &[u8], prefix: &str, indent: &str) -> Result<(), SyntaxError> {
    let orig_len = dst.len();
    dst.reserve(INDENT_GROWTH_FACTOR * src.len());

    let mut scan = Scanner::new();
    let mut need_indent = false;
    let mut depth = 0usize;

    for &c in src {
        let v = scan.step(c);
        if v == Class::SkipSpace {
            continue;
        }
        if v == Class::Error {
            break;
        }
        if need_indent && v != Class::EndObject && v != Class::EndArray {
            need_indent = false;
            depth += 1;
            append_newline(dst, prefix, indent, depth);
        }

        // Semantically uninteresting bytes (punctuation inside
        // strings and placeholders included) pass through unchanged.
        if v == Class::Continue {
            dst.push(c);
            continue;
        }
        if v == Class::ContinueAfterMissingComma {
            append_newline(dst, prefix, indent, depth);
            dst.push(c);
            continue;
        }

        match c {
            b'{' | b'[' => {
                // Delay the newline so empty composites render as
                // `{}` and `[]`.
                need_indent = true;
                dst.push(c);
            }
            b',' => {
                dst.push(c);
                append_newline(dst, prefix, indent, depth);
            }
            b':' => {
                dst.push(c);
                dst.push(b' ');
            }
            b'}' | b']' => {
                if need_indent {
                    // Suppress the indent inside an empty composite.
                    need_indent = false;
                } else {
                    depth = depth.saturating_sub(1);
                    append_newline(dst, prefix, indent, depth);
                }
                dst.push(c);
            }
            _ => dst.push(c),
        }
    }

    if scan.end_of_input() == Class::Error {
        dst.truncate(orig_len);
        return Err(scan.take_error().unwrap_or(SyntaxError {
            msg: "scanner error".to_string(),
            offset: 0,
        }));
    }
    Ok(())
}

/// Append `src` to `dst` with insignificant whitespace removed.
///
/// Purely textual: literals, numbers, and key order are copied
/// byte-for-byte, so `1e2` stays `1e2`.
///
/// # Errors
///
/// On a syntax error `dst` is restored to its length before the call
/// and the error is returned.
pub fn compact(dst: &mut Vec<u8>, src: &[u8]) -> Result<(), SyntaxError> {
    let orig_len = dst.len();
    let mut scan = Scanner::new();

    for &c in src {
        match scan.step(c) {
            Class::SkipSpace => {}
            Class::Error => break,
            _ => dst.push(c),
        }
    }

    if scan.end_of_input() == Class::Error {
        dst.truncate(orig_len);
        return Err(scan.take_error().unwrap_or(SyntaxError {
            msg: "scanner error".to_string(),
            offset: 0,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn indent4(src: &str) -> String {
        let mut buf = Vec::new();
        indent(&mut buf, src.as_bytes(), "", "    ").expect("valid input");
        String::from_utf8(buf).expect("indenter output is UTF-8")
    }

    #[test]
    fn scalars_and_empty_composites_stay_on_one_line() {
        assert_eq!(indent4("1"), "1");
        assert_eq!(indent4("{}"), "{}");
        assert_eq!(indent4("[]"), "[]");
    }

    #[test]
    fn objects_and_arrays_break_per_element() {
        assert_eq!(indent4(r#"{"":2}"#), "{\n    \"\": 2\n}");
        assert_eq!(indent4("[3]"), "[\n    3\n]");
        assert_eq!(indent4("[1,2,3]"), "[\n    1,\n    2,\n    3\n]");
        assert_eq!(indent4(r#"{"x":1}"#), "{\n    \"x\": 1\n}");
    }

    #[test]
    fn literals_survive_byte_for_byte() {
        assert_eq!(
            indent4(r#"[true,false,null,"x",1,1.5,0,-5e+2]"#),
            "[\n    true,\n    false,\n    null,\n    \"x\",\n    1,\n    1.5,\n    0,\n    -5e+2\n]"
        );
    }

    #[test]
    fn placeholders_indent_like_values() {
        assert_eq!(
            indent4(r#"{"x":1, "y":<any>, <p1>,<p2>,"z":{<p3>,<p4>,"key": <p5>}}"#),
            r#"{
    "x": 1,
    "y": <any>,
    <p1>,
    <p2>,
    "z": {
        <p3>,
        <p4>,
        "key": <p5>
    }
}"#
        );
    }

    #[test]
    fn missing_comma_breaks_the_line() {
        assert_eq!(
            indent4("{<p1><p2>}"),
            "{\n    <p1>\n    <p2>\n}"
        );
        assert_eq!(
            indent4("[<p1><p2>]"),
            "[\n    <p1>\n    <p2>\n]"
        );
    }

    #[test]
    fn non_ascii_string_content_passes_through() {
        assert_eq!(
            indent4("{\"\":\"<>&\u{2028}\u{2029}\"}"),
            "{\n    \"\": \"<>&\u{2028}\u{2029}\"\n}"
        );
    }

    #[test]
    fn prefix_is_emitted_on_every_new_line_but_not_the_first() {
        let mut buf = Vec::new();
        indent(&mut buf, b"[1,2]", ">>", " ").expect("valid input");
        assert_eq!(String::from_utf8(buf).expect("utf-8"), "[\n>> 1,\n>> 2\n>>]");
    }

    #[test]
    fn leading_space_dropped_trailing_space_preserved() {
        assert_eq!(indent4("  {} \n"), "{} \n");
    }

    #[test]
    fn error_rewinds_the_buffer() {
        let mut buf = b"keep:".to_vec();
        let err = indent(&mut buf, br#"{"X": "foo", "Y"}"#, "", "  ").unwrap_err();
        assert_eq!(buf, b"keep:");
        assert_eq!(err.msg, "invalid character '}' after object key");
        assert_eq!(err.offset, 17);
    }

    #[test]
    fn compact_strips_insignificant_whitespace_only() {
        let mut buf = Vec::new();
        compact(&mut buf, br#"{"key1": "value2",    "key2": "value2"}"#).expect("valid input");
        assert_eq!(buf, br#"{"key1":"value2","key2":"value2"}"#);

        buf.clear();
        compact(&mut buf, b"[1,    2,   3]").expect("valid input");
        assert_eq!(buf, b"[1,2,3]");

        buf.clear();
        compact(&mut buf, br#"{"a": "spaces  stay  inside strings"}"#).expect("valid input");
        assert_eq!(buf, br#"{"a":"spaces  stay  inside strings"}"#);
    }

    #[test]
    fn compact_preserves_number_spelling() {
        let mut buf = Vec::new();
        compact(&mut buf, b"[1e2, -0.50, 1E+1]").expect("valid input");
        assert_eq!(buf, b"[1e2,-0.50,1E+1]");
    }
}
