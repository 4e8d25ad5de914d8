use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

/// Compact JSON formatter that also escapes `<`, `>`, `&`, U+2028 and U+2029.
///
/// The escaped output is still valid JSON, but can be embedded inside an HTML `<script>` element
/// without the data being able to terminate the element or break a JavaScript string literal.
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escape = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escape.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serializes `value` as compact JSON text that is safe to embed in an HTML `<script>` element.
pub(crate) fn to_html_safe_string<T>(value: &T) -> serde_json::Result<String>
where
    T: ?Sized + Serialize,
{
    let mut writer = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, HtmlSafeFormatter);
    value.serialize(&mut ser)?;
    String::from_utf8(writer).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use test_case::test_case;

    #[test_case("plain", r#""plain""#; "plain text")]
    #[test_case("</script>", r#""\u003c/script\u003e""#; "closing script tag")]
    #[test_case("a & b", r#""a \u0026 b""#; "ampersand")]
    #[test_case("line\u{2028}para\u{2029}", r#""line\u2028para\u2029""#; "line and paragraph separators")]
    #[test_case("quote \" and \\", r#""quote \" and \\""#; "regular escapes")]
    #[test_case("\u{fc}n\u{ef}c\u{f6}d\u{e9}", "\"\u{fc}n\u{ef}c\u{f6}d\u{e9}\""; "other non ascii")]
    fn escapes_html_sensitive_characters(input: &str, expected: &str) {
        assert_eq!(to_html_safe_string(input).unwrap(), expected);
    }

    #[test]
    fn output_is_compact_and_parses_back() {
        let value = btreemap! {
            "<b>" => vec![Some(1), None],
            "a" => vec![],
        };
        let json = to_html_safe_string(&value).unwrap();
        assert_eq!(json, r#"{"\u003cb\u003e":[1,null],"a":[]}"#);

        let parsed: std::collections::BTreeMap<String, Vec<Option<i32>>> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["<b>"], vec![Some(1), None]);
    }
}
