//! HTML encoding of dynamic text.
//!
//! Every piece of user-supplied or externally sourced text must pass through
//! [`escape_html`] before it is interpolated into a response body or a
//! double-quoted attribute value. Skipping it is a reflected content
//! injection defect, not a cosmetic one.

/// Escape the five HTML-special characters.
///
/// - `"` → `&quot;`
/// - `'` → `&#x27;` (numeric form instead of `&apos;` for legacy-browser
///   attribute compatibility)
/// - `<` → `&lt;`
/// - `>` → `&gt;`
/// - `&` → `&amp;`
///
/// No other transformation is applied.
pub fn escape_html(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&#x27;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '&' => buf.push_str("&amp;"),
            c => buf.push(c),
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_html("MYCAR01 is parked"), "MYCAR01 is parked");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escape_output_has_no_literal_specials() {
        let hostile = r#"a"b'c<d>e&f"#;
        let escaped = escape_html(hostile);
        for ch in ['"', '\'', '<', '>'] {
            assert!(!escaped.contains(ch), "literal {:?} left in output", ch);
        }
        // '&' may only appear as the start of an entity we emitted
        for (i, _) in escaped.match_indices('&') {
            let rest = &escaped[i..];
            assert!(
                ["&quot;", "&#x27;", "&lt;", "&gt;", "&amp;"]
                    .iter()
                    .any(|e| rest.starts_with(e)),
                "stray & in output"
            );
        }
    }

    #[test]
    fn test_escape_round_trips() {
        let original = r#"<samp class="monitor">O'Hare & Co</samp>"#;
        let unescaped = escape_html(original)
            .replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        assert_eq!(unescaped, original);
    }

    #[test]
    fn test_escape_preserves_multibyte() {
        assert_eq!(escape_html("…repeat <ß>"), "…repeat &lt;ß&gt;");
    }
}
