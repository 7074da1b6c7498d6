//! Rich-text question markup rendered as terminal text.

/// Converts the inline HTML of questions and choices to plain lines.
pub fn plain_text(html: &str) -> String {
    if !html.contains(['<', '&']) {
        return html.trim().to_string();
    }

    let markdown = html2md::parse_html(html);
    let text = unescape_markdown(&markdown);

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// Drops the backslashes html2md puts before markdown punctuation; code
// questions are full of `*` and `_`.
fn unescape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(*next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(plain_text("  int *p = 0;  "), "int *p = 0;");
    }

    #[test]
    fn test_plain_text_strips_markup() {
        let text = plain_text("다음 중 <b>옳은</b> 것은?");
        assert!(text.contains("옳은"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn test_unescape_markdown() {
        assert_eq!(unescape_markdown(r"a\_b \* c"), "a_b * c");
        assert_eq!(unescape_markdown(r"C:\dir"), r"C:\dir");
    }
}
