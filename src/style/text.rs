//! Text adaptation for grid cells: HTML escaping and visible hidden characters.

/// CSS class wrapping visualized whitespace and line breaks.
pub const HIDDEN_CHARS_CLASS: &str = "hiddenChars";

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_edge_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn visible_whitespace(run: &str) -> String {
    let marks: String = run
        .chars()
        .map(|c| if c == '\t' { '→' } else { '·' })
        .collect();
    format!(r#"<span class="{HIDDEN_CHARS_CLASS}">{marks}</span>"#)
}

/// Adapt raw cell text for safe, readable display in a single grid line.
///
/// Leading and trailing spaces/tabs become visible marks, line breaks become
/// a return mark followed by `<br>`, and everything else is escaped.
pub fn adapt_to_grid(text: &str) -> String {
    let body_start = text.find(|c| !is_edge_whitespace(c)).unwrap_or(text.len());
    let (leading, rest) = text.split_at(body_start);
    let body_end = rest
        .char_indices()
        .rev()
        .find(|(_, c)| !is_edge_whitespace(*c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let (body, trailing) = rest.split_at(body_end);

    let mut out = String::with_capacity(text.len() + 16);
    if !leading.is_empty() {
        out.push_str(&visible_whitespace(leading));
    }
    let mut lines = body.split('\n').peekable();
    while let Some(line) = lines.next() {
        out.push_str(&escape_html(line.strip_suffix('\r').unwrap_or(line)));
        if lines.peek().is_some() {
            out.push_str(&format!(r#"<span class="{HIDDEN_CHARS_CLASS}">↵</span><br>"#));
        }
    }
    if !trailing.is_empty() {
        out.push_str(&visible_whitespace(trailing));
    }
    out
}

/// Escape tooltip content, keeping line breaks.
pub fn tooltip_html(text: &str) -> String {
    text.split('\n')
        .map(|line| escape_html(line.strip_suffix('\r').unwrap_or(line)))
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(adapt_to_grid("tata"), "tata");
        assert_eq!(adapt_to_grid(""), "");
    }

    #[test]
    fn test_edge_whitespace_visualized() {
        assert_eq!(
            adapt_to_grid("  a b\t"),
            r#"<span class="hiddenChars">··</span>a b<span class="hiddenChars">→</span>"#
        );
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(adapt_to_grid("   "), r#"<span class="hiddenChars">···</span>"#);
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            adapt_to_grid("a\r\nb"),
            r#"a<span class="hiddenChars">↵</span><br>b"#
        );
    }

    #[test]
    fn test_multibyte_trailing_boundary() {
        assert_eq!(
            adapt_to_grid("é "),
            r#"é<span class="hiddenChars">·</span>"#
        );
    }

    #[test]
    fn test_tooltip_html() {
        assert_eq!(tooltip_html("a<b\nc"), "a&lt;b<br>c");
    }
}
