//! Pure text helpers: duplicate-detection normalization, HTML stripping,
//! truncation

/// Punctuation removed during normalization, straight and typographic.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '-', '–', '—', '"', '\'', '“', '”', '‘', '’',
];

/// Canonicalize a title for duplicate comparison.
///
/// Lowercases, removes the fixed punctuation set, then collapses whitespace
/// runs to single spaces and trims. Equality of the result is the sole
/// duplicate criterion; no fuzzy matching. Idempotent, never fails.
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip HTML tags from text
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    // Clean up whitespace and HTML entities
    result
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max` characters, appending `...` when cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut truncated: String = s.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(normalize("  Stocks Rise — Big Time!  "), "stocks rise big time");
        assert_eq!(normalize("Fed raises rates!"), "fed raises rates");
        assert_eq!(normalize("FED RAISES RATES"), "fed raises rates");
        assert_eq!(normalize("\"Quoted\" 'title'"), "quoted title");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in [
            "  Stocks Rise — Big Time!  ",
            "Đầu tư chứng khoán: góc nhìn mới",
            "plain lowercase already",
            "",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_keeps_unlisted_punctuation() {
        // Only the fixed set is removed
        assert_eq!(normalize("A & B (2024)"), "a & b (2024)");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hello <b>world</b> &amp; friends</p>"),
            "Hello world & friends"
        );
        assert_eq!(strip_html("no tags here"), "no tags here");
        assert_eq!(strip_html("<div>\n  spaced\n  out\n</div>"), "spaced out");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_chars("this is too long", 7), "this is...");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("chứng khoán", 5), "chứng...");
    }
}
