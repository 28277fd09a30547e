//! Terminal-style presentation pass and deterministic fallback templates.

use chrono::{FixedOffset, Offset, Utc};
use econews_core::SourceConfig;

/// Lines at or above this length are never treated as headers.
const HEADER_MAX_CHARS: usize = 100;

const ENUMERATION_PREFIXES: &[&str] = &["1.", "2.", "3.", "•", "-", "*", "▶"];

/// Markers the source pages use to open an image caption line.
const MEDIA_PREFIXES: &[&str] = &["[", "📷", "Ảnh", "Hình"];

/// Reformat extracted text for the terminal: headers bolded, media lines
/// bracketed, paragraphs separated by blank lines, provenance footer
/// appended.
pub fn terminal_format(content: &str, source_display: &str, offset_hours: i32) -> String {
    let mut formatted: Vec<String> = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("**") && line.ends_with("**") {
            formatted.push(line.to_string());
        } else if is_headline(line) {
            formatted.push(format!("**{line}**"));
        } else if MEDIA_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            let caption = line.trim_matches(|c| c == '[' || c == ']');
            formatted.push(format!("[📷 {caption}]"));
        } else {
            formatted.push(line.to_string());
        }
    }

    let timestamp = terminal_timestamp(offset_hours);
    let mut output = formatted.join("\n\n");
    output.push_str(&format!(
        "\n\n**EXTRACTION_LOG:** [{timestamp}] Content processed by extraction pipeline\n\
         **SOURCE_PROTOCOL:** {source_display}\n\
         **STATUS:** SUCCESS"
    ));
    output
}

/// Placeholder returned when every extraction strategy failed.
///
/// Assisted sources get the international variant, everything else the
/// domestic one. Deterministic apart from the timestamp.
pub fn fallback_content(
    url: &str,
    source: &SourceConfig,
    error_msg: &str,
    offset_hours: i32,
) -> String {
    let timestamp = terminal_timestamp(offset_hours);
    let reference = article_ref(url);
    let display = &source.display_name;
    let error_line = if error_msg.is_empty() {
        String::new()
    } else {
        format!("\n\n**ERROR_LOG:** {error_msg}")
    };

    if source.assisted {
        format!(
            "**📈 INTERNATIONAL FINANCIAL DATA STREAM**

**SYSTEM_LOG:** [{timestamp}] Data extraction from {display}

**CONTENT_TYPE:** Global market analysis and economic intelligence

**DATA_STRUCTURE:**
• Real-time market data and analysis protocols
• Global economic indicators and trend mapping
• Corporate earnings and financial report analysis
• Investment strategy algorithms and market forecasts
• International trade and policy impact analysis

**ARTICLE_REF:** {reference}

**STATUS:** Full content extraction temporarily offline
**FALLBACK_MODE:** Basic metadata available
**ACTION_REQUIRED:** Visit the origin source for the complete data stream{error_line}

**SOURCE_ID:** {display}
**PROTOCOL:** HTTPS_SECURE_FETCH
**ENCODING:** UTF-8"
        )
    } else {
        format!(
            "**📰 DOMESTIC FINANCIAL DATA STREAM - RSS PROTOCOL**

**SYSTEM_LOG:** [{timestamp}] Data extraction from {display}

**CONTENT_TYPE:** In-depth domestic equities and finance coverage

**DATA_STRUCTURE:**
• Real-time equity market analysis
• Corporate news and financial report database
• Investment trend algorithms and expert recommendations
• Macroeconomic policy and regulation parser
• Real estate and investment channel streams

**ARTICLE_ID:** {reference}

**STATUS:** Extraction process offline
**FALLBACK_MODE:** Metadata cache active
**NOTE:** Visit the original link for full content with media assets{error_line}

**SOURCE_NAME:** {display}
**PROTOCOL:** RSS_FEED_PARSER
**CHARSET:** UTF-8"
        )
    }
}

fn is_headline(line: &str) -> bool {
    if line.chars().count() >= HEADER_MAX_CHARS {
        return false;
    }
    let has_upper = line.chars().any(char::is_uppercase);
    let has_lower = line.chars().any(char::is_lowercase);
    if has_upper && !has_lower {
        return true;
    }
    if ENUMERATION_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return true;
    }
    if line.ends_with(':') {
        return true;
    }
    // Capitalized line without sentence punctuation reads as a section title.
    line.chars().next().map_or(false, char::is_uppercase)
        && !line.chars().any(|c| matches!(c, '.' | '!' | '?'))
}

fn terminal_timestamp(offset_hours: i32) -> String {
    let tz = FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    Utc::now()
        .with_timezone(&tz)
        .format("%Y.%m.%d_%H:%M:%S")
        .to_string()
}

/// Last path segment of the article URL, used as a stable reference.
fn article_ref(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => "news-article",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econews_core::Category;

    fn assisted_source() -> SourceConfig {
        SourceConfig::new(
            "marketwatch",
            "https://example.com/feed",
            Category::International,
            "MarketWatch",
            "📰",
        )
        .assisted()
    }

    fn domestic_source() -> SourceConfig {
        SourceConfig::new(
            "cafef_stocks",
            "https://example.com/feed",
            Category::Domestic,
            "CafeF CK",
            "📊",
        )
        .trusted()
    }

    #[test]
    fn test_header_detection() {
        let input = "MARKET SNAPSHOT\n\
                     Key takeaways:\n\
                     1. Rates held steady\n\
                     The committee voted unanimously to keep the target range unchanged, noting that \
                     recent indicators point to solid growth in activity and a gradual cooling of prices.";
        let output = terminal_format(input, "MarketWatch", 7);
        assert!(output.contains("**MARKET SNAPSHOT**"));
        assert!(output.contains("**Key takeaways:**"));
        assert!(output.contains("**1. Rates held steady**"));
        assert!(output.contains("\n\nThe committee voted unanimously"));
    }

    #[test]
    fn test_existing_bold_and_media_lines() {
        let input = "**Overview**\n[Chart: weekly close]\nPrices ended the week higher. Volume was thin.";
        let output = terminal_format(input, "CNBC", 7);
        assert!(output.contains("**Overview**"));
        assert!(!output.contains("****Overview****"));
        assert!(output.contains("[📷 Chart: weekly close]"));
    }

    #[test]
    fn test_blank_lines_dropped_and_rejoined() {
        let input = "First paragraph about earnings results today.\n\n\n\
                     Second paragraph about guidance for next year.";
        let output = terminal_format(input, "CNBC", 7);
        assert!(output.contains(
            "First paragraph about earnings results today.\n\nSecond paragraph about guidance for next year."
        ));
    }

    #[test]
    fn test_footer_appended() {
        let output = terminal_format("Body text goes here, nothing special about it.", "CafeF CK", 7);
        assert!(output.contains("**EXTRACTION_LOG:** ["));
        assert!(output.contains("**SOURCE_PROTOCOL:** CafeF CK"));
        assert!(output.ends_with("**STATUS:** SUCCESS"));
    }

    #[test]
    fn test_fallback_variants() {
        let international = fallback_content(
            "https://example.com/story/fed-holds-rates",
            &assisted_source(),
            "Network fetch failed",
            7,
        );
        assert!(international.starts_with("**📈 INTERNATIONAL FINANCIAL DATA STREAM**"));
        assert!(international.contains("**ARTICLE_REF:** fed-holds-rates"));
        assert!(international.contains("**ERROR_LOG:** Network fetch failed"));
        assert!(international.contains("**SOURCE_ID:** MarketWatch"));

        let domestic = fallback_content("nolink", &domestic_source(), "", 7);
        assert!(domestic.starts_with("**📰 DOMESTIC FINANCIAL DATA STREAM"));
        assert!(domestic.contains("**ARTICLE_ID:** news-article"));
        assert!(!domestic.contains("**ERROR_LOG:**"));
        assert!(domestic.contains("**PROTOCOL:** RSS_FEED_PARSER"));
    }
}
