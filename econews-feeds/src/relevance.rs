//! Keyword relevance filtering for untrusted sources

use econews_core::SourceConfig;

/// Finance and business keyword list used by [`is_relevant`].
const FINANCIAL_KEYWORDS: &[&str] = &[
    // English keywords
    "stock", "market", "trading", "investment", "economy", "economic",
    "bitcoin", "crypto", "currency", "bank", "financial", "finance",
    "earnings", "revenue", "profit", "inflation", "fed", "gdp",
    "business", "company", "corporate", "industry", "sector",
    "money", "cash", "capital", "fund", "price", "cost", "value",
    "growth", "analyst", "forecast", "report", "data", "sales",
    "nasdaq", "dow", "sp500", "bond", "yield", "rate", "tech",
    // Vietnamese keywords
    "chứng khoán", "tài chính", "ngân hàng", "kinh tế", "đầu tư",
    "doanh nghiệp", "thị trường", "cổ phiếu", "lợi nhuận",
];

/// Heuristic relevance check for one raw entry.
///
/// Trusted sources pass unconditionally. Everything else needs at least one
/// keyword hit over the lowercased title + description. False positives and
/// negatives are acceptable; entries are never retried.
pub fn is_relevant(title: &str, description: &str, source: &SourceConfig) -> bool {
    if source.trusted {
        return true;
    }

    let combined = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    FINANCIAL_KEYWORDS
        .iter()
        .any(|keyword| combined.contains(keyword))
}
