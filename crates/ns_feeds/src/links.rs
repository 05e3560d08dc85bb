use scraper::{Html, Selector};

/// Extracts the target URLs of every hyperlink in a chunk of description markup.
/// Link text is discarded; anchors without an `href` are skipped.
pub fn extract_hrefs(description: &str) -> Vec<String> {
    if description.trim().is_empty() {
        return Vec::new();
    }

    let fragment = Html::parse_fragment(description);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    fragment
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}
