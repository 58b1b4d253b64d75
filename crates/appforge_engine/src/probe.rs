use std::sync::Arc;

use scraper::{Html, Selector};

use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::ConvertError;

/// Longest title kept for the generated window; longer titles are cut on a char boundary.
const MAX_TITLE_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub final_url: String,
    pub title: Option<String>,
    pub encoding_label: String,
}

/// Fetches the page once to confirm it is reachable and to learn its title.
pub struct PageProbe {
    fetcher: Arc<dyn Fetcher>,
}

impl PageProbe {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn probe(&self, url: &str) -> Result<ProbeResult, ConvertError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())?;
        Ok(ProbeResult {
            final_url: output.metadata.final_url,
            title: extract_title(&decoded.html),
            encoding_label: decoded.encoding_label,
        })
    }
}

/// Picks a human title: `<title>`, then `og:title`, then the first `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let from_text = |selector: &str| {
        Selector::parse(selector)
            .ok()
            .and_then(|sel| doc.select(&sel).next().map(|el| el.text().collect::<String>()))
    };
    let from_og = || {
        Selector::parse(r#"meta[property="og:title"]"#)
            .ok()
            .and_then(|sel| {
                doc.select(&sel)
                    .next()
                    .and_then(|el| el.value().attr("content").map(str::to_string))
            })
    };

    [from_text("title"), from_og(), from_text("h1")]
        .into_iter()
        .flatten()
        .map(|raw| normalize_title(&raw))
        .find(|title| !title.is_empty())
}

fn normalize_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => collapsed[..cut].trim_end().to_string(),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_tag_wins() {
        let html = r#"<html><head><title>  Hello
            World </title><meta property="og:title" content="OG"></head><body><h1>H</h1></body></html>"#;
        assert_eq!(extract_title(html).as_deref(), Some("Hello World"));
    }

    #[test]
    fn falls_back_to_og_then_h1() {
        let og = r#"<html><head><title> </title><meta property="og:title" content="From OG"></head></html>"#;
        assert_eq!(extract_title(og).as_deref(), Some("From OG"));

        let h1 = "<html><body><h1>Heading <em>One</em></h1></body></html>";
        assert_eq!(extract_title(h1).as_deref(), Some("Heading One"));
    }

    #[test]
    fn missing_title_is_none() {
        assert_eq!(extract_title("<html><body><p>text</p></body></html>"), None);
    }

    #[test]
    fn long_title_is_truncated() {
        let long = "x".repeat(MAX_TITLE_CHARS + 50);
        let html = format!("<title>{long}</title>");
        assert_eq!(extract_title(&html).unwrap().chars().count(), MAX_TITLE_CHARS);
    }
}
