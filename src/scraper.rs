use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::error::PageFetchError;
use crate::models::HeadingSet;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (compatible; SeoBlogGenerator/0.1)";

// Compiled once; the selector string is a constant.
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3").expect("Failed to parse heading selector")
});

/// Fetches the raw HTML of a page.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, PageFetchError>;
}

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, PageFetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<String, PageFetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

/// Collects heading structure from top-ranking competitor pages.
pub struct CompetitorScraper {
    fetcher: Box<dyn PageFetcher>,
    max_pages: usize,
}

impl CompetitorScraper {
    pub fn new(fetcher: Box<dyn PageFetcher>, max_pages: usize) -> Self {
        Self { fetcher, max_pages }
    }

    /// Scrapes up to `max_pages` of `urls`. A page that fails to load is
    /// skipped; if all of them fail the result is simply empty.
    pub fn scrape(&self, urls: &[String]) -> HeadingSet {
        let targets = &urls[..urls.len().min(self.max_pages)];
        info!(pages = targets.len(), "Analyzing competitor pages");

        let mut headings = HeadingSet::new();
        for url in targets {
            let start = Instant::now();
            match self.fetcher.fetch(url) {
                Ok(html) => {
                    let found = extract_headings(&html);
                    debug!(
                        url = url.as_str(),
                        headings = found.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Competitor page analyzed"
                    );
                    headings.extend(found);
                }
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "Could not fetch competitor page, skipping");
                }
            }
        }

        if headings.is_empty() && !targets.is_empty() {
            warn!("No competitor headings collected");
        }
        headings
    }
}

/// Text of every `h1`–`h3` in document order, whitespace collapsed.
pub fn extract_headings(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&HEADING_SELECTOR)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    impl PageFetcher for MapFetcher {
        fn fetch(&self, url: &str) -> Result<String, PageFetchError> {
            self.0
                .get(url)
                .map(|html| html.to_string())
                .ok_or(PageFetchError::Status(404))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_extract_headings_in_document_order() {
        let html = r#"<html><body>
            <h1>Top 10 Running Shoes</h1>
            <p>intro</p>
            <h2>How to   Choose
                Running Shoes</h2>
            <h4>ignored</h4>
            <h3><span>Cushioning</span> matters</h3>
            <h2>   </h2>
        </body></html>"#;

        assert_eq!(
            extract_headings(html),
            vec![
                "Top 10 Running Shoes",
                "How to Choose Running Shoes",
                "Cushioning matters"
            ]
        );
    }

    #[test]
    fn test_extract_headings_from_page_without_headings() {
        assert!(extract_headings("<p>just text</p>").is_empty());
    }

    #[test]
    fn test_all_pages_failing_yields_empty_set() {
        let scraper = CompetitorScraper::new(Box::new(MapFetcher(HashMap::new())), 3);
        let headings = scraper.scrape(&urls(&["https://a.test", "https://b.test", "https://c.test"]));
        assert!(headings.is_empty());
    }

    #[test]
    fn test_failed_page_is_skipped() {
        let pages = HashMap::from([
            ("https://a.test", "<h2>Alpha</h2>"),
            ("https://c.test", "<h2>Gamma</h2><h2>Alpha</h2>"),
        ]);
        let scraper = CompetitorScraper::new(Box::new(MapFetcher(pages)), 3);
        let headings = scraper.scrape(&urls(&["https://a.test", "https://b.test", "https://c.test"]));
        assert_eq!(headings, vec!["Alpha", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_scrape_respects_page_cap() {
        let pages = HashMap::from([
            ("https://a.test", "<h2>Alpha</h2>"),
            ("https://b.test", "<h2>Beta</h2>"),
        ]);
        let scraper = CompetitorScraper::new(Box::new(MapFetcher(pages)), 1);
        let headings = scraper.scrape(&urls(&["https://a.test", "https://b.test"]));
        assert_eq!(headings, vec!["Alpha"]);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
