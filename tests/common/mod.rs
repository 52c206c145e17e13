#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use seo_blog_generator::error::{GenerationError, PageFetchError, SearchProviderError};
use seo_blog_generator::llm::TextGenerator;
use seo_blog_generator::models::{Keyword, Prompt, SearchResults, SearchSignals};
use seo_blog_generator::pipeline::Pipeline;
use seo_blog_generator::scraper::{CompetitorScraper, PageFetcher};
use seo_blog_generator::search::SearchProvider;

pub const FOUR_SECTION_POST: &str = "# The 2024 Guide to the Best Running Shoes

Whether you are training for a marathon or jogging around the block, shoes matter.

## How to Choose Running Shoes

Fit comes first. We like the [Brooks Ghost 16 - Affiliate Link Here] for most runners.

## Best Running Shoes for Flat Feet

Look for stability. The [ASICS Gel-Kayano 31 - Affiliate Link Here] is a solid pick.

## Running Shoes for Beginners

- Start with neutral cushioning
- Replace every 300-500 miles

## Top 10 Running Shoes Compared

1. Brooks Ghost 16
2. ASICS Gel-Kayano 31

## Conclusion

The best shoe is the one that fits you.
";

/// Search stub returning fixed signals and result URLs.
pub struct StaticSearch {
    pub results: SearchResults,
    pub calls: Arc<AtomicUsize>,
}

impl SearchProvider for StaticSearch {
    fn search(&self, _keyword: &Keyword) -> Result<SearchResults, SearchProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

/// Search stub simulating an unreachable provider.
pub struct FailingSearch;

impl SearchProvider for FailingSearch {
    fn search(&self, _keyword: &Keyword) -> Result<SearchResults, SearchProviderError> {
        Err(SearchProviderError::Api {
            status: 503,
            message: "simulated network failure".to_string(),
        })
    }
}

pub struct MapFetcher {
    pub pages: HashMap<String, String>,
    pub calls: Arc<AtomicUsize>,
}

impl PageFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> Result<String, PageFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or(PageFetchError::Status(500))
    }
}

/// Generator stub that records every prompt it receives.
pub struct RecordingGenerator {
    pub reply: Result<String, ()>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl TextGenerator for RecordingGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.as_str().to_string());
        self.reply.clone().map_err(|_| GenerationError::EmptyResponse)
    }
}

pub struct Harness {
    pub pipeline: Pipeline,
    pub search_calls: Arc<AtomicUsize>,
    pub fetch_calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

pub fn running_shoes_results() -> SearchResults {
    SearchResults {
        signals: SearchSignals {
            questions: vec!["What are the best running shoes for flat feet?".to_string()],
            related: vec!["running shoes for beginners".to_string()],
        },
        result_urls: vec![
            "https://competitor-one.test/shoes".to_string(),
            "https://competitor-two.test/guide".to_string(),
        ],
    }
}

pub fn running_shoes_pages() -> HashMap<String, String> {
    HashMap::from([
        (
            "https://competitor-one.test/shoes".to_string(),
            "<html><body><h1>Top 10 Running Shoes</h1><p>...</p></body></html>".to_string(),
        ),
        (
            "https://competitor-two.test/guide".to_string(),
            "<html><body><h2>How to Choose Running Shoes</h2></body></html>".to_string(),
        ),
    ])
}

pub fn harness(
    search: Option<SearchResults>,
    pages: HashMap<String, String>,
    reply: Result<String, ()>,
) -> Harness {
    let search_calls = Arc::new(AtomicUsize::new(0));
    let fetch_calls = Arc::new(AtomicUsize::new(0));
    let prompts = Arc::new(Mutex::new(Vec::new()));

    let search: Box<dyn SearchProvider> = match search {
        Some(results) => Box::new(StaticSearch {
            results,
            calls: Arc::clone(&search_calls),
        }),
        None => Box::new(FailingSearch),
    };
    let scraper = CompetitorScraper::new(
        Box::new(MapFetcher {
            pages,
            calls: Arc::clone(&fetch_calls),
        }),
        3,
    );
    let generator = Box::new(RecordingGenerator {
        reply,
        prompts: Arc::clone(&prompts),
    });

    Harness {
        pipeline: Pipeline::new(search, scraper, generator),
        search_calls,
        fetch_calls,
        prompts,
    }
}
