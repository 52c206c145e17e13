use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::SearchProviderError;
use crate::models::{Keyword, SearchResults, SearchSignals};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Source of SERP data for a keyword.
pub trait SearchProvider: Send + Sync {
    fn search(&self, keyword: &Keyword) -> Result<SearchResults, SearchProviderError>;
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    related_questions: Vec<RelatedQuestion>,
    #[serde(default)]
    related_searches: Vec<RelatedSearch>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct RelatedQuestion {
    question: Option<String>,
}

#[derive(Deserialize)]
struct RelatedSearch {
    query: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    link: Option<String>,
}

/// Google results through SerpApi.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    country: String,
    language: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, country: String, language: String) -> Result<Self, SearchProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_key,
            country,
            language,
        })
    }
}

impl SearchProvider for SerpApiClient {
    fn search(&self, keyword: &Keyword) -> Result<SearchResults, SearchProviderError> {
        info!(keyword = keyword.as_str(), "Fetching SERP data");

        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("q", keyword.as_str()),
                ("gl", self.country.as_str()),
                ("hl", self.language.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SearchProviderError::Api {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }

        let results = parse_search_response(&body)?;
        info!(
            questions = results.signals.questions.len(),
            related = results.signals.related.len(),
            urls = results.result_urls.len(),
            "SERP data received"
        );
        Ok(results)
    }
}

/// Turns a SerpApi JSON payload into [`SearchResults`].
///
/// A payload carrying an `error` field is treated as a provider error even when
/// the HTTP status was 200 (SerpApi reports e.g. exhausted quotas this way).
pub fn parse_search_response(body: &str) -> Result<SearchResults, SearchProviderError> {
    let parsed: SerpApiResponse = serde_json::from_str(body)?;

    if let Some(message) = parsed.error {
        return Err(SearchProviderError::Api { status: 200, message });
    }

    let questions = parsed
        .related_questions
        .into_iter()
        .filter_map(|q| non_blank(q.question))
        .collect();
    let related = parsed
        .related_searches
        .into_iter()
        .filter_map(|r| non_blank(r.query))
        .collect();
    let result_urls = parsed
        .organic_results
        .into_iter()
        .filter_map(|r| r.link)
        .filter(|link| match Url::parse(link) {
            Ok(url) => matches!(url.scheme(), "http" | "https"),
            Err(e) => {
                debug!(link = link.as_str(), error = %e, "Skipping unparsable result link");
                false
            }
        })
        .collect();

    Ok(SearchResults {
        signals: SearchSignals { questions, related },
        result_urls,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn provider_message(body: &str) -> String {
    serde_json::from_str::<SerpApiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| body.to_string())
}
