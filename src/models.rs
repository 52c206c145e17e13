use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PipelineError;

/// A search keyword. Never empty or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(raw: &str) -> Result<Self, PipelineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidKeyword);
        }
        Ok(Keyword(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchSignals {
    /// "People Also Ask" questions, in provider order.
    pub questions: Vec<String>,
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub signals: SearchSignals,
    /// Absolute http(s) organic result links, in ranking order.
    pub result_urls: Vec<String>,
}

/// Competitor headings in scrape order. Duplicates are kept.
pub type HeadingSet = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub(crate) fn new(text: String) -> Self {
        Prompt(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedPost {
    pub title: String,
    pub intro: String,
    pub sections: Vec<Section>,
    pub conclusion: String,
    /// Heading the model gave its conclusion, e.g. `Final Thoughts`.
    pub conclusion_heading: String,
    /// Full marker text, e.g. `[Trail Runner X - Affiliate Link Here]`.
    pub affiliate_placeholders: Vec<String>,
}

/// Parts of a post the model was asked for but did not (fully) deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostField {
    Title,
    Intro,
    Sections,
    Conclusion,
    AffiliatePlaceholders,
}

impl PostField {
    pub fn label(&self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Intro => "intro",
            PostField::Sections => "sections",
            PostField::Conclusion => "conclusion",
            PostField::AffiliatePlaceholders => "affiliate placeholders",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub post: GeneratedPost,
    pub missing: Vec<PostField>,
}

impl ParsedPost {
    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPost {
    pub title: String,
    pub html: String,
    pub markdown: String,
    pub generated_at: DateTime<Utc>,
}

/// Everything one successful pipeline run produced.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub keyword: Keyword,
    pub signals: SearchSignals,
    pub headings: HeadingSet,
    pub post: GeneratedPost,
    pub missing: Vec<PostField>,
    pub rendered: RenderedPost,
}

impl PostDraft {
    /// Comma-separated labels of the missing fields, empty when complete.
    pub fn missing_summary(&self) -> String {
        self.missing.iter().map(PostField::label).collect::<Vec<_>>().join(", ")
    }

    pub fn word_count(&self) -> usize {
        self.rendered.markdown.split_whitespace().count()
    }
}
