use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::{PostDraft, PostField};

#[derive(Deserialize)]
pub struct PostRequest {
    pub keyword: String,
}

/// Body of the keyword form on the index page.
#[derive(Deserialize)]
pub struct KeywordForm {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub keyword: String,
    pub title: String,
    #[serde(rename = "post_markdown")]
    pub markdown: String,
    #[serde(rename = "post_html")]
    pub html: String,
    pub section_count: usize,
    pub affiliate_placeholders: Vec<String>,
    pub missing_fields: Vec<PostField>,
    pub word_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl From<PostDraft> for PostResponse {
    fn from(draft: PostDraft) -> Self {
        let word_count = draft.word_count();
        PostResponse {
            keyword: draft.keyword.to_string(),
            title: draft.rendered.title,
            markdown: draft.rendered.markdown,
            html: draft.rendered.html,
            section_count: draft.post.sections.len(),
            affiliate_placeholders: draft.post.affiliate_placeholders,
            missing_fields: draft.missing,
            word_count,
            generated_at: draft.rendered.generated_at,
        }
    }
}
