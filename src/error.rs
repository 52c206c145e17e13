use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

/// Failure talking to the search-results provider. Fatal to a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum SearchProviderError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure talking to the generative model. Fatal to a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed model response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model returned empty content")]
    EmptyResponse,
}

/// Failure fetching a single competitor page. Always absorbed by the scraper.
#[derive(Debug, thiserror::Error)]
pub enum PageFetchError {
    #[error("page request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page returned status {0}")]
    Status(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("keyword must not be empty")]
    InvalidKeyword,

    #[error(transparent)]
    Search(#[from] SearchProviderError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid keyword: {0}")]
    InvalidKeyword(String),

    #[error("Search provider error: {0}")]
    SearchError(#[source] SearchProviderError),

    #[error("LLM generation error: {0}")]
    LlmError(#[source] GenerationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidKeyword(_) => StatusCode::BAD_REQUEST,
            AppError::SearchError(_) | AppError::LlmError(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to end users. Provider details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidKeyword(msg) => msg.clone(),
            _ => "Sorry, the blog post could not be generated. Please try again later.".to_string(),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidKeyword => {
                AppError::InvalidKeyword(PipelineError::InvalidKeyword.to_string())
            }
            PipelineError::Search(e) => AppError::SearchError(e),
            PipelineError::Generation(e) => AppError::LlmError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        response::error::<()>(self.status(), self.public_message()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_errors_map_to_status() {
        let err: AppError = PipelineError::InvalidKeyword.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = PipelineError::Generation(GenerationError::EmptyResponse).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err: AppError = PipelineError::Search(SearchProviderError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        })
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_public_message_hides_provider_details() {
        let err = AppError::SearchError(SearchProviderError::Api {
            status: 401,
            message: "Invalid API key abc123".to_string(),
        });
        assert!(!err.public_message().contains("abc123"));
    }

    #[test]
    fn test_invalid_keyword_message_is_shown() {
        let err: AppError = PipelineError::InvalidKeyword.into();
        assert_eq!(err.public_message(), "keyword must not be empty");
    }
}
