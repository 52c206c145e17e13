use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
    extract::{Form, Json, State},
    response::{Html, IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::models::{KeywordForm, PostRequest, PostResponse};
use crate::api::{pages, response};
use crate::error::{AppError, Result};
use crate::models::PostDraft;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).post(form_handler))
        .route("/api/posts", post(create_post_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn index_handler() -> Html<String> {
    Html(pages::index_page())
}

async fn form_handler(State(state): State<AppState>, Form(form): Form<KeywordForm>) -> Response {
    match generate(&state, form.keyword).await {
        Ok(draft) => Html(pages::post_page(&draft)).into_response(),
        Err(err) => {
            error!(error = %err, "Form generation failed");
            (err.status(), Html(pages::error_page(&err.public_message()))).into_response()
        }
    }
}

async fn create_post_handler(
    State(state): State<AppState>,
    Json(req): Json<PostRequest>,
) -> Result<impl IntoResponse> {
    let draft = generate(&state, req.keyword).await?;
    let message = (!draft.missing.is_empty())
        .then(|| format!("post is incomplete, missing: {}", draft.missing_summary()));
    Ok(response::success(PostResponse::from(draft), message))
}

/// Runs the blocking pipeline off the async workers.
async fn generate(state: &AppState, keyword: String) -> Result<PostDraft> {
    info!(keyword = keyword.as_str(), "Processing generation request");
    let start = std::time::Instant::now();

    let pipeline = Arc::clone(&state.pipeline);
    let draft = tokio::task::spawn_blocking(move || pipeline.run_raw(&keyword))
        .await
        .map_err(|e| AppError::Internal(format!("generation task failed: {e}")))??;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Request processed");
    Ok(draft)
}
