//! `POST /api/generate`: a stateless passthrough to the upstream model.
//!
//! The credential stays on the server. Callers only ever see `{text}` on success or
//! one of two fixed `{error}` messages with status 500; upstream error detail is
//! logged here and never echoed back.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use super::{GenerateRequest, GenerateResponse, Generator};

pub const MISSING_KEY_MESSAGE: &str = "Server missing API Key";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate content";

/// Shared state for the proxy route. `model` is `None` when no credential was found.
#[derive(Clone)]
pub struct ProxyState {
    pub model: Option<Arc<dyn Generator>>,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("server missing API key")]
    MissingCredential,

    #[error("generation failed")]
    GenerationFailed,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingCredential => MISSING_KEY_MESSAGE,
            Self::GenerationFailed => GENERATION_FAILED_MESSAGE,
        };
        let body = ErrorResponse {
            error: message.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Router exposing only the generate route, with the body limit applied.
pub fn router(state: ProxyState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

async fn generate(
    State(state): State<ProxyState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ProxyError> {
    tracing::info!("received generate request");

    let Some(model) = state.model else {
        tracing::error!("server missing API key during request");
        return Err(ProxyError::MissingCredential);
    };

    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected generate request body");
        ProxyError::GenerationFailed
    })?;

    tracing::debug!(
        prompt = %request.prompt.chars().take(50).collect::<String>(),
        has_audio = request.audio.is_some(),
        has_image = request.image.is_some(),
        "processing prompt"
    );

    match model.generate(&request).await {
        Ok(text) => {
            let text = text.trim().to_string();
            tracing::info!(chars = text.len(), "generated");
            Ok(Json(GenerateResponse { text }))
        }
        Err(e) => {
            tracing::error!(error = %e, "AI error");
            Err(ProxyError::GenerationFailed)
        }
    }
}
