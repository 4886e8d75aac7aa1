//! HTTP server: the AI proxy route plus static hosting of the built client.
//!
//! Everything that isn't `/api/generate` is served from the static directory, with
//! `index.html` as the fallback so client-side routes resolve.

use crate::ai::gemini::GeminiModel;
use crate::ai::proxy::{self, ProxyState};
use crate::ai::Generator;
use crate::config::{self, TtylConfig};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Build the upstream model from the environment credential, if there is one.
fn upstream_model(config: &TtylConfig) -> Result<Option<Arc<dyn Generator>>> {
    match config::api_key_from_env() {
        Some(key) => {
            let model = GeminiModel::new(&config.ai, key)?;
            tracing::info!(model = %config.ai.model, "upstream model configured");
            Ok(Some(Arc::new(model)))
        }
        None => {
            tracing::warn!(
                vars = ?config::API_KEY_VARS,
                "no API key found; /api/generate will answer with an error"
            );
            Ok(None)
        }
    }
}

/// Assemble the full router around an already-built model.
pub fn app(config: &TtylConfig, model: Option<Arc<dyn Generator>>) -> Router {
    let static_dir = config.resolved_static_dir();
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    proxy::router(ProxyState { model }, config.server.body_limit_mb * 1024 * 1024)
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server until ctrl-c.
pub async fn serve(config: TtylConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let model = upstream_model(&config)?;
    let router = app(&config, model);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = %bind_addr,
        static_dir = %config.resolved_static_dir().display(),
        "ttyl server listening at http://{bind_addr}"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down server");
        })
        .await?;

    Ok(())
}
