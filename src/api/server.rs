//! Server lifecycle — bind, spawn, shut down.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. Tests bind port 0 and talk to the returned address.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::AppContext;

/// Handle to a running API server.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("server shutdown signal sent");
        }
    }
}

/// Bind the listener, spawn the server and return its handle.
pub async fn start_server(ctx: AppContext, bind: SocketAddr) -> Result<ServerHandle, String> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| format!("Failed to bind {bind}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read bound address: {e}"))?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("server received shutdown signal");
        };

        tracing::info!(%addr, "server started");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("server error: {e}");
        }
        tracing::info!("server stopped");
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::collaborators::extractor::{DocumentExtract, ExtractError};
    use crate::collaborators::llm::{ChatModel, LlmError};
    use crate::session::SessionStore;
    use crate::workflow::prompts::PromptSpec;

    struct StaticModel;
    impl ChatModel for StaticModel {
        fn generate(&self, _spec: &PromptSpec, _content: &str) -> Result<String, LlmError> {
            Ok("ON_TOPIC".into())
        }
    }

    struct NoopExtractor;
    impl DocumentExtract for NoopExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
            Ok("text".into())
        }
    }

    fn test_ctx() -> AppContext {
        AppContext::new(
            Arc::new(SessionStore::new(Duration::from_secs(60))),
            Arc::new(StaticModel),
            Arc::new(NoopExtractor),
        )
    }

    #[tokio::test]
    async fn start_serves_health_and_stops() {
        let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut server = start_server(test_ctx(), bind).await.expect("server starts");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut server = start_server(test_ctx(), bind).await.expect("server starts");
        server.shutdown();
        server.shutdown();
    }
}
