use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use insightflow::api::{start_server, AppContext};
use insightflow::collaborators::extractor::PdfTextExtractor;
use insightflow::collaborators::llm::OllamaChatModel;
use insightflow::config::{self, Config};
use insightflow::session::SessionStore;

/// Collaborators use a blocking HTTP client, which must be constructed
/// outside an async runtime, so `main` stays synchronous and enters the
/// runtime only to serve.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        bind = %config.bind_addr,
        llm = %config.llm_base_url,
        "starting {} v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let model = OllamaChatModel::new(&config.llm_base_url, config.llm_timeout_secs)?;
    let ctx = AppContext::new(
        Arc::new(SessionStore::new(config.session_ttl)),
        Arc::new(model),
        Arc::new(PdfTextExtractor),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut server = start_server(ctx, config.bind_addr).await?;
        tracing::info!(addr = %server.addr, "serving");

        tokio::signal::ctrl_c()
            .await
            .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
        tracing::info!("shutdown requested");
        server.shutdown();

        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
