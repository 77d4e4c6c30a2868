use std::sync::Arc;

use langflow_relay::config::RelayConfig;
use langflow_relay::dispatch::GraphDispatcher;
use langflow_relay::relay::Relay;
use langflow_relay::server::{AppState, relay_routes};
use langflow_relay::workflow::LangflowClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env()?;

    eprintln!("🔁 Langflow Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Langflow: {}", config.langflow_api_url);
    eprintln!(
        "   Workflow: {}",
        if config.langflow_workflow_id.is_empty() {
            "(not set)"
        } else {
            &config.langflow_workflow_id
        }
    );
    eprintln!("   Webhook:  http://0.0.0.0:{}/webhook", config.port);
    eprintln!("   Test API: http://0.0.0.0:{}/test\n", config.port);

    for secret in config.unset_secrets() {
        tracing::warn!(
            "{} is not set; the related integration is effectively disabled",
            secret
        );
    }

    let executor = LangflowClient::new(
        config.langflow_api_url.clone(),
        config.langflow_workflow_id.clone(),
        config.langflow_api_token.clone(),
    );
    let dispatcher = GraphDispatcher::new(config.page_access_token.clone());
    let relay = Relay::new(Arc::new(executor), Arc::new(dispatcher));

    let state = AppState {
        relay: Arc::new(relay),
        verify_token: config.verify_token.clone(),
    };
    let app = relay_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
