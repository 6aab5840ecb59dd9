use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tone_llm::OpenAIConnector;
use tone_service::{
    app_module::AppState, build_app, config::ServiceConfig, tone::session_store::SessionStore,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = ServiceConfig::from_env();

    let subscriber_builder = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE);

    if config.is_dev() {
        tracing::subscriber::set_global_default(
            subscriber_builder
                .compact()
                .pretty()
                .with_ansi(true)
                .finish(),
        )
        .context("setting dev subscriber failed")?;
    } else {
        tracing::subscriber::set_global_default(
            subscriber_builder.json().with_ansi(false).finish(),
        )
        .context("setting prod subscriber failed")?;
    }

    let connector = Arc::new(OpenAIConnector::new(config.api_base.clone()));
    let sessions = SessionStore::with_limits(config.session_limits);
    let state = AppState::new(connector, config.model_settings.clone(), sessions);
    let app = build_app(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("unable to bind {}", config.bind_address))?;

    tracing::info!(
        model = %config.model_settings.model,
        temperature = config.model_settings.temperature,
        "Server started, listening on {}",
        config.bind_address
    );
    axum::serve(listener, app)
        .await
        .context("unable to start server")?;

    Ok(())
}
