use std::sync::Arc;

use anyhow::Context;

use catalog_api::app::{build_app, services::build_services};
use catalog_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    catalog_observability::init_with(config.log_format);

    let services = Arc::new(build_services(&config.store).await?);
    let app = build_app(services);

    let address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
