use std::sync::Arc;

use tracing::{info, warn};

use nudge_server::api;
use nudge_server::app_config::{self, ServerConfig};
use nudge_server::router::build_router;
use nudge_server::state::{AppState, SmtpMailerFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    app_config::load_dotenv();
    let config = ServerConfig::from_env();

    let state = Arc::new(AppState::new(
        Arc::new(SmtpMailerFactory),
        config.api_secret.clone(),
    ));

    // Env-seeded campaign goes through the same configure path as the API,
    // probe included. Rejection is logged, not fatal.
    if let Some(payload) = config.env_campaign {
        match api::apply_configuration(&state, payload).await {
            Ok(summary) => info!(
                app = %summary.app_name,
                testers = summary.testers,
                "campaign configured from environment"
            ),
            Err(e) => warn!(error = %e, "environment campaign rejected, starting unconfigured"),
        }
    }

    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("nudge server listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
