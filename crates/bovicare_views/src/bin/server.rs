use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use bovicare_client::BovicareClient;
use bovicare_client::config::Config;
use bovicare_client::http_client::ReqwestBovicareClient;
use bovicare_views::BovicareViews;
use bovicare_views::http::{AppState, router};

/// Server-side timeout from `BOVICARE_REQUEST_TIMEOUT_SECS`, default 30s.
fn request_timeout_from(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

fn address_from(raw: Option<&str>) -> SocketAddr {
    raw.and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // `BOVICARE_LOG_LEVEL`, then `RUST_LOG`, then `info`.
    let log_env = std::env::var("BOVICARE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env.clone())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!(%log_env, "bovicare_views: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let config = Config::from_env()?;
    info!(
        environment = ?config.environment,
        base_url = %config.base_url,
        durable_session = config.session_file.is_some(),
        "backend configuration"
    );
    let client = ReqwestBovicareClient::from_config(&config).await?;
    let changes = client.changes().subscribe();
    let client: Arc<dyn BovicareClient> = Arc::new(client);

    let views = BovicareViews::new(client);
    if views.session.verify().await {
        info!("restored session verified");
    }
    tokio::spawn(views.clone().follow_changes(changes));

    let state = Arc::new(AppState {
        views,
        metrics: handle,
    });

    let timeout = request_timeout_from(std::env::var("BOVICARE_REQUEST_TIMEOUT_SECS").ok().as_deref());
    let app = router(state).layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        timeout,
    ));

    let addr = address_from(std::env::var("ADDRESS").ok().as_deref());
    info!(%addr, timeout_secs = timeout.as_secs(), "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
