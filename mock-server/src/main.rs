use mock_server::MockState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let vendor_id = std::env::var("NEXUS_VENDOR_ID").unwrap_or_else(|_| "vendor123".to_string());
    let token = std::env::var("NEXUS_TOKEN").unwrap_or_else(|_| "vendorsecret123".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %vendor_id, "mock Nexus API listening");
    mock_server::run(listener, MockState::seeded(&vendor_id, &token)).await
}
