use std::{env, error::Error, net::SocketAddr};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigil_analysis::AnalyzerConfig;
use vigil_api::app;
use vigil_rpc::build_analyzer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match env::var("VIGIL_CONFIG") {
        Ok(path) => AnalyzerConfig::from_file(path)?,
        Err(_) => AnalyzerConfig::default(),
    };
    if let Ok(url) = env::var("VIGIL_RPC_URL") {
        config.rpc_url = Some(url);
    }
    let addr: SocketAddr = env::var("VIGIL_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let app = app(build_analyzer(config)?);

    info!("vigil API server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
