use pattern_engine::{Engine, EngineConfig};
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = EngineConfig::from_env()?;
    let engine = Engine::open(&cfg)?;
    tracing::info!(
        data_dir = %cfg.data_dir.display(),
        local_patterns = engine.local.iter(&Default::default())?.len(),
        "pattern engine ready"
    );

    Ok(())
}
