use std::process::ExitCode;
use std::sync::Arc;

use pipevisor::{Config, LogWriter, Pipeline, Subscribe};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .try_init();

    let cfg = Config::default();
    tracing::info!(
        capacity = cfg.channel_capacity,
        thresholds = ?cfg.thresholds,
        keepalive = ?cfg.keepalive_timeout,
        "starting pipeline"
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let pipeline = match Pipeline::builder(cfg).with_subscribers(subs).build() {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(label = e.as_label(), "{}", e.as_message());
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(label = e.as_label(), "{}", e.as_message());
            ExitCode::FAILURE
        }
    }
}
