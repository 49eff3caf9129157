use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Error};
use pights::prelude::*;
use tracing::{error, event, info, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pights=info,tower_http=info";

/// Must stay visible under `DEFAULT_FILTER`
const LIVENESS_LEVEL: Level = Level::INFO;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_logging(&config)?;

    // Strips come up before anything is served; failing here is fatal
    info!("Starting lights...");
    let lights_config = config.clone();
    let worker = LightWorker::spawn(move || LightController::init(&lights_config)).await?;

    tokio::spawn(liveness(config.liveness_interval()));

    info!("Beginning Pights loop");
    let served = serve(&config.http, worker.handle(), shutdown_signal()).await;
    if let Err(e) = &served {
        error!("{:?}", e);
    }

    // The router and its handles are gone, so this clears and releases the strips
    info!("Shutting down lights...");
    worker.shutdown().await?;
    info!("Lights off, exiting");

    served
}

fn init_logging(config: &Config) -> Result<(), Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

/// Says we are still alive. Never touches the strips.
async fn liveness(period: Duration) {
    let mut tick = tokio::time::interval(period);
    loop {
        tick.tick().await;
        event!(LIVENESS_LEVEL, "Running...");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
