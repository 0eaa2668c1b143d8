use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tokio::sync::{broadcast, mpsc};

use canwatch_core::config::CanwatchConfig;
use canwatch_core::types::AlertRecord;
use canwatch_daemon::api::{self, AppState};
use canwatch_daemon::cli::DaemonCli;
use canwatch_daemon::controller::DetectionController;
use canwatch_daemon::{logging, metrics_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = match &cli.config {
        Some(path) => CanwatchConfig::load(path).await,
        None => CanwatchConfig::from_env(),
    }
    .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "canwatch-daemon starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let (controller, alert_rx) = DetectionController::new(&config);
    let controller = Arc::new(controller);
    let state = AppState::new(Arc::clone(&controller));

    let (shutdown_tx, _) = broadcast::channel(4);
    let alert_logger = spawn_alert_logger(alert_rx, shutdown_tx.subscribe());
    let uptime_updater = config
        .metrics
        .enabled
        .then(|| {
            spawn_uptime_updater(
                state.started,
                Arc::clone(&controller),
                shutdown_tx.subscribe(),
            )
        });

    let addr: SocketAddr = format!("{}:{}", config.api.listen_addr, config.api.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid api listen address: {}", e))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind control API on {}: {}", addr, e))?;

    tracing::info!(
        listen_addr = %addr,
        alert_log = %controller.alert_log_path().display(),
        "control API listening"
    );

    let serve_result = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            match wait_for_shutdown_signal().await {
                Ok(signal) => tracing::info!(signal, "shutdown signal received"),
                Err(e) => tracing::error!(error = %e, "signal handling failed, shutting down"),
            }
        })
        .await;

    // Stop detection even if the server failed
    controller.shutdown().await;

    let _ = shutdown_tx.send(());
    let _ = alert_logger.await;
    if let Some(task) = uptime_updater {
        let _ = task.await;
    }

    serve_result.map_err(|e| anyhow::anyhow!("control API server failed: {}", e))?;
    tracing::info!("canwatch-daemon shut down");
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to listen for Ctrl+C: {}", e))?;
    Ok("CTRL_C")
}

/// Log each new alert seen by the tailer.
fn spawn_alert_logger(
    mut alert_rx: mpsc::Receiver<AlertRecord>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                alert = alert_rx.recv() => {
                    match alert {
                        Some(alert) => {
                            tracing::info!(
                                timestamp = %alert.timestamp,
                                alert_type = %alert.alert_type,
                                severity = %alert.severity(),
                                can_id = %alert.can_id,
                                message = %alert.message,
                                "new alert"
                            );
                        }
                        None => {
                            tracing::debug!("alert channel closed, exiting logger");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("alert logger shutting down");
                    break;
                }
            }
        }
    })
}

/// Periodically refresh the uptime gauge for Prometheus scrapes.
///
/// Each tick also polls the detector so the running gauge drops soon after
/// a detector exits on its own.
fn spawn_uptime_updater(
    start_time: Instant,
    controller: Arc<DetectionController>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    use canwatch_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS)
                        .set(start_time.elapsed().as_secs() as f64);
                    controller.detector_status().await;
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
