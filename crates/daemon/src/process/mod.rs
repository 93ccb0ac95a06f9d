pub mod utils;

use std::time::Duration;

use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

use crate::http_server;
use crate::service_state::StateSetupError;
use crate::{ServiceConfig, ServiceState};

/// Initialize logging, panic handler, and build info reporting.
/// Returns guards that must be kept alive for the duration of the program.
pub fn init_logging(
    service_config: &ServiceConfig,
) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let mut guards = Vec::new();

    // Stdout layer
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(service_config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    // File layer (if log_dir is set)
    if let Some(log_dir) = &service_config.log_dir {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, "fileshare.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(service_config.log_level.into())
            .from_env_lossy();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(file_env_filter);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_layer).init();
    }

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Run the file sharing server until SIGINT/SIGTERM, or until it fails.
///
/// Logging must already be initialized; see [`init_logging`].
pub async fn spawn_service(service_config: &ServiceConfig) -> Result<(), ProcessError> {
    let (graceful_waiter, _shutdown_tx, shutdown_rx) =
        utils::graceful_shutdown_blocker().map_err(ProcessError::Signals)?;
    let state = ServiceState::from_config(service_config).await?;

    let http_config = http_server::Config::new(
        service_config.listen_addr,
        service_config.max_upload_bytes,
    );
    let mut server = tokio::spawn(async move {
        http_server::run(http_config, state, shutdown_rx).await
    });

    tracing::info!(
        "Serving on http://localhost:{} (Ctrl+C to stop)",
        service_config.listen_addr.port()
    );

    tokio::select! {
        _ = graceful_waiter => {
            tracing::info!("server stopping");
            match timeout(FINAL_SHUTDOWN_TIMEOUT, &mut server).await {
                Ok(Ok(result)) => result?,
                Ok(Err(e)) => return Err(ProcessError::Join(e)),
                Err(_) => return Err(ProcessError::ShutdownTimeout(FINAL_SHUTDOWN_TIMEOUT)),
            }
        }
        // The server only ends on its own when it could not bind or serve
        joined = &mut server => {
            joined.map_err(ProcessError::Join)??;
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("could not install signal handlers: {0}")]
    Signals(std::io::Error),
    #[error("error creating server state: {0}")]
    State(#[from] StateSetupError),
    #[error(transparent)]
    Http(#[from] http_server::HttpServerError),
    #[error("server task failed: {0}")]
    Join(tokio::task::JoinError),
    #[error("failed to shut down within {} seconds", .0.as_secs())]
    ShutdownTimeout(Duration),
}
