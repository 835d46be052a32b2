//! Service wiring and lifecycle.

use crate::router::build_router;
use crate::state::AppState;
use access_approval_registry::{AccessApproval, AccessApprovalSettings};
use approval_notifier::{LogNotifier, Notifier, NotifyResult, WebhookNotifier};
use chunked_blob_store::FsBlobStore;
use coffer_config_and_utils::{Config, Paths};
use file_transfer_pipeline::{RetrievalLinks, UploadLimits};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Upper bound on how often expired approval tokens are swept.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the HTTP server until Ctrl-C or SIGTERM.
pub async fn run_server(config: Config, paths: Paths) -> Result<(), Box<dyn std::error::Error>> {
    paths.ensure_dirs()?;
    let bind_addr = config.bind_addr()?;
    let base_url = config.base_url()?;

    let store = FsBlobStore::open(paths.blobs_dir(), config.chunk_size).await?;

    let operator_address = config.operator_address.clone().unwrap_or_else(|| {
        warn!("No operator address configured; approval notices will have no recipient");
        String::new()
    });
    let ttl = config.approval_ttl();
    let approvals = Arc::new(AccessApproval::new(
        AccessApprovalSettings {
            access_secret: config.access_secret.clone(),
            operator_address,
            base_url: base_url.to_string(),
            ttl,
        },
        build_notifier(&config)?,
    ));

    let state = AppState::new(
        Arc::new(store),
        RetrievalLinks::new(base_url.to_string()),
        UploadLimits {
            max_bytes: config.max_upload_bytes,
        },
        Arc::clone(&approvals),
    );

    let sweeper = spawn_expiry_sweeper(approvals, ttl.min(MAX_SWEEP_INTERVAL));

    let listener = TcpListener::bind(bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        base_url = %base_url,
        max_upload_bytes = config.max_upload_bytes,
        "Coffer listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Coffer stopped");
    Ok(())
}

fn build_notifier(config: &Config) -> NotifyResult<Arc<dyn Notifier>> {
    match &config.notify_webhook_url {
        Some(url) => {
            info!(endpoint = %url, "Approval notices go to webhook");
            Ok(Arc::new(WebhookNotifier::new(url.clone())?))
        }
        None => {
            info!("No notification webhook configured; approval links are logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Periodically drop expired approval tokens.
pub fn spawn_expiry_sweeper(approvals: Arc<AccessApproval>, every: Duration) -> JoinHandle<()> {
    // interval() panics on a zero period
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            approvals.purge_expired();
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
