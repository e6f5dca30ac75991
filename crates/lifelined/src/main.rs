//! lifelined - Lifeline daemon.
//!
//! Watches container lifecycle events and serves the configuration API.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lifeline_monitor::{Classifier, ContainerRuntime, Monitor};
use lifeline_notify::{Dispatcher, TransportRegistry, http_client};
use lifeline_store::FileStore;
use lifelined::api::{self, AppState};
use lifelined::{Args, logging};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level, args.log_format)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lifelined starting");

    let store = Arc::new(FileStore::open(args.paths()).with_context(|| {
        format!(
            "Failed to open data directory {}",
            args.data_dir.display()
        )
    })?);

    let runtime = Arc::new(args.docker_runtime()?);
    runtime
        .ping()
        .await
        .context("Container runtime is not reachable")?;
    match &args.docker_socket {
        Some(socket) => {
            tracing::info!(socket = %socket.display(), "Connected to container runtime");
        }
        None => tracing::info!("Connected to container runtime via local defaults"),
    }

    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        TransportRegistry::with_defaults(http_client()?),
    ));
    tracing::debug!(schemes = ?dispatcher.transports().schemes(), "Registered transports");

    let classifier = Classifier::new(
        runtime.clone(),
        store.clone(),
        store.clone(),
        dispatcher.clone(),
        args.monitor_config(),
    );
    let monitor = Monitor::new(runtime.clone(), classifier);
    let cancel = monitor.cancellation_token();
    let mut monitor_task = tokio::spawn(async move { monitor.run().await });

    let addr = args.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let state = AppState::new(runtime, &store, dispatcher);
    let server = tokio::spawn(api::serve(listener, state, {
        let cancel = cancel.clone();
        async move { cancel.cancelled().await }
    }));

    let monitor_result = tokio::select! {
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            cancel.cancel();
            monitor_task.await
        }
        joined = &mut monitor_task => joined,
    };

    cancel.cancel();
    server
        .await
        .context("HTTP server task failed")?
        .context("HTTP server failed")?;

    match monitor_result {
        Ok(Ok(())) => {
            tracing::info!("lifelined stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Monitor failed");
            Err(e).context("Monitor stopped")
        }
        Err(e) => Err(anyhow::anyhow!("Monitor task failed: {e}")),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
