use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
	extract::Extension,
	routing::{get, post},
	serve, Router,
};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use tokio::signal;
use tokio::sync::watch;
use utils_trace::tracing_init;
use thiserror::Error;
use tracing::{error, info};

use projects_photo_sync::config::{Config, ConfigError};
use projects_photo_sync::endpoints::admin::add_photos::index::handler as admin_add_photos_handler;
use projects_photo_sync::endpoints::admin::poll::index::handler as admin_poll_handler;
use projects_photo_sync::endpoints::photos::list::index::handler as photos_list_handler;
use projects_photo_sync::poller;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
	#[error("LoadConfig: {source}")]
	LoadConfig {
		#[source]
		source: ConfigError,
	},
	#[error("BuildPool: {source}")]
	BuildPool {
		#[source]
		source: r2d2::Error,
	},
	#[error("TcpListenerBind: {source}")]
	TcpListenerBind {
		#[source]
		source: std::io::Error,
	},
	#[error("Serve: {source}")]
	Serve {
		#[source]
		source: std::io::Error,
	}
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
	dotenvy::dotenv().ok();

    tracing_init("info")
        .map_err(|source| MainError::TracingInit { source })?;

	// Fatal before serving: the process never runs half-configured.
	let config = Arc::new(
		Config::from_env().map_err(|source| MainError::LoadConfig { source })?,
	);

	let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
	let pool = Pool::builder()
		.build(manager)
		.map_err(|source| MainError::BuildPool { source })?;

	let (shutdown_tx, shutdown_rx) = watch::channel(());
	let poller_task = tokio::spawn(poller::run(pool.clone(), config.clone(), shutdown_rx));

	// Set up the router
	let app = Router::new()
		.route("/admin/add-photos", post(admin_add_photos_handler))
		.route("/admin/poll", post(admin_poll_handler))
		.route("/photos", get(photos_list_handler))
		.layer(Extension(pool))
		.layer(Extension(config.clone()));

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|source| MainError::TcpListenerBind { source })?;

	info!("Server running on addr: {}", addr);

	serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(|source| MainError::Serve { source })?;

	// Stop the poller at its next sleep boundary, then wait for it.
	let _ = shutdown_tx.send(());
	if let Err(err) = poller_task.await {
		error!("Poller task failed: {err}");
	}

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("Failed to install Ctrl+C handler");

		info!("Received Ctrl+C, shutting down");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("Failed to install signal handler")
			.recv()
			.await;

		info!("Received terminate signal, shutting down");
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
