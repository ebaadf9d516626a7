//! HTTP surface of the GiftDesk back office.
//!
//! # General layout
//! - `/api/*` JSON routes, guarded by a bearer session resolved through the
//!   configured identity provider.
//! - `/media/*` serves uploaded images from the filesystem object store.
//! - Catalog writes arrive as `multipart/form-data`; user writes as JSON.
//!
//! # Errors
//! Every failure is answered as `{"error": <message>, "code": <code>}` with
//! the status from [`error::AppError::status`].

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use giftdesk_core::{init_logging, LogSettings};
use log::{error, info};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

pub mod config;
pub mod error;
pub mod form;
pub mod routes;
pub mod state;

use config::Config;
use error::AppError;
use state::AppState;

pub async fn start_server() -> Result<(), AppError> {
    let config = Config::load().map_err(|e| AppError::Internal(e.to_string()))?;
    init_logging(
        &LogSettings::new(&config.log_level, &config.log_dir).with_stderr(config.log_to_stderr),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("event=server_init module=server status=start");
    let state = AppState::from_config(&config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = routes::router(state).layer(cors);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind {address}: {e}")))?;
    info!("event=server_listen module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("server error: {e}")))?;

    info!("event=server_shutdown module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={e}");
            std::future::pending::<()>().await;
        }
        info!("event=signal_received module=server status=ok signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=signal_received module=server status=ok signal=terminate");
            }
            Err(e) => {
                error!("event=signal_install module=server status=error signal=terminate error={e}");
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
}
