//! Reportify KP REST server.
//!
//! Serves the JSON API under `/api/` plus an unauthenticated `/health`
//! probe. Every API call carries a bearer token that is verified by the
//! configured identity provider before the handler runs.

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use reportify::{auth::provider::provider_from_config, Config, Database};

pub mod auth;
pub mod body;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

use error::ServerError;
use handlers::{akun, bimbingan, daily_report, evaluasi, instansi, mahasiswa, session, statistik};
use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let api = Router::new()
        .route("/akun", get(akun::list).post(akun::create))
        .route(
            "/mahasiswa",
            get(mahasiswa::list)
                .post(mahasiswa::create)
                .put(mahasiswa::update),
        )
        .route("/mahasiswa/progres", get(mahasiswa::progres))
        .route(
            "/daily-report",
            get(daily_report::list)
                .post(daily_report::create)
                .put(daily_report::update),
        )
        .route("/daily-report/status", get(daily_report::status))
        .route("/daily-report/laporan", get(daily_report::laporan))
        .route(
            "/bimbingan",
            get(bimbingan::list)
                .post(bimbingan::create)
                .put(bimbingan::update),
        )
        .route(
            "/evaluasi",
            get(evaluasi::list)
                .post(evaluasi::create)
                .put(evaluasi::update),
        )
        .route(
            "/instansi",
            get(instansi::list)
                .post(instansi::create)
                .put(instansi::update),
        )
        .route("/statistik", get(statistik::show))
        .route("/session", get(session::show));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{origin}'");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

/// Opens the store, builds the identity provider and serves until Ctrl-C
/// or SIGTERM.
pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("Initializing state...");
    let uri = config.database_uri().ok_or(ServerError::NoDatabase)?;
    let db = Database::open_uri(&uri).map_err(reportify::ReportifyError::from)?;
    let identity = provider_from_config(&config.identity)?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db, identity, config);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
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
