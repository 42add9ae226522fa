//! Club-back binary entrypoint wiring REST routes and the two storage backends.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use club_back::{
    config::AppConfig,
    dao::{
        club_store::{ClubStore, memory::MemoryClubStore},
        student_store::{StudentStore, memory::MemoryStudentStore},
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[cfg(feature = "mongo-store")]
use club_back::dao::club_store::mongodb::{MongoClubStore, MongoConfig};
#[cfg(feature = "postgres-store")]
use club_back::dao::student_store::postgres::PgStudentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::with_config(AppConfig::load());
    init_club_store(&app_state).await;
    init_student_store(&app_state).await;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Wire the document store: MongoDB behind a supervisor when `MONGO_URI` is
/// set, an in-process store otherwise.
async fn init_club_store(state: &SharedState) {
    #[cfg(feature = "mongo-store")]
    if let Ok(uri) = env::var("MONGO_URI") {
        let db_name = env::var("MONGO_DB").ok();
        let connect = move || {
            let uri = uri.clone();
            let db_name = db_name.clone();
            async move {
                let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
                let store = MongoClubStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn ClubStore>)
            }
        };
        tokio::spawn(storage_supervisor::run(state.clone(), "mongodb", connect));
        return;
    }

    info!("MONGO_URI not set; using in-memory document store");
    state
        .install_club_store(Arc::new(MemoryClubStore::new()))
        .await;
}

/// Wire the relational store: PostgreSQL behind a supervisor when
/// `DATABASE_URL` is set, an in-process store otherwise.
async fn init_student_store(state: &SharedState) {
    #[cfg(feature = "postgres-store")]
    if let Ok(url) = env::var("DATABASE_URL") {
        let connect = move || {
            let url = url.clone();
            async move {
                let store = PgStudentStore::connect(&url).await?;
                Ok(Arc::new(store) as Arc<dyn StudentStore>)
            }
        };
        tokio::spawn(storage_supervisor::run(state.clone(), "postgres", connect));
        return;
    }

    info!("DATABASE_URL not set; using in-memory student store");
    state
        .install_student_store(Arc::new(MemoryStudentStore::new()))
        .await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
