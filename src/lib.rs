mod utils;

pub mod content;
pub mod error;
pub mod intent;
pub mod models;
pub mod pool;
pub mod sampler;
pub mod session;
pub mod settings;
pub mod talk;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use log::{info, warn};
use tower_http::cors::{Any, CorsLayer};

use content::JsonContentStore;
use session::{sweep_loop, SessionStore};
use settings::Settings;
use talk::{
    commands::{talk, talk_fallback},
    TalkController,
};

#[derive(Clone)]
pub struct AppState {
    pub(crate) talk: TalkController,
    pub(crate) session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(talk: TalkController, session_cookie: impl Into<Arc<str>>) -> Self {
        Self {
            talk,
            session_cookie: session_cookie.into(),
        }
    }
}

/// The single talk endpoint, reachable at `/`, `/api` and `/api/`. Other
/// spellings of those paths (`/api//`, `/api/index.php`) reach it through the
/// fallback; any other path answers `Invalid request`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(talk))
        .route("/api", get(talk))
        .route("/api/", get(talk))
        .fallback(talk_fallback)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Result<()> {
    let content = JsonContentStore::new(&settings.data_dir);
    if !content.data_dir().is_dir() {
        warn!(
            "Data directory {} does not exist; every request will report missing content",
            content.data_dir().display()
        );
    }

    let sessions = SessionStore::with_idle_ttl(settings.session_ttl());
    match sessions.idle_ttl() {
        Some(ttl) => {
            info!("Sessions expire after {}s idle", ttl.as_secs());
            tokio::spawn(sweep_loop(sessions.clone()));
        }
        None => info!("Session expiry disabled"),
    }

    let state = AppState::new(
        TalkController::new(Arc::new(content)).with_sessions(sessions),
        settings.session_cookie.as_str(),
    );
    let app = build_router(state);

    let addr = settings.socket_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "Serving talk points on http://{addr} from {}",
        settings.data_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
        .context("server terminated unexpectedly")
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var, defaults to info)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("talkpoints starting up...");

    let settings = Settings::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(serve(settings))
}
