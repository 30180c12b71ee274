mod categories;
mod config;
mod error;
mod game;
mod models;
mod routes;
mod utils;
mod websocket;

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use axum::{routing::get, Router};
use categories::{Categories, Category};
use config::Config;
use dashmap::DashMap;
use error::{AppError, AppResult};
use game::PuzzleSession;
use models::PuzzleView;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub categories: Categories,
    /// Live puzzles keyed by session id
    pub sessions: DashMap<Uuid, PuzzleSession>,
}

impl AppState {
    pub fn new(config: Config, categories: Categories) -> Self {
        Self {
            config,
            categories,
            sessions: DashMap::new(),
        }
    }

    /// Look up a category, falling back to the configured default when none is given
    pub fn resolve_category<'a>(
        &'a self,
        key: Option<&'a str>,
    ) -> AppResult<(&'a str, &'a Category)> {
        let key = key.unwrap_or(&self.config.game.default_category);
        self.categories
            .get(key)
            .map(|category| (key, category))
            .ok_or_else(|| AppError::UnknownCategory(key.to_string()))
    }

    fn label_for(&self, key: &str) -> String {
        self.categories
            .get(key)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn create_session(&self, category: Option<&str>) -> AppResult<PuzzleView> {
        let (key, category) = self.resolve_category(category)?;
        let session = PuzzleSession::new(
            key,
            &category.words,
            &self.config.generator_options(),
            &mut rand::rng(),
        );
        let view = PuzzleView::from_session(&session, &category.label);

        tracing::info!("Created puzzle session {} ({})", session.id, key);
        self.sessions.insert(session.id, session);

        Ok(view)
    }

    pub fn puzzle_view(&self, id: Uuid) -> AppResult<PuzzleView> {
        let session = self
            .sessions
            .get(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        Ok(PuzzleView::from_session(&session, &self.label_for(&session.category)))
    }

    /// Generate a fresh grid for a session, optionally switching category
    pub fn regenerate(&self, id: Uuid, category: Option<&str>) -> AppResult<PuzzleView> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        let current = session.category.clone();
        let (key, category) = self.resolve_category(Some(category.unwrap_or(&current)))?;

        session.regenerate(
            key,
            &category.words,
            &self.config.generator_options(),
            &mut rand::rng(),
        );
        Ok(PuzzleView::from_session(&session, &category.label))
    }

    /// Run `f` against a session while holding its entry. Never call across an `.await`.
    pub fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut PuzzleSession) -> T,
    ) -> AppResult<T> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        Ok(f(&mut session))
    }

    pub fn remove_session(&self, id: Uuid) -> AppResult<()> {
        match self.sessions.remove(&id) {
            Some(_) => {
                tracing::info!("Removed puzzle session {}", id);
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }

    /// Drop sessions idle for longer than the configured timeout. Returns how many went.
    pub fn sweep_idle_sessions(&self, now: Instant) -> usize {
        let timeout = self.config.session.idle_timeout;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.last_active) <= timeout);
        before.saturating_sub(self.sessions.len())
    }
}

/// Build the full router for the given state
pub fn app(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new(&state.config.server.frontend_dir);

    Router::new()
        // WebSocket endpoint
        .route("/ws/{id}", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "word_search_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting word search backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load categories
    let categories = Categories::load_or_builtin(&config.game.categories_path).await;
    if categories.get(&config.game.default_category).is_none() {
        anyhow::bail!(
            "DEFAULT_CATEGORY '{}' is not one of: {}",
            config.game.default_category,
            categories.keys().collect::<Vec<_>>().join(", ")
        );
    }

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), categories));

    // Spawn background task to evict idle puzzle sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        session_cleanup_task(cleanup_state).await;
    });

    let router = app(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws/{{puzzle_id}}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, router).await?;

    Ok(())
}

/// Background task that periodically drops idle puzzle sessions
async fn session_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(state.config.session.sweep_interval);

    loop {
        interval.tick().await;

        let removed = state.sweep_idle_sessions(Instant::now());
        if removed > 0 {
            tracing::info!(
                "Removed {} idle puzzle sessions ({} remaining)",
                removed,
                state.sessions.len()
            );
        }
    }
}

/// Shared state with default config and built-in categories
#[cfg(test)]
pub fn test_state() -> Arc<AppState> {
    let config = Config::from_lookup(|_| None).unwrap();
    Arc::new(AppState::new(config, Categories::builtin()))
}
