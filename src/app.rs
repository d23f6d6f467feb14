use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{Database, Store};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{CredentialService, EventService, ParticipantService};

/// Everything a handler can reach, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialService,
    pub events: EventService,
    pub participants: ParticipantService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: AppConfig, database: &Database) -> Self {
        match database {
            Database::Postgres(store) => Self::with_store(config, store.clone()),
            Database::Memory(store) => Self::with_store(config, store.clone()),
        }
    }

    pub fn with_store<S: Store + 'static>(config: AppConfig, store: Arc<S>) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(&config.security.jwt_secret)),
            credentials: CredentialService::new(store.clone(), config.security.password_hash_cost),
            events: EventService::new(store.clone()),
            participants: ParticipantService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    // An empty CorsLayer allows no origins
    let cors = if state.config.security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(public::register))
        .route("/api/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{events, participants};

    Router::new()
        .route("/api/events", get(events::list).post(events::create))
        .route("/api/events/:id", put(events::update).delete(events::delete))
        .route(
            "/api/participants",
            get(participants::list).post(participants::create),
        )
        .route(
            "/api/participants/:id",
            put(participants::update).delete(participants::delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}
