use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::services::{AssistantService, OrganizerAdministration, TextGenerator};
use domain::store::{AccountStore, EventStore, ProfileStore};
use persistence::{
    AccountRepository, EventRepository, MemoryAccountStore, MemoryEventStore, MemoryProfileStore,
    ProfileRepository,
};
use shared::jwt::JwtError;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_user_auth,
    trace_id, RateLimiterState,
};
use crate::routes::{
    admin_organizers, assistant, auth, dashboard, events, health, registrations,
};
use crate::services::AuthService;

/// The storage backends behind the application.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<dyn EventStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub accounts: Arc<dyn AccountStore>,
    /// Present for the postgres backend; used by readiness checks.
    pub pool: Option<PgPool>,
}

impl Stores {
    /// Everything in process memory.
    pub fn in_memory() -> Self {
        Self {
            events: Arc::new(MemoryEventStore::new()),
            profiles: Arc::new(MemoryProfileStore::new()),
            accounts: Arc::new(MemoryAccountStore::new()),
            pool: None,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            events: Arc::new(EventRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventStore>,
    pub auth: AuthService,
    pub organizers: OrganizerAdministration,
    pub assistant: AssistantService,
    pub rate_limiter: Arc<RateLimiterState>,
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, JwtError> {
        let jwt = config.jwt.to_jwt_config()?;
        let auth = AuthService::new(stores.accounts.clone(), jwt);
        let organizers = OrganizerAdministration::new(Arc::new(auth.clone()), stores.profiles);
        let rate_limiter = Arc::new(RateLimiterState::new(
            config.security.assistant_rate_limit_per_minute,
        ));

        Ok(Self {
            config: Arc::new(config),
            events: stores.events,
            auth,
            organizers,
            assistant: AssistantService::new(generator),
            rate_limiter,
            pool: stores.pool,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/refresh", post(auth::refresh));

    let user_routes = Router::new()
        .route("/api/v1/auth/session", get(auth::session))
        .route("/api/v1/auth/sign-out", post(auth::sign_out))
        .route(
            "/api/v1/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/v1/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/v1/events/:event_id/status", post(events::change_status))
        .route(
            "/api/v1/events/:event_id/registrations",
            get(registrations::list_for_event).post(registrations::register),
        )
        .route(
            "/api/v1/events/:event_id/registrations/export",
            get(registrations::export_csv),
        )
        .route("/api/v1/me/registrations", get(registrations::list_mine))
        .route(
            "/api/v1/registrations/:registration_id",
            patch(registrations::edit_registration),
        )
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Auth runs first, then the per-user limit which needs the identity.
    let assistant_routes = Router::new()
        .route("/api/v1/assistant/describe", post(assistant::describe))
        .route("/api/v1/assistant/ask", post(assistant::ask))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/organizers",
            get(admin_organizers::list_organizers).post(admin_organizers::create_organizer),
        )
        .route(
            "/api/v1/admin/organizers/:organizer_id",
            put(admin_organizers::update_organizer).delete(admin_organizers::delete_organizer),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(assistant_routes)
        .merge(admin_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::MockTextGenerator;

    fn config() -> Config {
        Config::load_with_overrides(&[("jwt.secret", "app-test-secret-with-at-least-32-bytes")])
            .unwrap()
    }

    #[test]
    fn test_state_requires_jwt_material() {
        let config = Config::load_with_overrides(&[]).unwrap();
        let result = AppState::new(
            config,
            Stores::in_memory(),
            Arc::new(MockTextGenerator::new("ok")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_app_with_memory_stores() {
        let state = AppState::new(
            config(),
            Stores::in_memory(),
            Arc::new(MockTextGenerator::new("ok")),
        )
        .unwrap();
        assert!(state.pool.is_none());
        let _router = create_app(state);
    }
}
