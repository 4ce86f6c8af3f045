//! Budgenus API Server
//!
//! Multi-tenant budgeting backend: tenants resolved from the request host,
//! JWT accounts, invitations and trial/subscription gating.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

use adapters::{
    MailTransport, PostgresAddressRepository, PostgresDomainRepository,
    PostgresInvitationRepository, PostgresRevokedTokenRepository, PostgresSchemaManager,
    PostgresTenantRepository, PostgresUserRepository,
};
use app::{
    AccountService, AuthService, InvitationService, InvitationSettings, TenantService,
    TenantSettings,
};
use auth::JwtKeys;
use config::Config;

pub type Tenants = TenantService<
    PostgresTenantRepository,
    PostgresDomainRepository,
    PostgresUserRepository,
    PostgresSchemaManager,
>;
pub type Accounts = AccountService<
    PostgresUserRepository,
    PostgresAddressRepository,
    PostgresInvitationRepository,
    Tenants,
>;
pub type Invitations = InvitationService<
    PostgresInvitationRepository,
    PostgresTenantRepository,
    PostgresUserRepository,
    MailTransport,
>;
pub type Auth = AuthService<PostgresUserRepository, PostgresRevokedTokenRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tenant_service: Arc<Tenants>,
    pub account_service: Arc<Accounts>,
    pub invitation_service: Arc<Invitations>,
    pub auth_service: Arc<Auth>,
    pub config: Config,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Periodically expire stale invitations and purge revoked refresh tokens
fn spawn_sweeper(state: AppState) {
    let period = Duration::from_secs(state.config.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let now = Utc::now();

            match state.invitation_service.expire_stale(now).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "Expired stale invitations"),
                Err(e) => tracing::warn!(error = %e, "Invitation sweep failed"),
            }
            match state.auth_service.purge_revoked(now).await {
                Ok(0) => {}
                Ok(count) => tracing::debug!(count, "Purged revoked tokens"),
                Err(e) => tracing::warn!(error = %e, "Revoked token purge failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,budgenus_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Budgenus API...");

    let config = Config::from_env();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let schemas = Arc::new(PostgresSchemaManager::new(db.clone()));
    if config.run_migrations {
        schemas
            .migrate()
            .await
            .context("Failed to apply public schema migration")?;
        tracing::info!("Public schema migrated");
    }

    // Adapters
    let tenant_repo = Arc::new(PostgresTenantRepository::new(db.clone()));
    let domain_repo = Arc::new(PostgresDomainRepository::new(db.clone()));
    let user_repo = Arc::new(PostgresUserRepository::new(db.clone()));
    let address_repo = Arc::new(PostgresAddressRepository::new(db.clone()));
    let invitation_repo = Arc::new(PostgresInvitationRepository::new(db.clone()));
    let revoked_repo = Arc::new(PostgresRevokedTokenRepository::new(db.clone()));
    let mailer = Arc::new(MailTransport::from_relay(
        config.mail_relay_url.clone(),
        config.mail_relay_token.clone(),
    ));
    tracing::info!(transport = mailer.name(), "Mail transport ready");
    if !config.mail_relay_enabled() {
        tracing::warn!("MAIL_RELAY_URL not set; invitation mail is only logged");
    }

    // Application services
    let tenant_service = Arc::new(TenantService::new(
        tenant_repo.clone(),
        domain_repo,
        user_repo.clone(),
        schemas,
        TenantSettings {
            base_domain: config.base_domain.clone(),
            trial_days: config.trial_days,
            auto_drop_schema: config.auto_drop_schema,
        },
    ));

    let account_service = Arc::new(AccountService::new(
        user_repo.clone(),
        address_repo,
        invitation_repo.clone(),
        tenant_service.clone(),
    ));

    let invitation_service = Arc::new(InvitationService::new(
        invitation_repo,
        tenant_repo,
        user_repo.clone(),
        mailer,
        InvitationSettings {
            frontend_url: config.frontend_url.clone(),
            from_email: config.default_from_email.clone(),
            ttl_days: config.invitation_ttl_days,
        },
    ));

    let auth_service = Arc::new(AuthService::new(
        user_repo,
        revoked_repo,
        JwtKeys::new(
            &config.jwt_secret,
            config.access_token_minutes,
            config.refresh_token_days,
        ),
    ));

    if let (Some(email), Some(password)) = (
        config.bootstrap_superuser_email.as_deref(),
        config.bootstrap_superuser_password.as_deref(),
    ) {
        match account_service.bootstrap_superuser(email, password).await {
            Ok(Some(user)) => tracing::info!(user_id = %user.id, "Superuser created"),
            Ok(None) => tracing::debug!("Superuser already present"),
            Err(e) => tracing::warn!(error = %e, "Could not create superuser"),
        }
    }

    let state = AppState {
        tenant_service,
        account_service,
        invitation_service,
        auth_service,
        config: config.clone(),
    };

    // Rate limiting config: 2 req/sec sustained, burst of 5 per peer IP
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    // Credential endpoints
    let rate_limited_routes = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/token", post(handlers::login))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Served only on a tenant host. Layers run bottom-up: resolve the host,
    // authenticate, then check membership and subscription.
    let tenant_routes = Router::new()
        .route("/api/tenant", get(handlers::current_tenant))
        .route(
            "/api/tenant/users",
            get(handlers::list_members).post(handlers::create_member),
        )
        .route(
            "/api/tenant/users/:id",
            get(handlers::get_member)
                .patch(handlers::update_member)
                .delete(handlers::delete_member),
        )
        .route("/api/tenant/addresses", get(handlers::list_addresses))
        .route_layer(middleware::from_fn(auth::tenant_access_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::tenant_middleware,
        ));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        // Own account
        .route(
            "/api/users/me",
            get(handlers::get_me)
                .patch(handlers::update_me)
                .delete(handlers::delete_me),
        )
        .route(
            "/api/users/me/address",
            put(handlers::set_my_address).delete(handlers::clear_my_address),
        )
        // Tenant administration
        .route(
            "/api/tenants",
            get(handlers::list_tenants).post(handlers::create_tenant),
        )
        .route(
            "/api/tenants/:id",
            get(handlers::get_tenant)
                .patch(handlers::update_tenant)
                .delete(handlers::delete_tenant),
        )
        .route("/api/tenants/:id/trial", post(handlers::start_trial))
        // Domains
        .route(
            "/api/domains",
            get(handlers::list_domains).post(handlers::create_domain),
        )
        .route(
            "/api/domains/:id",
            get(handlers::get_domain).delete(handlers::delete_domain),
        )
        .route("/api/domains/:id/primary", post(handlers::make_primary))
        // Invitations
        .route(
            "/api/invitations",
            get(handlers::list_invitations).post(handlers::create_invitation),
        )
        .route(
            "/api/invitations/:id",
            get(handlers::get_invitation).delete(handlers::delete_invitation),
        )
        .route(
            "/api/invitations/:id/resend",
            post(handlers::resend_invitation),
        )
        .route(
            "/api/invitations/:id/accept",
            post(handlers::accept_invitation),
        )
        .route(
            "/api/invitations/:id/decline",
            post(handlers::decline_invitation),
        )
        // Route layers leave unknown paths to the fallback
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Anonymous callers allowed; a valid token stores the preference
    let language_routes = Router::new()
        .route(
            "/api/language",
            get(handlers::get_language).post(handlers::set_language),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/auth/token/refresh", post(handlers::refresh))
        .merge(rate_limited_routes)
        .merge(language_routes)
        .merge(tenant_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(auth::language_middleware))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    spawn_sweeper(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
