use anyhow::Context;
use axum::{
    routing::{get, patch, post},
    Router,
};
use persistence::repositories::{FeatureFlagRepository, OrganizationRepository, UserRepository};
use shared::jwt::JwtKeys;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{auth, feature_flags, health};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn user_repository(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn organization_repository(&self) -> OrganizationRepository {
        OrganizationRepository::new(self.pool.clone())
    }

    pub fn feature_flag_repository(&self) -> FeatureFlagRepository {
        FeatureFlagRepository::new(self.pool.clone())
    }
}

/// Builds signing keys from configuration.
///
/// A PEM value selects RS256; anything else is taken as an HS256 shared
/// secret for local development.
fn build_jwt_keys(config: &Config) -> anyhow::Result<JwtKeys> {
    if config.jwt.uses_rsa() {
        JwtKeys::from_rsa_pem(
            &config.jwt.normalized_private_key(),
            &config.jwt.normalized_public_key(),
            config.jwt.token_expiry_secs,
        )
        .context("Invalid JWT key configuration")
    } else {
        tracing::warn!("JWT key is not PEM; falling back to HS256 shared-secret mode");
        Ok(JwtKeys::from_secret(
            &config.jwt.private_key,
            config.jwt.token_expiry_secs,
        ))
    }
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);
    let jwt = Arc::new(build_jwt_keys(&config)?);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
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
    };

    let router = Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/health", get(health::health_check))
        .route(
            "/organizations/:organization_id/feature-flags",
            get(feature_flags::list_feature_flags).post(feature_flags::create_feature_flag),
        )
        .route(
            "/organizations/:organization_id/feature-flags/:feature_flag_id",
            patch(feature_flags::patch_feature_flag).delete(feature_flags::delete_feature_flag),
        )
        .route(
            "/organizations/:organization_id/feature-flags/:feature_flag_id/revisions/:revision_id/approve",
            post(feature_flags::approve_revision),
        )
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(router)
}
