#![forbid(unsafe_code)]
//! HTTP and WebSocket surface of the loan platform.
//!
//! `AppState` owns every shared object explicitly — store, notification hub,
//! presence registry — and is cloned into handlers; nothing lives in a
//! global.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use lendhub_store::DocumentStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

mod auth;
mod config;
mod http;
mod notify;
mod presence;
mod services;


pub use auth::{hash_password, new_salt, PrincipalKind, TokenClaims};
pub use config::{validate_startup_config, ServerConfig};
pub use notify::{Notification, NotificationEvent, NotificationHub, MAX_BACKLOG};
pub use presence::PresenceRegistry;

pub const CRATE_NAME: &str = "lendhub-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub config: Arc<ServerConfig>,
    pub hub: Arc<NotificationHub>,
    pub presence: Arc<PresenceRegistry>,
    pub ready: Arc<AtomicBool>,
    seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: DocumentStore, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            hub: Arc::new(NotificationHub::new()),
            presence: Arc::new(PresenceRegistry::new()),
            ready: Arc::new(AtomicBool::new(false)),
            seed: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn next_seed(&self) -> u64 {
        self.seed.fetch_add(1, Ordering::Relaxed)
    }

    /// Collision-free record ids: wall-clock millis plus a process-local
    /// counter.
    pub(crate) fn next_id(&self, prefix: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        format!("{prefix}-{millis:x}{:04x}", self.next_seed() & 0xffff)
    }

    pub(crate) fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(24))
    }

    pub(crate) fn presence_staleness(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.presence_staleness).unwrap_or_else(|_| {
            chrono::Duration::seconds(lendhub_core::DEFAULT_STALENESS_SECS)
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz))
        .route("/readyz", get(http::handlers::readyz))
        .route("/api/auth/admin/login", post(http::handlers::admin_login))
        .route("/api/auth/user/login", post(http::handlers::user_login))
        .route("/api/quotes", get(http::handlers::quote))
        .route("/api/me", get(http::handlers::me))
        .route("/api/me/profile", put(http::handlers::update_me_profile))
        .route("/api/me/wallet", get(http::handlers::me_wallet))
        .route(
            "/api/me/loans",
            get(http::handlers::my_loans).post(http::handlers::apply_loan),
        )
        .route(
            "/api/me/withdrawals",
            get(http::handlers::my_withdrawals).post(http::handlers::request_withdrawal),
        )
        .route("/api/me/presence", get(http::handlers::my_presence))
        .route("/api/me/ws", get(http::ws::user_ws))
        .route(
            "/api/admin/users",
            get(http::handlers::list_users).post(http::handlers::create_user),
        )
        .route(
            "/api/admin/users/{id}",
            get(http::handlers::get_user)
                .put(http::handlers::update_user)
                .delete(http::handlers::delete_user),
        )
        .route(
            "/api/admin/users/{id}/presence",
            get(http::handlers::user_presence),
        )
        .route("/api/admin/loans", get(http::handlers::list_loans))
        .route(
            "/api/admin/loans/{id}",
            get(http::handlers::get_loan).delete(http::handlers::delete_loan),
        )
        .route(
            "/api/admin/loans/{id}/status",
            put(http::handlers::update_loan_status),
        )
        .route(
            "/api/admin/withdrawals",
            get(http::handlers::list_withdrawals),
        )
        .route(
            "/api/admin/withdrawals/{id}/resolve",
            put(http::handlers::resolve_withdrawal),
        )
        .route(
            "/api/admin/transactions",
            get(http::handlers::list_transactions),
        )
        .route(
            "/api/admin/interest-rates",
            get(http::handlers::list_rates).post(http::handlers::create_rate),
        )
        .route(
            "/api/admin/interest-rates/{id}",
            put(http::handlers::update_rate).delete(http::handlers::delete_rate),
        )
        .route(
            "/api/admin/admins",
            get(http::handlers::list_admins).post(http::handlers::create_admin),
        )
        .route(
            "/api/admin/admins/{id}",
            axum::routing::delete(http::handlers::delete_admin),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn state_with_secret(secret: &str) -> AppState {
        let store = DocumentStore::open_in_memory().expect("in-memory store");
        let config = ServerConfig {
            token_secret: secret.to_string(),
            ..ServerConfig::default()
        };
        AppState::new(store, config)
    }
}
