#![forbid(unsafe_code)]

use lendhub_server::{
    build_router, hash_password, new_salt, validate_startup_config, AppState, ServerConfig,
};
use lendhub_store::DocumentStore;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Seeds the first superadmin account when none with the configured email
/// exists yet. Without it a fresh database has no way in.
fn bootstrap_superadmin(state: &AppState) -> Result<(), String> {
    let (Some(email), Some(password)) = (
        state.config.bootstrap_admin_email.clone(),
        state.config.bootstrap_admin_password.clone(),
    ) else {
        return Ok(());
    };
    let existing = state
        .store
        .find_admin_by_email(&email)
        .map_err(|e| format!("bootstrap lookup failed: {e}"))?;
    if existing.is_some() {
        return Ok(());
    }
    let now = chrono::Utc::now();
    let salt = new_salt(1, now);
    let admin = lendhub_model::Admin {
        id: lendhub_model::AdminId::parse("admin-root")
            .map_err(|e| format!("bootstrap id invalid: {e}"))?,
        name: "Root".to_string(),
        phone: String::new(),
        email,
        password_hash: hash_password(&password, &salt),
        role: lendhub_model::AdminRole::Superadmin,
        permissions: lendhub_model::AdminPermissions::all(),
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .put_admin(&admin)
        .map_err(|e| format!("bootstrap write failed: {e}"))?;
    info!(admin = %admin.id, "bootstrap superadmin created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = ServerConfig {
        bind_addr: env::var("LENDHUB_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        db_path: PathBuf::from(
            env::var("LENDHUB_DB_PATH").unwrap_or_else(|_| "artifacts/lendhub.db".to_string()),
        ),
        max_body_bytes: env_usize("LENDHUB_MAX_BODY_BYTES", 64 * 1024),
        presence_poll_interval: env_duration_ms("LENDHUB_PRESENCE_POLL_MS", 5000),
        presence_staleness: env_duration_ms("LENDHUB_PRESENCE_STALENESS_MS", 15_000),
        token_ttl: env_duration_ms("LENDHUB_TOKEN_TTL_MS", 24 * 60 * 60 * 1000),
        token_secret: env::var("LENDHUB_TOKEN_SECRET").unwrap_or_default(),
        log_json: env_bool("LENDHUB_LOG_JSON", true),
        bootstrap_admin_email: env::var("LENDHUB_BOOTSTRAP_ADMIN_EMAIL").ok(),
        bootstrap_admin_password: env::var("LENDHUB_BOOTSTRAP_ADMIN_PASSWORD").ok(),
    };
    init_tracing(config.log_json);
    validate_startup_config(&config)?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("create db dir failed: {e}"))?;
    }
    let store =
        DocumentStore::open(&config.db_path).map_err(|e| format!("open store failed: {e}"))?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config);
    bootstrap_superadmin(&state)?;
    let app = build_router(state.clone());
    state.ready.store(true, Ordering::Relaxed);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("lendhub-server listening on {bind_addr}");
    let accepting = state.ready.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            accepting.store(false, Ordering::Relaxed);
            let drain_ms = env_u64("LENDHUB_SHUTDOWN_DRAIN_MS", 3000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
