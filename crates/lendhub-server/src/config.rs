use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub max_body_bytes: usize,
    /// Client poll fallback cadence; the staleness window below is expressed
    /// in multiples of this.
    pub presence_poll_interval: Duration,
    /// How long socket-derived presence evidence stays trustworthy.
    pub presence_staleness: Duration,
    pub token_ttl: Duration,
    pub token_secret: String,
    pub log_json: bool,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: PathBuf::from("artifacts/lendhub.db"),
            max_body_bytes: 64 * 1024,
            presence_poll_interval: Duration::from_secs(5),
            presence_staleness: Duration::from_secs(15),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            token_secret: String::new(),
            log_json: true,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

pub fn validate_startup_config(config: &ServerConfig) -> Result<(), String> {
    if config.max_body_bytes == 0 {
        return Err("max_body_bytes must be > 0".to_string());
    }
    if config.token_ttl.is_zero() {
        return Err("token_ttl must be > 0".to_string());
    }
    if config.token_secret.trim().is_empty() {
        return Err("token_secret must be set (LENDHUB_TOKEN_SECRET)".to_string());
    }
    if config.presence_staleness < config.presence_poll_interval {
        return Err("presence_staleness must be >= presence_poll_interval".to_string());
    }
    if config.bootstrap_admin_email.is_some() != config.bootstrap_admin_password.is_some() {
        return Err(
            "bootstrap admin requires both email and password or neither".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServerConfig {
        ServerConfig {
            token_secret: "secret".to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn default_config_needs_a_secret() {
        let err = validate_startup_config(&ServerConfig::default()).expect_err("no secret");
        assert!(err.contains("token_secret"));
        assert!(validate_startup_config(&valid()).is_ok());
    }

    #[test]
    fn staleness_must_cover_poll_interval() {
        let config = ServerConfig {
            presence_staleness: Duration::from_secs(2),
            ..valid()
        };
        let err = validate_startup_config(&config).expect_err("staleness too short");
        assert!(err.contains("presence_staleness"));
    }

    #[test]
    fn bootstrap_admin_is_all_or_nothing() {
        let config = ServerConfig {
            bootstrap_admin_email: Some("root@lendhub.local".to_string()),
            ..valid()
        };
        let err = validate_startup_config(&config).expect_err("missing password");
        assert!(err.contains("bootstrap admin"));
    }
}
