use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub admin_username: String,
    /// Salted SHA-256 of the admin password, lowercase hex.
    pub admin_password_hash: String,
    pub password_salt: String,
    pub session_ttl_secs: u64,
    pub scraper_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub microlink_api_key: Option<String>,
    pub headless_enabled: bool,
    pub extract_timeout_secs: u64,
    pub extract_max_body_bytes: usize,
    pub extract_user_agent: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("admin_username", &self.admin_username)
            .field("database_url", &"[redacted]")
            .field("admin_password_hash", &"[redacted]")
            .field("password_salt", &"[redacted]")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field(
                "scraper_api_key",
                &self.scraper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "serper_api_key",
                &self.serper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "microlink_api_key",
                &self.microlink_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("headless_enabled", &self.headless_enabled)
            .field("extract_timeout_secs", &self.extract_timeout_secs)
            .field("extract_max_body_bytes", &self.extract_max_body_bytes)
            .field("extract_user_agent", &self.extract_user_agent)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
