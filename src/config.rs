//! Service configuration, loaded from environment variables at startup.

/// Runtime configuration shared by the gateway and the `dbgate` companion.
///
/// Every field has a default so both binaries run out-of-the-box against a
/// local PostgreSQL and a local llama-server.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,

    /// TCP address the gateway binds (default `"0.0.0.0:5000"`).
    pub bind: String,

    /// TCP address the `dbgate` companion binds (default `"0.0.0.0:5001"`).
    pub gate_bind: String,

    /// Local port llama-server listens on.
    pub llama_port: u16,

    /// Explicit path to the llama-server executable. When unset the
    /// supervisor searches well-known locations and `PATH`.
    pub llama_server_path: Option<String>,

    /// GGUF model file passed to llama-server with `-m`.
    pub llama_model_path: String,

    /// Session-signing secret. Carried in the configuration surface but not
    /// used by any current flow.
    pub secret_key: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,hyper=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            db_host: env_or("DB_HOST", "localhost"),
            db_port: parse_env("DB_PORT", 5432),
            db_user: env_or("DB_USER", "postgres"),
            db_password: env_or("DB_PASSWORD", "postgres"),
            db_name: env_or("DB_NAME", "test"),
            bind: env_or("PGPILOT_BIND", "0.0.0.0:5000"),
            gate_bind: env_or("DBGATE_BIND", "0.0.0.0:5001"),
            llama_port: parse_env("LLAMA_SERVER_PORT", 8080),
            llama_server_path: std::env::var("LLAMA_SERVER_PATH").ok(),
            llama_model_path: env_or("LLAMA_MODEL_PATH", "llama-3.2-3b-instruct-q8_0.gguf"),
            secret_key: env_or("PGPILOT_SECRET_KEY", "dev-secret-key-change-in-production"),
            log_level: env_or("PGPILOT_LOG", "info"),
            log_json: std::env::var("PGPILOT_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Base URL of the local llama-server completion API.
    pub fn llama_base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.llama_port)
    }

    /// Connection string for a fresh PostgreSQL session.
    pub fn pg_conn_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.db_host, self.db_port, self.db_name, self.db_user, self.db_password
        )
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Config {
        Config {
            db_host: "db.internal".into(),
            db_port: 5433,
            db_user: "app".into(),
            db_password: "hunter2".into(),
            db_name: "prod".into(),
            bind: "0.0.0.0:5000".into(),
            gate_bind: "0.0.0.0:5001".into(),
            llama_port: 8080,
            llama_server_path: None,
            llama_model_path: "model.gguf".into(),
            secret_key: "secret".into(),
            log_level: "info".into(),
            log_json: false,
        }
    }

    #[test]
    fn llama_base_url_uses_loopback_and_port() {
        assert_eq!(sample().llama_base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn conn_string_contains_all_fields() {
        let s = sample().pg_conn_string();
        assert_eq!(
            s,
            "host=db.internal port=5433 dbname=prod user=app password=hunter2"
        );
    }
}
