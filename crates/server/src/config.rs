//! Server configuration loaded from environment variables.

use std::path::PathBuf;

/// Process configuration.
///
/// All fields have defaults suitable for local development; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Sink address for the downstream insert event. When unset, the
    /// insert event targets this service's own inbound address, matching
    /// the bus convention of replying into the inbound context.
    pub sink: Option<String>,
    /// Directory holding the detector and recognition model files.
    pub model_dir: PathBuf,
    /// Number of face workers (default: `4`). Fixed for process lifetime.
    pub pool_size: usize,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `HOST`                 | `0.0.0.0`        |
    /// | `PORT`                 | `8080`           |
    /// | `K_SINK`               | unset            |
    /// | `MODEL_DIR`            | `/opt/enroller`  |
    /// | `POOL_SIZE`            | `4`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let sink = std::env::var("K_SINK").ok().filter(|s| !s.is_empty());

        let model_dir =
            PathBuf::from(std::env::var("MODEL_DIR").unwrap_or_else(|_| "/opt/enroller".into()));

        let pool_size: usize = std::env::var("POOL_SIZE")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("POOL_SIZE must be a valid usize");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            sink,
            model_dir,
            pool_size,
            request_timeout_secs,
        }
    }

    /// The effective sink address: the configured one, or this service's
    /// own inbound address when none is set.
    pub fn effective_sink(&self) -> String {
        match &self.sink {
            Some(sink) => sink.clone(),
            None => format!("http://127.0.0.1:{}/", self.port),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_sink(sink: Option<&str>) -> ServerConfig {
        ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            sink: sink.map(String::from),
            model_dir: "/opt/enroller".into(),
            pool_size: 4,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn configured_sink_wins() {
        let config = config_with_sink(Some("http://broker.local/insert"));
        assert_eq!(config.effective_sink(), "http://broker.local/insert");
    }

    #[test]
    fn missing_sink_defaults_to_own_address() {
        let config = config_with_sink(None);
        assert_eq!(config.effective_sink(), "http://127.0.0.1:8080/");
    }
}
