use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Delay between emitted tokens of the simulated response stream.
    pub stream_delay_ms: u64,
    /// Whether to boot with a pre-populated demo conversation.
    pub seed_conversation: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Ok(Settings {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|e| format!("Invalid SERVER_PORT: {}", e))?,
            },
            app: AppConfig {
                stream_delay_ms: env::var("STREAM_DELAY_MS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                seed_conversation: env::var("SEED_CONVERSATION")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
            },
        })
    }
}
