use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // AI provider
    pub openrouter_api_key: String,
    pub briefing_model: String,

    // Release tracking
    pub github_token: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Trigger auth + CORS
    pub trigger_secret: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,

    /// Hours between in-process scheduled runs. `None` leaves scheduling to
    /// an external timer hitting the scheduled entry point.
    pub briefing_interval_hours: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            openrouter_api_key: required_env("OPENROUTER_API_KEY"),
            briefing_model: env::var("BRIEFING_MODEL")
                .unwrap_or_else(|_| "anthropic/claude-3.5-haiku".to_string()),
            github_token: required_env("GITHUB_TOKEN"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            trigger_secret: required_env("TRIGGER_SECRET"),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()),
            briefing_interval_hours: env::var("BRIEFING_INTERVAL_HOURS")
                .ok()
                .map(|v| v.parse().expect("BRIEFING_INTERVAL_HOURS must be a number")),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
