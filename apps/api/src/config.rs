use anyhow::{Context, Result};

const DEFAULT_GENERATION_API_URL: &str = "https://prospace-4d2a452088b6.herokuapp.com";
const DEFAULT_BAAS_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Application configuration loaded from environment variables.
/// Only the BaaS project id is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation_api_url: String,
    pub generation_timeout_secs: u64,
    pub baas_endpoint: String,
    pub baas_project_id: String,
    pub baas_api_key: Option<String>,
    pub baas_database_id: String,
    pub baas_bucket_id: String,
    pub join_function_id: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            generation_api_url: env_or("GENERATION_API_URL", DEFAULT_GENERATION_API_URL),
            generation_timeout_secs: env_or("GENERATION_TIMEOUT_SECS", "90")
                .parse::<u64>()
                .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?,
            baas_endpoint: env_or("BAAS_ENDPOINT", DEFAULT_BAAS_ENDPOINT),
            baas_project_id: require_env("BAAS_PROJECT_ID")?,
            baas_api_key: std::env::var("BAAS_API_KEY").ok().filter(|k| !k.is_empty()),
            baas_database_id: env_or("BAAS_DATABASE_ID", "learning_spaces"),
            baas_bucket_id: env_or("BAAS_BUCKET_ID", "files"),
            join_function_id: env_or("JOIN_FUNCTION_ID", "joinTeam"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Config pointing both remote services at the given base URLs.
    pub fn for_tests(generation_api_url: &str, baas_endpoint: &str) -> Self {
        Config {
            generation_api_url: generation_api_url.to_string(),
            generation_timeout_secs: 5,
            baas_endpoint: baas_endpoint.to_string(),
            baas_project_id: "test-project".to_string(),
            baas_api_key: None,
            baas_database_id: "learning_spaces".to_string(),
            baas_bucket_id: "files".to_string(),
            join_function_id: "joinTeam".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
