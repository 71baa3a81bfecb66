use std::time::Duration;

use crate::baas::BaasClient;
use crate::config::Config;
use crate::generation::GenerationClient;
use crate::spaces::join::PollPolicy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationClient,
    /// Project-scoped client; handlers derive a session-scoped copy per request.
    pub baas: BaasClient,
    pub config: Config,
    /// Join-code execution poll: 10 attempts, 500ms apart.
    pub join_poll: PollPolicy,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let generation = GenerationClient::new(
            &config.generation_api_url,
            Duration::from_secs(config.generation_timeout_secs),
        );
        let baas = BaasClient::new(
            &config.baas_endpoint,
            &config.baas_project_id,
            config.baas_api_key.clone(),
            &config.baas_database_id,
            &config.baas_bucket_id,
        );
        Self {
            generation,
            baas,
            config,
            join_poll: PollPolicy::default(),
        }
    }
}
