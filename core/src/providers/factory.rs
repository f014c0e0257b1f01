use crate::config::Config;
use crate::providers::OpenAIClient;
use crate::providers::openai::build_http_client;
use crate::traits::ModelClient;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Builds the model client named by `config.provider`. All supported
/// providers speak the chat-completions protocol.
pub fn create_client(config: &Config) -> Result<Arc<dyn ModelClient>> {
    let provider_name = config.provider.as_deref().unwrap_or("openai");

    let (api_key, default_base_url) = match provider_name.to_lowercase().as_str() {
        "openai" => (
            resolve_api_key_with_fallback(&["OPENAI_API_KEY", "ABACUS_API_KEY"], &config.api_key)?,
            None,
        ),
        "openrouter" => (
            resolve_api_key_with_fallback(
                &["OPENROUTER_API_KEY", "ABACUS_API_KEY"],
                &config.api_key,
            )?,
            Some(OPENROUTER_BASE_URL),
        ),
        "ollama" => (
            resolve_api_key_with_fallback(&["ABACUS_API_KEY"], &config.api_key)
                .unwrap_or_else(|_| "ollama".to_string()),
            Some(OLLAMA_BASE_URL),
        ),
        _ => {
            return Err(anyhow!(
                "Unknown provider: {}. Available: openai, openrouter, ollama",
                provider_name
            ));
        }
    };

    let timeout_secs = config.agent.model_timeout_secs;
    let http = build_http_client(config.proxy_url().as_deref(), timeout_secs);
    let mut client = OpenAIClient::with_http_client(api_key, http)
        .with_model(config.model.clone())
        .with_temperature(config.temperature)
        .with_timeout(Duration::from_secs(timeout_secs));

    if let Some(base_url) = config.base_url.as_deref().or(default_base_url) {
        client = client.with_base_url(base_url);
    }

    Ok(Arc::new(client))
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.trim().is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set {} or run 'abacus init'.",
            env_vars.join(" or ")
        ))
    }
}
