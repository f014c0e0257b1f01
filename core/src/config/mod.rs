use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ABACUS_DIR: &str = ".abacus";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MemoryConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Tool round trips allowed per turn.
    pub max_round_trips: usize,
    pub model_timeout_secs: u64,
    pub parallel_tools: bool,
    pub allow_empty_tool_calls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_round_trips: 10,
            model_timeout_secs: 120,
            parallel_tools: true,
            allow_empty_tool_calls: false,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// `host:port` of an HTTP proxy; `PROXY` in the environment is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub agent: AgentConfig,
    pub memory: MemoryConfig,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o".to_string(),
            temperature: None,
            proxy: None,
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
            data_dir: get_abacus_dir(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.agent.model_timeout_secs == 0 {
            anyhow::bail!("agent.model_timeout_secs must be greater than 0");
        }
        config.data_dir = get_abacus_dir();
        Ok(config)
    }

    /// Proxy URL for the HTTP client, from config or the `PROXY` variable.
    pub fn proxy_url(&self) -> Option<String> {
        resolve_proxy(self.proxy.as_deref(), std::env::var("PROXY").ok())
    }
}

fn resolve_proxy(configured: Option<&str>, env: Option<String>) -> Option<String> {
    configured
        .map(str::to_string)
        .or(env)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.contains("://") {
                p
            } else {
                format!("http://{}", p)
            }
        })
}

pub fn get_abacus_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(ABACUS_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_abacus_dir().join("config.toml")
}

pub fn ensure_abacus_dir() -> Result<PathBuf> {
    let abacus_dir = get_abacus_dir();

    if !abacus_dir.exists() {
        std::fs::create_dir_all(&abacus_dir).with_context(|| {
            format!(
                "Failed to create abacus directory at {}",
                abacus_dir.display()
            )
        })?;
    }

    Ok(abacus_dir)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("Config file not found. Run 'abacus init' to set up your configuration.")
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_abacus_dir()?;

    let config_path = get_config_path();
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}
