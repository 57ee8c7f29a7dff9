use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables holding agent addresses when no config file is available
pub const FALLBACK_ENV_VARS: &[&str] = &["AIR_AGENT_URL", "WEA_AGENT_URL"];

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaypointConfig {
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// A remote agent address. `${VAR}` placeholders in `url` are expanded at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    #[serde(default)]
    pub name: String,
    pub url: String,
}

// ── Server Config ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory of static UI files; auto-detected when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8083".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

// ── Routing Config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Timeout for card fetches and delegated calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `./config.toml` if present, else `config.toml` one level above the executable's directory
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("..").join(CONFIG_FILE_NAME)))
        .unwrap_or(local)
}

impl WaypointConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path.clone().unwrap_or_else(default_config_path);
        let mut config = Self::read(&path)?;
        config.expand_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        debug!("Read {} agent entries from {}", config.agents.len(), path.display());
        Ok(config)
    }

    /// Config with default settings and agent addresses taken from `FALLBACK_ENV_VARS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let agents = FALLBACK_ENV_VARS
            .iter()
            .map(|&var| AgentEntry {
                name: var.to_string(),
                url: lookup(var).unwrap_or_default(),
            })
            .collect();
        Self {
            agents,
            ..Default::default()
        }
    }

    /// Replace `${VAR}` placeholders in every agent URL
    fn expand_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for agent in &mut self.agents {
            agent.url = expand_vars(&agent.url, &lookup);
        }
    }

    pub fn agent_urls(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.url.clone()).collect()
    }
}

/// Expand every `${VAR}` in `s`. Unknown variables expand to the empty string; an
/// unterminated `${` is left as is.
pub fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        let Some(start) = result[pos..].find("${") else {
            break;
        };
        let abs_start = pos + start;
        let Some(end) = result[abs_start..].find('}') else {
            break;
        };
        let var_name = &result[abs_start + 2..abs_start + end];
        let value = lookup(var_name).unwrap_or_default();
        let value_len = value.len();
        result = format!(
            "{}{}{}",
            &result[..abs_start],
            value,
            &result[abs_start + end + 1..]
        );
        pos = abs_start + value_len; // Skip past the expanded value
    }
    result
}
