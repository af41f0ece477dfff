//! Configuration management with file persistence

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::completions::{CompletionSettings, Engine};

/// Environment variable holding the API key
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// gptcall configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: CompletionDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Stored API key, used when `use_env_key` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Read the key from OPENAI_API_KEY instead of the stored value
    pub use_env_key: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Completion parameters used when the caller does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionDefaults {
    pub engine: Engine,
    pub settings: CompletionSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                api_key: None,
                use_env_key: true,
                timeout_secs: 30,
            },
            defaults: CompletionDefaults {
                engine: Engine::Davinci,
                settings: CompletionSettings::default(),
            },
        }
    }
}

impl ApiConfig {
    /// Resolve the API key from the selected source
    ///
    /// Reads OPENAI_API_KEY when `use_env_key` is set, otherwise the stored
    /// value. Resolution happens at call time; nothing is cached.
    pub fn resolved_api_key(&self) -> anyhow::Result<String> {
        let key = if self.use_env_key {
            env::var(API_KEY_ENV_VAR).ok()
        } else {
            self.api_key.clone()
        };

        key.filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "Api key is not set. Export {} or run `gptcall config set-key`.",
                API_KEY_ENV_VAR
            )
        })
    }

    /// Redacted form of the resolved key for display
    pub fn redacted_api_key(&self) -> Option<String> {
        self.resolved_api_key().ok().map(|key| {
            if key.len() <= 4 {
                "***".to_string()
            } else {
                let suffix = &key[key.len() - 4..];
                format!("***{}", suffix)
            }
        })
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("GPTCALL_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("gptcall")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        let settings = &self.defaults.settings;
        if settings.max_tokens == 0 || settings.max_tokens >= 2048 {
            return Err(anyhow!("default max_tokens must be within 0 and 2048"));
        }
        if settings.best_of < settings.num_completions {
            return Err(anyhow!(
                "default best_of must be at least num_completions"
            ));
        }
        Ok(())
    }
}
