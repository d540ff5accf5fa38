//! Configuration: defaults, then `config.toml`, then environment.

pub mod schema;

pub use schema::{Config, ModelConfig, ServerConfig, UploadConfig};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "transchat", "transchat")
}

/// `<config dir>/config.toml`, if a home directory can be resolved.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// `<data dir>/conversations.json`, or the working directory as a last resort.
pub fn default_conversations_path() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().join("conversations.json"))
        .unwrap_or_else(|| PathBuf::from("conversations.json"))
}

impl Config {
    /// Load configuration. An explicit `path` must exist; the default path is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(raw)?;
        config.uploads.dir = shellexpand::tilde(&config.uploads.dir).to_string();
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("TRANSCHAT_API_KEY").or_else(|| lookup("DEEPSEEK_API_KEY")) {
            self.model.api_key = Some(key);
        }
        if let Some(url) = lookup("TRANSCHAT_API_URL") {
            self.model.api_url = url;
        }
        if let Some(model) = lookup("TRANSCHAT_MODEL") {
            self.model.model = model;
        }
        if let Some(secs) = lookup("TRANSCHAT_REQUEST_TIMEOUT_SECS") {
            self.model.request_timeout_secs = secs
                .trim()
                .parse()
                .context("TRANSCHAT_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().context("PORT must be a valid port number")?;
        }
        if let Some(dir) = lookup("TRANSCHAT_UPLOAD_DIR") {
            self.uploads.dir = shellexpand::tilde(&dir).to_string();
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.request_timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.model
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// JSON Schema of the config file.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
