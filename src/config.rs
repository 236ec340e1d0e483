use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::projects::introspect::IntrospectionFailurePolicy;
use crate::projects::query::QueryLimits;
use crate::projects::DEFAULT_API_URL;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub github: Option<GitHubConfig>,
    #[serde(default)]
    pub limits: QueryLimits,
    #[serde(default)]
    pub on_introspection_failure: IntrospectionFailurePolicy,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl AppConfig {
    pub fn api_url(&self) -> String {
        self.github
            .as_ref()
            .and_then(|g| g.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".project-lens")
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

/// Token from config, then `GITHUB_TOKEN`, then the `gh` CLI.
pub async fn resolve_token(config: &AppConfig) -> Result<String> {
    if let Some(token) = config
        .github
        .as_ref()
        .and_then(|g| g.token.clone())
        .filter(|t| !t.trim().is_empty())
    {
        return Ok(token);
    }
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(token);
        }
    }

    let output = tokio::process::Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .context("No token configured and failed to run gh CLI")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("gh auth token failed: {stderr}");
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        bail!("No GitHub token found. Set github.token in ~/.project-lens/config.toml or GITHUB_TOKEN");
    }
    Ok(token)
}
