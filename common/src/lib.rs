/*!
common/src/lib.rs

Shared configuration types for PostLens.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file, with default + override merging
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (e.g. "0.0.0.0")
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Post source (oEmbed provider) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// oEmbed endpoint base URL; defaults to the public publish.twitter.com endpoint
    pub oembed_url: Option<String>,
    /// URL prefixes a post reference must start with to be accepted
    #[serde(default = "default_allowed_prefixes")]
    pub allowed_prefixes: Vec<String>,
    pub fetch_timeout_seconds: Option<u64>,
}

fn default_allowed_prefixes() -> Vec<String> {
    vec![
        "https://twitter.com/".to_string(),
        "https://x.com/".to_string(),
    ]
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            oembed_url: None,
            allowed_prefixes: default_allowed_prefixes(),
            fetch_timeout_seconds: None,
        }
    }
}

/// Remote LLM endpoint config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
}

/// LLM top-level config grouping remote specifics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    // Fallback: single remote config
    pub remote: Option<RemoteLlmConfig>,
    // Task-specific configs
    pub sentiment: Option<RemoteLlmConfig>,
    pub summary: Option<RemoteLlmConfig>,
}

/// Tabular store (spreadsheet append) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// API base URL; defaults to the Google Sheets v4 values endpoint
    pub api_url: Option<String>,
    /// Name of the env var holding the bearer token for the append call
    pub api_token_env: Option<String>,
    pub spreadsheet_id: String,
    /// Target range, sheet name + column span (e.g. "Sheet1!A:F")
    pub range: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    pub llm: Option<LlmConfig>,
    pub sheet: SheetConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_string() {
        // Minimal TOML to test parsing
        let toml = r#"
            [server]
            bind = "127.0.0.1"
            port = 5000

            [source]
            allowed_prefixes = ["https://x.com/"]

            [llm]
            adapter = "remote"

            [llm.remote]
            api_url = "https://api.openai.com/v1/chat/completions"
            api_key_env = "OPENAI_API_KEY"
            model = "gpt-3.5-turbo"

            [sheet]
            spreadsheet_id = "sheet-id-123"
            range = "Sheet1!A:F"
            api_token_env = "SHEETS_API_TOKEN"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.server.as_ref().and_then(|s| s.port), Some(5000));
        assert_eq!(cfg.source.allowed_prefixes, vec!["https://x.com/"]);
        assert_eq!(cfg.sheet.spreadsheet_id, "sheet-id-123");
        assert_eq!(cfg.sheet.range.as_deref(), Some("Sheet1!A:F"));
        let llm = cfg.llm.expect("llm config");
        assert_eq!(llm.adapter.as_deref(), Some("remote"));
        assert_eq!(
            llm.remote.and_then(|r| r.model),
            Some("gpt-3.5-turbo".to_string())
        );
    }

    #[test]
    fn allowed_prefixes_default_when_missing() {
        let toml = r#"
            [sheet]
            spreadsheet_id = "abc"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(
            cfg.source.allowed_prefixes,
            vec!["https://twitter.com/", "https://x.com/"]
        );
    }

    #[tokio::test]
    async fn load_with_defaults_merges_override() {
        let dir = std::env::temp_dir().join(format!("postlens_cfg_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("create dir");

        let default_path = dir.join("config.default.toml");
        tokio::fs::write(
            &default_path,
            r#"
                [source]
                fetch_timeout_seconds = 10

                [sheet]
                spreadsheet_id = "default-sheet"
                range = "Sheet1!A:F"
            "#,
        )
        .await
        .expect("write default");

        let override_path = dir.join("config.toml");
        tokio::fs::write(
            &override_path,
            r#"
                [sheet]
                spreadsheet_id = "override-sheet"
            "#,
        )
        .await
        .expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load merged config");

        // Override wins where set, defaults survive elsewhere
        assert_eq!(cfg.sheet.spreadsheet_id, "override-sheet");
        assert_eq!(cfg.sheet.range.as_deref(), Some("Sheet1!A:F"));
        assert_eq!(cfg.source.fetch_timeout_seconds, Some(10));
    }
}
