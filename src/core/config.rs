//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.askai/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::inference::DEFAULT_GREETING;
use crate::inference::providers::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::inference::providers::lmstudio::DEFAULT_LMSTUDIO_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AskAiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub lmstudio: LmStudioConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub greeting: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub reveal_interval_ms: Option<u64>,
    pub copy_ack_ms: Option<u64>,
    pub scroll_slack_rows: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LmStudioConfig {
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 30;
pub const DEFAULT_COPY_ACK_MS: u64 = 2000;
/// Terminal rows still counted as "at the bottom" of the message list.
pub const DEFAULT_SCROLL_SLACK_ROWS: u32 = 3;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: String,
    pub model_name: String,
    pub greeting: String,
    pub reveal_interval: Duration,
    pub copy_ack_window: Duration,
    pub scroll_slack_rows: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub lmstudio_base_url: String,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.askai/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".askai").join("config.toml"))
}

/// Load config from `~/.askai/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AskAiConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<AskAiConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(AskAiConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(AskAiConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<AskAiConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AskAiConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# askai Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "gemini"        # "gemini" or "lmstudio"
# default_model = "gemini-2.5-flash"
# greeting = "Hello! I'm here to help you with your code. Here's the code you provided:"

# [display]
# reveal_interval_ms = 30            # typewriter speed for plain replies (0 = off)
# copy_ack_ms = 2000                 # how long "Copied!" stays visible
# scroll_slack_rows = 3              # rows from the bottom still counted as "at bottom"

# [gemini]
# api_key = "..."                    # Or set GEMINI_API_KEY env var
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [lmstudio]
# base_url = "http://localhost:1234/v1"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AskAiConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &AskAiConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli
        .provider
        .clone()
        .or_else(|| env("ASKAI_PROVIDER"))
        .or_else(|| config.general.default_provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    // Model: CLI → env → config → default
    let model_name = cli
        .model
        .clone()
        .or_else(|| env("ASKAI_MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

    let gemini_api_key = env("GEMINI_API_KEY").or_else(|| config.gemini.api_key.clone());

    let gemini_base_url = env("GEMINI_BASE_URL")
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    let lmstudio_base_url = env("LM_STUDIO_BASE_URL")
        .or_else(|| config.lmstudio.base_url.clone())
        .unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string());

    ResolvedConfig {
        provider,
        model_name,
        greeting: config
            .general
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        reveal_interval: Duration::from_millis(
            config
                .display
                .reveal_interval_ms
                .unwrap_or(DEFAULT_REVEAL_INTERVAL_MS),
        ),
        copy_ack_window: Duration::from_millis(
            config.display.copy_ack_ms.unwrap_or(DEFAULT_COPY_ACK_MS),
        ),
        scroll_slack_rows: config
            .display
            .scroll_slack_rows
            .unwrap_or(DEFAULT_SCROLL_SLACK_ROWS),
        gemini_api_key,
        gemini_base_url,
        lmstudio_base_url,
    }
}
