//! Configuration loading.
//!
//! An optional `draftsmith.toml` tunes the model, the HTTP bind address, and
//! the default reply formatting. Every field has a default, and a missing
//! file is not an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{GreetingStyle, Language, ReplyFormat, SignOffStyle};

/// Top-level configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Generation model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP service settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Default reply formatting.
    #[serde(default)]
    pub format: FormatConfig,
}

/// Generation model settings.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent to the generation API.
    #[serde(default = "default_model_name")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address the service binds to.
    #[serde(default = "default_bind_addr")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_addr(),
        }
    }
}

/// Default reply formatting applied when a request leaves fields unset.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    /// Default reply language.
    #[serde(default)]
    pub language: Language,

    /// Default greeting style.
    #[serde(default)]
    pub greeting_style: GreetingStyle,

    /// Default sign-off style.
    #[serde(default)]
    pub signoff_style: SignOffStyle,

    /// Blank lines between greeting and body.
    #[serde(default = "default_blank_lines_after_greeting")]
    pub blank_lines_after_greeting: u8,

    /// Blank lines between body and sign-off.
    #[serde(default = "default_blank_lines_before_signoff")]
    pub blank_lines_before_signoff: u8,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            greeting_style: GreetingStyle::default(),
            signoff_style: SignOffStyle::default(),
            blank_lines_after_greeting: default_blank_lines_after_greeting(),
            blank_lines_before_signoff: default_blank_lines_before_signoff(),
        }
    }
}

impl FormatConfig {
    /// Per-call reply format using these defaults, with optional overrides.
    pub fn reply_format(
        &self,
        language: Option<Language>,
        greeting_style: Option<GreetingStyle>,
        signoff_style: Option<SignOffStyle>,
    ) -> ReplyFormat {
        ReplyFormat {
            language: language.unwrap_or(self.language),
            greeting_style: greeting_style.unwrap_or(self.greeting_style),
            signoff_style: signoff_style.unwrap_or(self.signoff_style),
            blank_lines_after_greeting: self.blank_lines_after_greeting,
            blank_lines_before_signoff: self.blank_lines_before_signoff,
        }
    }
}

// Default value functions for serde

fn default_model_name() -> String {
    "gpt-4".to_owned()
}
fn default_bind_addr() -> String {
    "127.0.0.1:5001".to_owned()
}
fn default_blank_lines_after_greeting() -> u8 {
    1
}
fn default_blank_lines_before_signoff() -> u8 {
    2
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Resolve the user config directory (`~/.draftsmith/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let base = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(base.home_dir().join(".draftsmith"))
}

/// Load configuration from `./draftsmith.toml`, else
/// `~/.draftsmith/config.toml`, else built-in defaults.
///
/// # Errors
///
/// Returns an error only when a config file exists but cannot be parsed.
pub fn load_default_config() -> anyhow::Result<Config> {
    let local = PathBuf::from("draftsmith.toml");
    if local.exists() {
        return load_config(&local);
    }
    if let Ok(dir) = config_dir() {
        let user = dir.join("config.toml");
        if user.exists() {
            return load_config(&user);
        }
    }
    Ok(Config::default())
}
