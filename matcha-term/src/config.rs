//! Configuration for the matcha terminal.
//!
//! Loaded with the following precedence (highest to lowest):
//! 1. CLI flags (`--config`, `--shell`, `--font`)
//! 2. Environment variables (`MATCHA_SHELL`, `MATCHA_TERM`, `MATCHA_FONT`)
//! 3. Config file (`$XDG_CONFIG_HOME/matcha/config.toml`)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use matcha_core::{CellAttributes, Color};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// CLI overrides collected by `main`.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub shell: Option<String>,
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell executed in the PTY; argv is just this path.
    pub shell: String,
    /// Value exported as `TERM` to the child.
    pub term: String,
    /// Monospace TTF to use instead of the discovered system font.
    pub font: Option<PathBuf>,
    /// Default foreground color (hex).
    pub foreground: String,
    /// Default background color (hex).
    pub background: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shell: "/bin/sh".to_string(),
            term: "xterm-256color".to_string(),
            font: None,
            foreground: "#d3d7cf".to_string(),
            background: "#000000".to_string(),
        }
    }
}

impl Config {
    /// Default config file location following XDG conventions.
    ///
    /// Uses `XDG_CONFIG_HOME` if set, otherwise falls back to the platform
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("matcha").join("config.toml"));
            }
        }

        // dirs also follows XDG on Linux
        dirs::config_dir().map(|p| p.join("matcha").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Resolve the effective configuration for this invocation.
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config_path {
            // an explicitly named file must exist and parse
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Config::default(),
            },
        };
        config.apply_env();
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(shell) = env::var("MATCHA_SHELL") {
            self.shell = shell;
        }
        if let Ok(term) = env::var("MATCHA_TERM") {
            self.term = term;
        }
        if let Ok(font) = env::var("MATCHA_FONT") {
            self.font = Some(PathBuf::from(font));
        }
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(shell) = &args.shell {
            self.shell = shell.clone();
        }
        if let Some(font) = &args.font {
            self.font = Some(font.clone());
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("foreground", &self.foreground), ("background", &self.background)]
        {
            if parse_hex(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "invalid hex color for {field}: {value:?}"
                )));
            }
        }
        Ok(())
    }

    /// Configured default foreground.
    pub fn foreground_color(&self) -> Color {
        parse_hex(&self.foreground).unwrap_or(CellAttributes::DEFAULT_FG)
    }

    /// Configured default background.
    pub fn background_color(&self) -> Color {
        parse_hex(&self.background).unwrap_or(CellAttributes::DEFAULT_BG)
    }

    /// Resting cell attributes for a session using this configuration.
    pub fn default_attributes(&self) -> CellAttributes {
        CellAttributes {
            fg: self.foreground_color(),
            bg: self.background_color(),
            ..CellAttributes::default()
        }
    }
}

/// Parse a `#rrggbb` color string.
fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::new(r, g, b))
}
