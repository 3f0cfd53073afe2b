//! Shell configuration
//!
//! Everything has a default, so a page can pass `{}` (or nothing) and only
//! override what it cares about. The `terminal` section is handed to the
//! xterm.js constructor as-is.

use crate::error::{ShellError, ShellResult};
use crate::shell::resize::DEFAULT_QUIET_PERIOD_MS;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMPT: &str = "> osrs ";
pub const DEFAULT_ERROR_PREFIX: &str = "error: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    /// Shown before input on every new line
    pub prompt: String,
    /// Resize debounce quiet period
    pub quiet_period_ms: u32,
    /// Lines written once before the first prompt
    pub banner: Option<Vec<String>>,
    /// Prepended to failure descriptions
    pub error_prefix: String,
    pub terminal: TerminalOptions,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            banner: None,
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            terminal: TerminalOptions::default(),
        }
    }
}

impl ShellConfig {
    /// Parse a (possibly partial) JSON config on top of the defaults
    pub fn from_json(json: &str) -> ShellResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ShellResult<()> {
        if self.prompt.is_empty() {
            return Err(ShellError::InvalidConfig("prompt must not be empty".into()));
        }
        if self.quiet_period_ms == 0 {
            return Err(ShellError::InvalidConfig("quietPeriodMs must be positive".into()));
        }
        Ok(())
    }
}

/// xterm.js constructor options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminalOptions {
    /// Treat `\n` as `\r\n`, so backend output can use bare newlines
    pub convert_eol: bool,
    pub cursor_blink: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            convert_eol: true,
            cursor_blink: true,
            font_size: None,
            font_family: None,
            theme: None,
        }
    }
}

impl TerminalOptions {
    /// The options object as JSON text
    pub fn to_json(&self) -> ShellResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// xterm.js theme colours (CSS colour strings). Unset keys keep xterm's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yellow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magenta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cyan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white: Option<String>,
}
