use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level application configuration, loadable from a TOML file.
/// Every section and field has a default, so a partial (or absent) file works.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub automation: AutomationConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run Chromium without a visible window. Off by default: the user drives
    /// form-area selection from the injected panel.
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Explicit Chromium executable path; autodetected when unset.
    pub chrome_path: Option<String>,
    /// Default timeout for element waits.
    pub default_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: 1280,
            viewport_height: 720,
            chrome_path: None,
            default_timeout_secs: 30,
        }
    }
}

impl BrowserConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Per-keystroke delay while typing into a field.
    pub typing_delay_ms: u64,
    /// Pause between page actions.
    pub action_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: 100,
            action_delay_ms: 1000,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API root; the platform default when unset.
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// API key; falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the parsed-resume JSON artifact is written.
    pub parsed_resume: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            parsed_resume: PathBuf::from("parsed_resume.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.viewport_width, 1280);
        assert_eq!(config.browser.viewport_height, 720);
        assert_eq!(config.automation.typing_delay_ms, 100);
        assert_eq!(config.automation.action_delay_ms, 1000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.output.parsed_resume, PathBuf::from("parsed_resume.json"));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [browser]
            headless = true

            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.browser.viewport_width, 1280);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 500);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.automation.max_retries, 3);
        assert_eq!(config.llm.timeout_secs, 30);
    }
}
