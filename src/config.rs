use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the text endpoint URL
pub const TEXT_ENDPOINT_ENV: &str = "IMGCHAT_TEXT_ENDPOINT";
/// Environment variable overriding the image endpoint URL
pub const IMAGE_ENDPOINT_ENV: &str = "IMGCHAT_IMAGE_ENDPOINT";

const DEFAULT_TEXT_PROMPT_PREFIX: &str = "Follow instructions precisely! If the user asks to generate, create or make an image, photo, or picture by describing it, You will reply with '/image' + description. Otherwise, You will respond normally. Avoid additional explanations.";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text-completion endpoint, `POST {prompt}` -> `{status, text}`
    pub text_endpoint: String,

    /// Image-generation endpoint, `POST {prompt}` -> `{status, imageUrl}`
    pub image_endpoint: String,

    /// Leading token that routes a prompt to the image endpoint
    pub command_token: String,

    /// Instruction prepended to every prompt sent to the text endpoint. Empty disables it.
    pub text_prompt_prefix: String,

    /// Where downloaded images are written. Falls back to the platform download dir.
    pub download_dir: Option<PathBuf>,

    pub request_timeout_secs: u64,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            text_endpoint: "https://backend.buildpicoapps.com/aero/run/llm-api".to_string(),
            image_endpoint: "https://backend.buildpicoapps.com/aero/run/image-generation-api"
                .to_string(),
            command_token: "/image".to_string(),
            text_prompt_prefix: DEFAULT_TEXT_PROMPT_PREFIX.to_string(),
            download_dir: None,
            request_timeout_secs: 60,
            log_level: "info".to_string(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// The imgchat home directory, `~/.imgchat`
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".imgchat"))
    }

    /// Default location of the configuration file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default location) and apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a configuration file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Override endpoints from the environment. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(TEXT_ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.text_endpoint = url;
        }
        if let Some(url) = lookup(IMAGE_ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.image_endpoint = url;
        }
    }

    /// Directory images are saved into
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Path of the log file
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("imgchat.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.command_token, "/image");
    }

    #[test]
    fn partial_file_is_filled_from_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "text_endpoint = \"http://localhost:9000/text\"\n\n[ui]\nshow_timestamps = false\n",
        )
        .expect("write");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.text_endpoint, "http://localhost:9000/text");
        assert_eq!(config.image_endpoint, Config::default().image_endpoint);
        assert!(!config.ui.show_timestamps);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn save_then_load_preserves_prefix_removal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            text_prompt_prefix: String::new(),
            download_dir: Some(dir.path().join("images")),
            ..Config::default()
        };

        config.save(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.text_prompt_prefix, "");
        assert_eq!(loaded.download_dir, Some(dir.path().join("images")));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "text_endpoint = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn environment_overrides_endpoints_but_ignores_blank_values() {
        let vars: HashMap<&str, &str> = [
            (TEXT_ENDPOINT_ENV, "http://env/text"),
            (IMAGE_ENDPOINT_ENV, "   "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.text_endpoint, "http://env/text");
        assert_eq!(config.image_endpoint, Config::default().image_endpoint);
    }

    #[test]
    fn explicit_download_dir_wins() {
        let config = Config {
            download_dir: Some(PathBuf::from("/tmp/pictures")),
            ..Config::default()
        };
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/pictures"));
    }
}
