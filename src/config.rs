//! Configuration types for the search page.
//!
//! Everything the page needs at startup is passed in as one [`AppConfig`];
//! nothing is read from ambient globals.

use archive_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AppError;
use crate::view::ResultViewType;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search backend settings.
    pub backend: SearchConfig,
    /// Presentation settings.
    pub ui: UiConfig,
}

/// Presentation settings: languages, labels, contact details, view modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Language used when a translation key is missing in `language`.
    pub default_language: String,
    /// Active UI language.
    pub language: String,
    /// Translation key of the search field placeholder.
    pub placeholder_label: String,
    /// Shown on the no-results page.
    pub contact_phone_number: String,
    /// Shown on the no-results page.
    pub contact_mail_address: String,
    /// Presentation modes offered for the result list.
    pub result_view_types: Vec<ResultViewType>,
    pub selected_result_view_type: ResultViewType,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_language: "de".into(),
            language: "en".into(),
            placeholder_label: "app.searchField.placeholder".into(),
            contact_phone_number: "+43 662 27 66 80".into(),
            contact_mail_address: "office@redlink.at".into(),
            result_view_types: vec![ResultViewType::List, ResultViewType::Grid],
            selected_result_view_type: ResultViewType::List,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains an invalid backend section.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the backend section and the view mode selection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] describing the first invalid field.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.backend
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.ui.result_view_types.is_empty() {
            return Err(AppError::Config(
                "ui.result_view_types must not be empty".into(),
            ));
        }
        if !self
            .ui
            .result_view_types
            .contains(&self.ui.selected_result_view_type)
        {
            return Err(AppError::Config(
                "ui.selected_result_view_type must be one of ui.result_view_types".into(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/archive-explorer/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("archive-explorer")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("archive-explorer")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/archive-explorer/config.toml")
        }
    }
}
