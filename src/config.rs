use std::time::Duration;

use anyhow::{ensure, Result};

use crate::autosave::AutosaveConfig;

/// Options passed to the save-location prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub title: String,
    /// Without the leading dot. The first one is appended to bare names.
    pub extensions: Vec<String>,
    pub default_name: String,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            title: "Choose where to save your writing".to_string(),
            extensions: vec!["txt".to_string(), "md".to_string()],
            default_name: "draft.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub save_interval: Duration,
    pub keystroke_threshold: u32,
    /// How long "Saved" stays up after a successful write.
    pub confirm_window: Duration,
    /// Period of the status display refresh. Never triggers writes.
    pub status_refresh: Duration,
    pub prompt: PromptOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let autosave = AutosaveConfig::default();
        Self {
            save_interval: autosave.interval,
            keystroke_threshold: autosave.keystroke_threshold,
            confirm_window: autosave.confirm_window,
            status_refresh: Duration::from_secs(1),
            prompt: PromptOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn autosave(&self) -> AutosaveConfig {
        AutosaveConfig {
            interval: self.save_interval,
            keystroke_threshold: self.keystroke_threshold,
            confirm_window: self.confirm_window,
        }
    }
}

pub fn validate_config(cfg: &SessionConfig) -> Result<()> {
    ensure!(!cfg.save_interval.is_zero(), "save_interval must be > 0");
    ensure!(cfg.keystroke_threshold > 0, "keystroke_threshold must be > 0");
    ensure!(!cfg.status_refresh.is_zero(), "status_refresh must be > 0");
    ensure!(
        !cfg.prompt.default_name.trim().is_empty(),
        "default file name must not be empty"
    );
    ensure!(
        cfg.prompt
            .extensions
            .iter()
            .all(|ext| !ext.is_empty() && !ext.starts_with('.')),
        "extensions must be non-empty and given without a leading dot"
    );

    Ok(())
}
