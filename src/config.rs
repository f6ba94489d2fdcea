use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_THEME: &str = "bootstrap";
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 1000;

/// Recognized select options. Missing keys fall back to the defaults, so a
/// config file only needs the options it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Template set used by the front end; no effect on controller logic.
    pub theme: String,
    pub search_enabled: bool,
    pub placeholder: String,
    /// Debounce window for refresh requests, in milliseconds.
    pub refresh_delay: u64,
    pub multiple: bool,
    pub reset_search_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            theme: DEFAULT_THEME.to_string(),
            search_enabled: true,
            placeholder: String::new(),
            refresh_delay: DEFAULT_REFRESH_DELAY_MS,
            multiple: false,
            reset_search_input: true,
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Config> {
        let cfg: Config = serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        if cfg.theme.trim().is_empty() {
            return Err(Error::Config("theme must not be empty".to_string()));
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Config> {
        let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg = Config::from_json_str(&s)?;
        tracing::debug!(path = %path.display(), ?cfg, "loaded config");
        Ok(cfg)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay)
    }

    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_reset_search_input(mut self, reset: bool) -> Self {
        self.reset_search_input = reset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_defaults() {
        let c = Config::default();
        assert_eq!(c.theme, "bootstrap");
        assert!(c.search_enabled);
        assert_eq!(c.placeholder, "");
        assert_eq!(c.refresh_delay(), Duration::from_millis(1000));
        assert!(!c.multiple);
        assert!(c.reset_search_input);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = Config::from_json_str(r#"{"multiple": true, "refreshDelay": 250}"#).unwrap();
        assert!(c.multiple);
        assert_eq!(c.refresh_delay, 250);
        assert!(c.search_enabled);
        assert_eq!(c.theme, DEFAULT_THEME);
    }

    #[test]
    fn unknown_keys_and_empty_theme_are_rejected() {
        assert!(matches!(
            Config::from_json_str(r#"{"multi": true}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"theme": " "}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
