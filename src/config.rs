//! Application-level configuration loading, including the category color palette.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CLUB_BACK_CONFIG_PATH";
/// Fallback color returned when the palette is exhausted.
const DEFAULT_COLOR: &str = "#9e9e9e";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    colors: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to a baked-in default palette.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        count = app_config.colors.len(),
                        "loaded category color palette from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Return the first palette color that is not already used by an existing category.
    ///
    /// When every palette entry is already taken we fall back to [`DEFAULT_COLOR`] so
    /// callers always receive a value.
    pub fn first_unused_color(&self, used: &[String]) -> String {
        self.colors
            .iter()
            .find(|candidate| {
                used.iter()
                    .all(|existing| !existing.eq_ignore_ascii_case(candidate))
            })
            .cloned()
            .unwrap_or_else(|| DEFAULT_COLOR.to_owned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    colors: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let (colors, rejected): (Vec<_>, Vec<_>) = value
            .colors
            .into_iter()
            .partition(|color| crate::dto::validation::is_hex_color(color));

        for color in &rejected {
            warn!(%color, "ignoring palette entry that is not a `#rrggbb` color");
        }

        if colors.is_empty() {
            return AppConfig::default();
        }

        Self { colors }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in palette shipped with the binary.
fn default_colors() -> Vec<String> {
    [
        "#e53935", "#1e88e5", "#43a047", "#fdd835", "#8e24aa", "#fb8c00", "#00acc1", "#6d4c41",
        "#3949ab", "#c0ca33", "#d81b60", "#00897b",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_color_not_in_use() {
        let config = AppConfig::default();
        let used = vec!["#e53935".to_owned(), "#1e88e5".to_owned()];
        assert_eq!(config.first_unused_color(&used), "#43a047");
    }

    #[test]
    fn color_comparison_ignores_case() {
        let config = AppConfig::default();
        let used = vec!["#E53935".to_owned()];
        assert_eq!(config.first_unused_color(&used), "#1e88e5");
    }

    #[test]
    fn exhausted_palette_falls_back_to_default_color() {
        let config = AppConfig::default();
        let used = default_colors();
        assert_eq!(config.first_unused_color(&used), DEFAULT_COLOR);
    }

    #[test]
    fn invalid_palette_entries_are_dropped() {
        let raw = RawConfig {
            colors: vec!["#abcdef".to_owned(), "teal".to_owned()],
        };
        let config: AppConfig = raw.into();
        assert_eq!(config.colors, vec!["#abcdef".to_owned()]);
    }
}
