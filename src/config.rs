use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Immutable localization settings, built once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    supported_locales: Vec<String>,
    default_locale: String,
    views_directory: PathBuf,
}

impl Settings {
    /// Validate and build the settings.
    ///
    /// # Arguments
    /// * `supported_locales` - 2-letter codes of the locales the site is translated into
    /// * `default_locale` - fallback locale, must be one of `supported_locales`
    /// * `views_directory` - directory holding templates and `{template}_{locale}.json` resources
    ///
    /// # Returns
    /// * `Ok(Settings)` with every code lower-cased
    /// * `Err(ConfigError)` if the locale set is empty, a code is malformed or
    ///   the default locale is not supported
    pub fn new<I, S>(
        supported_locales: I,
        default_locale: impl Into<String>,
        views_directory: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut locales: Vec<String> = Vec::new();
        for locale in supported_locales {
            let locale = normalize_locale(locale.into())?;
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }
        if locales.is_empty() {
            return Err(ConfigError::NoSupportedLocales);
        }

        let default_locale = normalize_locale(default_locale.into())?;
        if !locales.contains(&default_locale) {
            return Err(ConfigError::UnsupportedDefault(default_locale));
        }

        Ok(Self {
            supported_locales: locales,
            default_locale,
            views_directory: views_directory.into(),
        })
    }

    pub fn supported_locales(&self) -> &[String] {
        &self.supported_locales
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn views_directory(&self) -> &Path {
        &self.views_directory
    }

    /// Check whether `locale` is one of the supported locale codes.
    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|supported| supported == locale)
    }
}

fn normalize_locale(locale: String) -> Result<String, ConfigError> {
    let trimmed = locale.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(ConfigError::InvalidLocale(locale))
    }
}

/// Process configuration for the `locale-router` server.
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,

    // Routing
    pub route_base_url: String,
    pub not_found_template: Option<String>,

    // Server
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let supported_locales: Vec<String> = std::env::var("SUPPORTED_LOCALES")
            .unwrap_or_else(|_| "en".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Defaults to the first supported locale
        let default_locale = std::env::var("DEFAULT_LOCALE")
            .ok()
            .or_else(|| supported_locales.first().cloned())
            .unwrap_or_else(|| "en".to_string());

        let views_directory =
            std::env::var("VIEWS_DIRECTORY").unwrap_or_else(|_| "views".to_string());

        let settings = Settings::new(supported_locales, default_locale, views_directory)
            .context("Invalid locale configuration")?;

        Ok(Self {
            settings,

            // Routing
            route_base_url: std::env::var("ROUTE_BASE_URL").unwrap_or_else(|_| "/".to_string()),
            not_found_template: std::env::var("NOT_FOUND_TEMPLATE")
                .ok()
                .filter(|s| !s.trim().is_empty()),

            // Server
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // ==================== Settings Tests ====================

    #[test]
    fn test_settings_valid() {
        let settings = Settings::new(["en", "fr"], "en", "views").expect("Should be valid");
        assert_eq!(settings.supported_locales(), &["en".to_string(), "fr".to_string()]);
        assert_eq!(settings.default_locale(), "en");
        assert_eq!(settings.views_directory(), Path::new("views"));
    }

    #[test]
    fn test_settings_lowercases_and_deduplicates() {
        let settings = Settings::new(["EN", "fr", "en"], "Fr", "views").expect("Should be valid");
        assert_eq!(settings.supported_locales(), &["en".to_string(), "fr".to_string()]);
        assert_eq!(settings.default_locale(), "fr");
    }

    #[test]
    fn test_settings_empty_locales() {
        let result = Settings::new(Vec::<String>::new(), "en", "views");
        assert!(matches!(result, Err(ConfigError::NoSupportedLocales)));
    }

    #[test]
    fn test_settings_malformed_locale() {
        let result = Settings::new(["eng"], "eng", "views");
        assert!(matches!(result, Err(ConfigError::InvalidLocale(_))));
    }

    #[test]
    fn test_settings_default_not_supported() {
        let result = Settings::new(["en", "fr"], "de", "views");
        assert!(matches!(result, Err(ConfigError::UnsupportedDefault(ref l)) if l == "de"));
    }

    #[test]
    fn test_is_supported() {
        let settings = Settings::new(["en", "fr"], "en", "views").unwrap();
        assert!(settings.is_supported("fr"));
        assert!(!settings.is_supported("de"));
    }

    // ==================== from_env Tests ====================

    fn clear_env() {
        for key in [
            "SUPPORTED_LOCALES",
            "DEFAULT_LOCALE",
            "VIEWS_DIRECTORY",
            "ROUTE_BASE_URL",
            "NOT_FOUND_TEMPLATE",
            "HOST",
            "PORT",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should load defaults");
        assert_eq!(config.settings.supported_locales(), &["en".to_string()]);
        assert_eq!(config.settings.default_locale(), "en");
        assert_eq!(config.route_base_url, "/");
        assert_eq!(config.not_found_template, None);
        assert_eq!(config.port, 3000);
    }

    #[test]
    #[serial]
    fn test_from_env_custom_values() {
        clear_env();
        std::env::set_var("SUPPORTED_LOCALES", "fr, en");
        std::env::set_var("VIEWS_DIRECTORY", "/srv/views");
        std::env::set_var("NOT_FOUND_TEMPLATE", "404.html");
        std::env::set_var("PORT", "not-a-number");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.settings.default_locale(), "fr");
        assert_eq!(config.settings.views_directory(), Path::new("/srv/views"));
        assert_eq!(config.not_found_template.as_deref(), Some("404.html"));
        assert_eq!(config.port, 3000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unsupported_default() {
        clear_env();
        std::env::set_var("SUPPORTED_LOCALES", "en,fr");
        std::env::set_var("DEFAULT_LOCALE", "jp");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
