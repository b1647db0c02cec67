use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Public mount point for static assets.
pub const STATIC_BASE: &str = "/static";

// ─── Settings ──────────────────────────────────────────────────────────────

/// Runtime settings sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // App identity
    pub app_name: String,
    pub app_env: String,
    pub app_version: String,

    // Backing store; never exposed through the public projection
    pub database_url: Option<DatabaseUrl>,

    // Feature flags
    pub enable_demo_banner: bool,
    pub enable_experimental_ui: bool,

    // Security
    pub enable_hsts: bool,
    pub cors_allow_origins: Vec<String>,

    // Readiness probe budget (milliseconds)
    pub readiness_timeout_ms: u64,

    // Logging
    pub log_level: String,
    pub log_dir: Option<String>,

    // Server
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Quill Blog".to_string(),
            app_env: "development".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            database_url: None,
            enable_demo_banner: false,
            enable_experimental_ui: false,
            enable_hsts: false,
            cors_allow_origins: Vec::new(),
            readiness_timeout_ms: 300,
            log_level: "info".to_string(),
            log_dir: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: "static".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut settings = Self::default();

        if let Some(v) = get("APP_NAME") {
            settings.app_name = v;
        }
        if let Some(v) = get("APP_ENV") {
            settings.app_env = v;
        }
        if let Some(v) = get("APP_VERSION") {
            settings.app_version = v;
        }
        settings.database_url = get("DATABASE_URL").map(DatabaseUrl);

        if let Some(v) = get("ENABLE_DEMO_BANNER") {
            settings.enable_demo_banner = parse_bool("ENABLE_DEMO_BANNER", &v)?;
        }
        if let Some(v) = get("ENABLE_EXPERIMENTAL_UI") {
            settings.enable_experimental_ui = parse_bool("ENABLE_EXPERIMENTAL_UI", &v)?;
        }
        if let Some(v) = get("ENABLE_HSTS") {
            settings.enable_hsts = parse_bool("ENABLE_HSTS", &v)?;
        }
        if let Some(v) = get("CORS_ALLOW_ORIGINS") {
            settings.cors_allow_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get("READINESS_TIMEOUT_MS") {
            settings.readiness_timeout_ms = parse_number("READINESS_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            settings.log_level = v.to_lowercase();
        }
        settings.log_dir = get("LOG_DIR");
        if let Some(v) = get("HOST") {
            settings.host = v;
        }
        if let Some(v) = get("PORT") {
            settings.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = get("STATIC_DIR") {
            settings.static_dir = v;
        }

        Ok(settings)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    /// Safe subset for clients. Never includes the connection string or secrets.
    pub fn public_config(&self) -> PublicConfig {
        PublicConfig {
            name: self.app_name.clone(),
            env: self.app_env.clone(),
            version: self.app_version.clone(),
            features: FeatureFlags {
                demo_banner: self.enable_demo_banner,
                experimental_ui: self.enable_experimental_ui,
            },
            static_base: STATIC_BASE.to_string(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// ─── Secrets ───────────────────────────────────────────────────────────────

/// Backing-store connection string. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseUrl(String);

impl DatabaseUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DatabaseUrl(<redacted>)")
    }
}

// ─── Public projection ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub name: String,
    pub env: String,
    pub version: String,
    pub features: FeatureFlags,
    pub static_base: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeatureFlags {
    #[serde(rename = "demoBanner")]
    pub demo_banner: bool,
    #[serde(rename = "experimentalUI")]
    pub experimental_ui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let cfg = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.app_env, "development");
        assert_eq!(cfg.readiness_timeout_ms, 300);
        assert!(cfg.database_url.is_none());
        assert!(!cfg.enable_hsts);
        assert_eq!(cfg.port, 8000);
        assert!(cfg.cors_allow_origins.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = Settings::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgresql://user:hunter2@db/app"),
            ("ENABLE_DEMO_BANNER", "Yes"),
            ("READINESS_TIMEOUT_MS", "1200"),
            ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example,"),
            ("LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();
        assert_eq!(cfg.app_env, "production");
        assert!(cfg.enable_demo_banner);
        assert_eq!(cfg.readiness_timeout(), Duration::from_millis(1200));
        assert_eq!(
            cfg.cors_allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(
            cfg.database_url.as_ref().map(DatabaseUrl::expose),
            Some("postgresql://user:hunter2@db/app")
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = Settings::from_lookup(lookup(&[("DATABASE_URL", "  "), ("APP_ENV", "")]))
            .unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.app_env, "development");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_lookup(lookup(&[("READINESS_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("READINESS_TIMEOUT_MS"));

        let err = Settings::from_lookup(lookup(&[("ENABLE_HSTS", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ENABLE_HSTS"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let cfg = Settings::from_lookup(lookup(&[(
            "DATABASE_URL",
            "postgresql://user:hunter2@db/app",
        )]))
        .unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_public_config_shape() {
        let cfg = Settings {
            enable_experimental_ui: true,
            database_url: Some(DatabaseUrl::new("sqlite:///./app.db")),
            ..Settings::default()
        };
        let value = serde_json::to_value(cfg.public_config()).unwrap();
        assert_eq!(value["name"], "Quill Blog");
        assert_eq!(value["features"]["demoBanner"], false);
        assert_eq!(value["features"]["experimentalUI"], true);
        assert_eq!(value["staticBase"], "/static");
        assert!(!value.to_string().contains("app.db"));
    }
}
