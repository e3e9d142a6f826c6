//! Configuration schema types
//!
//! Ambient sections (`application`, `http`, `logging`) are validated strictly
//! on load. Handler sections are parsed leniently: an incomplete catalog or
//! backend entry is reported and skipped when the binding index is built, so
//! one bad entry never disables the rest.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Main SensorSync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorSyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Outgoing HTTP settings shared by all handlers
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Handler name → handler configuration, in file order
    #[serde(default)]
    pub handlers: IndexMap<String, HandlerConfig>,
}

impl SensorSyncConfig {
    /// Validates the ambient sections
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Outgoing HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent override; defaults to `sensorsync/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Contact address appended to the user agent so operators can reach us
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
            contact_email: None,
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "http.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }
        if let Some(email) = &self.contact_email {
            if !email.contains('@') {
                return Err(format!("http.contact_email '{email}' is not an email address"));
            }
        }
        Ok(())
    }

    /// The `User-Agent` header sent with every request
    pub fn user_agent(&self) -> String {
        let base = self
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("sensorsync/{}", env!("CARGO_PKG_VERSION")));
        match &self.contact_email {
            Some(email) => format!("{base} (+{email})"),
            None => base,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local_enabled = true".to_string());
        }
        Ok(())
    }
}

/// One `[handlers.<name>]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Catalogs this handler enriches
    #[serde(default)]
    pub catalogs: Vec<ConfigEntry<CatalogBindingConfig>>,

    /// Backend instances; empty means the handler's built-in default
    #[serde(default)]
    pub backends: Vec<ConfigEntry<BackendConfig>>,
}

/// A handler entry kept together with the TOML it was read from
///
/// An entry of the wrong shape does not fail the load. It keeps its
/// deserialization error and is skipped when the binding index is built.
#[derive(Debug, Clone)]
pub struct ConfigEntry<T> {
    raw: toml::Value,
    parsed: Result<T, String>,
}

impl<T> ConfigEntry<T> {
    /// The typed entry, or the reason it could not be read
    pub fn parsed(&self) -> Result<&T, &str> {
        self.parsed.as_ref().map_err(String::as_str)
    }

    /// A string field of the raw entry, available even when parsing failed
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(toml::Value::as_str)
    }
}

impl<T: Serialize> From<T> for ConfigEntry<T> {
    fn from(value: T) -> Self {
        let raw = toml::Value::try_from(&value)
            .unwrap_or_else(|_| toml::Value::Table(toml::Table::new()));
        Self {
            raw,
            parsed: Ok(value),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ConfigEntry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = toml::Value::deserialize(deserializer)?;
        let parsed = raw.clone().try_into::<T>().map_err(|e| e.to_string());
        Ok(Self { raw, parsed })
    }
}

impl<T> Serialize for ConfigEntry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Binds a handler to a catalog and the attribute that triggers it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogBindingConfig {
    #[serde(default)]
    pub catalog_uri: Option<String>,

    /// Attribute whose value holds the `prefix:id` reference
    #[serde(default, alias = "trigger_attribute_uri")]
    pub auto_complete_field_uri: Option<String>,

    /// Path expression → attribute uri
    #[serde(default)]
    pub attribute_mapping: Option<IndexMap<String, String>>,
}

/// One backend instance of a handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub id_prefix: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SensorSyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = SensorSyncConfig::default();
        config.application.log_level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = SensorSyncConfig::default();
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = SensorSyncConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_agent_with_contact() {
        let http = HttpConfig {
            user_agent: Some("sensorsync-test/1".to_string()),
            contact_email: Some("data@example.org".to_string()),
            ..Default::default()
        };
        assert_eq!(http.user_agent(), "sensorsync-test/1 (+data@example.org)");
    }

    #[test]
    fn test_default_user_agent() {
        assert!(HttpConfig::default().user_agent().starts_with("sensorsync/"));
    }

    #[test]
    fn test_handler_sections_preserve_order() {
        let config: SensorSyncConfig = toml::from_str(
            r#"
[handlers.zeta]
[handlers.alpha]
[handlers.mid]
"#,
        )
        .unwrap();
        let names: Vec<&str> = config.handlers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_incomplete_catalog_parses() {
        let config: SensorSyncConfig = toml::from_str(
            r#"
[[handlers.gfz_gipp.catalogs]]
catalog_uri = "https://example.org/catalog"
"#,
        )
        .unwrap();
        let catalog = config.handlers["gfz_gipp"].catalogs[0].parsed().unwrap();
        assert!(catalog.auto_complete_field_uri.is_none());
        assert!(catalog.attribute_mapping.is_none());
    }

    #[test]
    fn test_trigger_attribute_alias() {
        let config: SensorSyncConfig = toml::from_str(
            r#"
[[handlers.sms.catalogs]]
catalog_uri = "c"
trigger_attribute_uri = "t"
"#,
        )
        .unwrap();
        assert_eq!(
            config.handlers["sms"].catalogs[0]
                .parsed()
                .unwrap()
                .auto_complete_field_uri
                .as_deref(),
            Some("t")
        );
    }

    #[test]
    fn test_malformed_entry_keeps_error() {
        let config: SensorSyncConfig = toml::from_str(
            r#"
[[handlers.o2a_registry.catalogs]]
catalog_uri = "urn:catalog"
auto_complete_field_uri = "urn:attr:id"
attribute_mapping = { "shortName" = 5 }

[[handlers.o2a_registry.catalogs]]
catalog_uri = "urn:catalog"
auto_complete_field_uri = "urn:attr:id"
attribute_mapping = { "shortName" = "urn:attr:name" }

[[handlers.o2a_registry.backends]]
id_prefix = 7
"#,
        )
        .unwrap();

        let handler = &config.handlers["o2a_registry"];
        let broken = &handler.catalogs[0];
        assert!(broken.parsed().is_err());
        assert_eq!(broken.raw_str("catalog_uri"), Some("urn:catalog"));
        assert!(handler.catalogs[1].parsed().is_ok());
        assert!(handler.backends[0].parsed().is_err());
        assert_eq!(handler.backends[0].raw_str("id_prefix"), None);
    }

    #[test]
    fn test_entry_from_typed_value() {
        let entry = ConfigEntry::from(BackendConfig {
            id_prefix: Some("sms".to_string()),
            base_url: None,
        });
        assert_eq!(entry.raw_str("id_prefix"), Some("sms"));
        assert_eq!(entry.parsed().unwrap().id_prefix.as_deref(), Some("sms"));
    }
}
