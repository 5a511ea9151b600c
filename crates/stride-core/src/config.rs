use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level client configuration (loaded from stride.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrideConfig {
    pub crypto: CryptoConfig,
    pub device: DeviceConfig,
    pub store: StoreConfig,
    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

/// Key-derivation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA256 iteration count (default: 100000)
    ///
    /// Chosen to keep derivation under ~1s on commodity hardware while
    /// still making offline guessing expensive. Lower values are for
    /// tests only.
    pub pbkdf2_iterations: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 100_000,
        }
    }
}

/// Device credential cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Keep the passphrase (obscured, not encrypted) on this device so
    /// unlock can skip re-entry. Only sensible on a personal device.
    pub remember_device: bool,
    /// Path of the device auth file (default: ~/.config/stride/device_auth.json)
    pub auth_file: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            remember_device: false,
            auth_file: None,
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the local record file (default: ~/.local/share/stride/records.json)
    pub data_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_file: None }
    }
}

/// Default stride config directory, honoring XDG_CONFIG_HOME.
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        })
        .join("stride")
}

/// Default stride data directory, honoring XDG_DATA_HOME.
pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".local").join("share")
        })
        .join("stride")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
log_level = "debug"

[crypto]
pbkdf2_iterations = 200000

[device]
remember_device = true
auth_file = "/tmp/device_auth.json"

[store]
data_file = "/tmp/records.json"
"#;
        let config: StrideConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.crypto.pbkdf2_iterations, 200_000);
        assert!(config.device.remember_device);
        assert_eq!(
            config.device.auth_file,
            Some(PathBuf::from("/tmp/device_auth.json"))
        );
        assert_eq!(
            config.store.data_file,
            Some(PathBuf::from("/tmp/records.json"))
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config: StrideConfig = toml::from_str("").unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.crypto.pbkdf2_iterations, 100_000);
        assert!(!config.device.remember_device);
        assert!(config.device.auth_file.is_none());
        assert!(config.store.data_file.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[crypto]
pbkdf2_iterations = 1000
"#;
        let config: StrideConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.crypto.pbkdf2_iterations, 1000);
        // Defaults
        assert_eq!(config.log_level, "info");
        assert!(!config.device.remember_device);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = StrideConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: StrideConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.crypto.pbkdf2_iterations,
            parsed.crypto.pbkdf2_iterations
        );
        assert_eq!(config.log_level, parsed.log_level);
    }
}
