//! Service configuration.
//!
//! Loaded from a YAML file (`GYM_ADMIN_CONFIG`, or `gym_admin.yaml` in the
//! working directory when present), then overridden from the environment.
//! Every field has a default so the service starts with no file at all.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "gym_admin.yaml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub membership: MembershipRules,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Origin of the dashboard allowed by CORS
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Csv,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_directory: PathBuf,
    pub sheet_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Csv,
            data_directory: PathBuf::from("data"),
            sheet_name: "Members".to_string(),
        }
    }
}

/// Business constants of the gym's bookkeeping
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MembershipRules {
    /// Amount added to fees and total paid per daily pass
    pub daily_pass_fee: f64,
    /// Days ahead that count as "expiring soon" / "payment due"
    pub alert_window_days: i64,
    /// Length of the expiring-members list on the dashboard
    pub expiring_list_limit: usize,
    /// Local country prefix ignored when comparing phone numbers; empty disables it
    pub phone_country_code: String,
}

impl Default for MembershipRules {
    fn default() -> Self {
        Self {
            daily_pass_fee: 70.0,
            alert_window_days: 10,
            expiring_list_limit: 10,
            phone_country_code: "+91".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MembershipRules {
    pub fn country_code(&self) -> Option<&str> {
        Some(self.phone_country_code.trim()).filter(|cc| !cc.is_empty())
    }
}

impl AppConfig {
    /// Load configuration from the default locations and the environment
    pub fn load() -> Result<Self> {
        let explicit = std::env::var("GYM_ADMIN_CONFIG").ok().map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `GYM_ADMIN_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("GYM_ADMIN_BIND") {
            self.server.bind_address = bind;
        }
        if let Some(dir) = lookup("GYM_ADMIN_DATA_DIR") {
            self.storage.data_directory = PathBuf::from(dir);
        }
        if let Some(level) = lookup("GYM_ADMIN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.sheet_name.trim().is_empty() {
            bail!("storage.sheet_name cannot be empty");
        }
        if !self.membership.daily_pass_fee.is_finite() || self.membership.daily_pass_fee < 0.0 {
            bail!("membership.daily_pass_fee must be a non-negative amount");
        }
        if self.membership.alert_window_days < 1 {
            bail!("membership.alert_window_days must be at least 1");
        }
        if let Some(cc) = self.membership.country_code() {
            let digits = cc.strip_prefix('+').unwrap_or(cc);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                bail!("membership.phone_country_code must look like +91");
            }
        }
        if self.membership.expiring_list_limit == 0 {
            bail!("membership.expiring_list_limit must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.storage.sheet_name, "Members");
        assert_eq!(config.membership.daily_pass_fee, 70.0);
        assert_eq!(config.membership.alert_window_days, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
storage:
  backend: memory
membership:
  daily_pass_fee: 100
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.sheet_name, "Members");
        assert_eq!(config.membership.daily_pass_fee, 100.0);
        assert_eq!(config.membership.expiring_list_limit, 10);
        assert_eq!(config.membership.country_code(), Some("+91"));
    }

    #[test]
    fn test_example_file_is_valid() {
        let config = AppConfig::from_yaml(include_str!("../../gym_admin.example.yaml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.membership.daily_pass_fee, 70.0);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "GYM_ADMIN_BIND" => Some("0.0.0.0:9000".to_string()),
            "GYM_ADMIN_DATA_DIR" => Some("/srv/gym".to_string()),
            _ => None,
        });
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.storage.data_directory, PathBuf::from("/srv/gym"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_invalid_rules() {
        let config = AppConfig::from_yaml("membership:\n  alert_window_days: 0\n").unwrap();
        assert!(config.validate().is_err());

        assert!(AppConfig::from_yaml("storage: [not, a, map]").is_err());

        let config = AppConfig::from_yaml("membership:\n  phone_country_code: India\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_yaml("membership:\n  phone_country_code: ''\n").unwrap();
        assert_eq!(config.membership.country_code(), None);
        assert!(config.validate().is_ok());
    }
}
