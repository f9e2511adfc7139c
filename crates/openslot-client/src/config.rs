//! Client configuration.
//!
//! All settings live in a single `config.toml` at
//! `~/.config/openslot/config.toml`. A commented default file is written
//! on first use. The `[people]` table maps aliases to email addresses for
//! the `people` commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use openslot_core::{WorkingWindowConfig, parse_timezone};

use crate::error::{ClientError, ClientResult};

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# openslot configuration

# Default account (primary SMTP address)
#account = "you@example.com"

# Timezone for all calendar operations
timezone = "Europe/Berlin"

# Free slot search
[free_slots]
# Only consider times between these hours (24h format)
start_hour = 9
end_hour = 17
# Skip Saturdays and Sundays
exclude_weekends = true

# Alias -> email mapping for the `people` commands
[people]
# ada = "ada.lovelace@example.com"

[auth]
# External OAuth helper binary
helper = "oama"

[server]
# socket_path = "/run/user/1000/openslot.sock"
timeout = 5
"#;

/// Configuration for the openslot client and daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default account (primary SMTP address).
    pub account: Option<String>,

    /// IANA timezone name for all calendar operations.
    pub timezone: TimezoneSetting,

    /// Free slot search settings.
    pub free_slots: FreeSlotsSettings,

    /// Alias -> email mapping for the `people` commands.
    pub people: BTreeMap<String, String>,

    /// Authentication settings.
    pub auth: AuthSettings,

    /// Daemon connection settings.
    pub server: ServerSettings,
}

/// Newtype so the timezone default is the documented one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimezoneSetting(pub String);

impl Default for TimezoneSetting {
    fn default() -> Self {
        Self("Europe/Berlin".to_string())
    }
}

/// Working-hours settings for free slot search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeSlotsSettings {
    /// Start of the working day (24h).
    pub start_hour: u32,
    /// End of the working day (24h).
    pub end_hour: u32,
    /// Skip Saturdays and Sundays.
    pub exclude_weekends: bool,
}

impl Default for FreeSlotsSettings {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            exclude_weekends: true,
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// External OAuth helper binary.
    pub helper: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            helper: "oama".to_string(),
        }
    }
}

/// Daemon connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Path to the daemon socket.
    pub socket_path: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: 5,
        }
    }
}

impl ClientConfig {
    /// Returns the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("openslot")
            .join("config.toml")
    }

    /// Loads configuration from the default path, writing the commented
    /// default file first if none exists.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&text)
            .map_err(|e| ClientError::config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Returns the validated working timezone.
    pub fn timezone(&self) -> ClientResult<Tz> {
        Ok(parse_timezone(&self.timezone.0)?)
    }

    /// Returns the validated working-window configuration.
    ///
    /// Invalid hours are a hard error here, before any query runs.
    pub fn working_window(&self) -> ClientResult<WorkingWindowConfig> {
        let tz = self.timezone()?;
        Ok(WorkingWindowConfig::new(
            self.free_slots.start_hour,
            self.free_slots.end_hour,
            self.free_slots.exclude_weekends,
            tz,
        )?)
    }

    /// Returns the account to act as, preferring the CLI override.
    pub fn account(&self, override_account: Option<&str>) -> ClientResult<String> {
        override_account
            .map(String::from)
            .or_else(|| self.account.clone())
            .ok_or_else(|| {
                ClientError::config("no account specified and no default configured")
            })
    }

    /// Resolves a person alias to an email address.
    ///
    /// Aliases match case-insensitively against the `[people]` table;
    /// anything containing `@` passes through verbatim. Unknown aliases
    /// are an error listing what is configured.
    pub fn resolve_person(&self, alias: &str) -> ClientResult<String> {
        for (name, email) in &self.people {
            if name.eq_ignore_ascii_case(alias) {
                return Ok(email.clone());
            }
        }

        if alias.contains('@') {
            return Ok(alias.to_string());
        }

        let available = if self.people.is_empty() {
            "none configured".to_string()
        } else {
            self.people
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(ClientError::invalid_argument(format!(
            "unknown person alias '{alias}'. Available aliases: {available}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let (_dir, path) = write_config("");
        let config = ClientConfig::load_from(&path).unwrap();

        assert_eq!(config.timezone.0, "Europe/Berlin");
        assert_eq!(config.free_slots.start_hour, 9);
        assert_eq!(config.free_slots.end_hour, 17);
        assert!(config.free_slots.exclude_weekends);
        assert_eq!(config.auth.helper, "oama");
        assert_eq!(config.server.timeout, 5);
        assert!(config.account.is_none());
    }

    #[test]
    fn full_file_parses() {
        let (_dir, path) = write_config(
            r#"
account = "me@example.com"
timezone = "Europe/Vienna"

[free_slots]
start_hour = 8
end_hour = 18
exclude_weekends = false

[people]
ada = "ada.lovelace@example.com"

[auth]
helper = "my-oauth-helper"

[server]
timeout = 9
"#,
        );
        let config = ClientConfig::load_from(&path).unwrap();

        assert_eq!(config.account.as_deref(), Some("me@example.com"));
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Vienna);
        let window = config.working_window().unwrap();
        assert_eq!(window.start_hour(), 8);
        assert_eq!(window.end_hour(), 18);
        assert!(!window.exclude_weekends);
        assert_eq!(config.auth.helper, "my-oauth-helper");
        assert_eq!(config.server.timeout, 9);
    }

    #[test]
    fn default_template_is_valid_toml() {
        let config: ClientConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.timezone.0, "Europe/Berlin");
        assert!(config.people.is_empty());
    }

    #[test]
    fn bad_timezone_is_a_config_error() {
        let (_dir, path) = write_config("timezone = \"Mars/Olympus\"");
        let config = ClientConfig::load_from(&path).unwrap();
        assert!(config.timezone().is_err());
    }

    #[test]
    fn backward_hours_are_rejected() {
        let (_dir, path) = write_config("[free_slots]\nstart_hour = 18\nend_hour = 9\n");
        let config = ClientConfig::load_from(&path).unwrap();
        assert!(config.working_window().is_err());
    }

    #[test]
    fn alias_resolution() {
        let mut config = ClientConfig::default();
        config
            .people
            .insert("Ada".to_string(), "ada.lovelace@example.com".to_string());

        assert_eq!(
            config.resolve_person("ada").unwrap(),
            "ada.lovelace@example.com"
        );
        assert_eq!(
            config.resolve_person("ADA").unwrap(),
            "ada.lovelace@example.com"
        );
        assert_eq!(
            config.resolve_person("grace@example.com").unwrap(),
            "grace@example.com"
        );

        let err = config.resolve_person("grace").unwrap_err();
        assert!(err.to_string().contains("Available aliases: Ada"));
    }

    #[test]
    fn account_override_wins() {
        let mut config = ClientConfig::default();
        assert!(config.account(None).is_err());

        config.account = Some("default@example.com".to_string());
        assert_eq!(config.account(None).unwrap(), "default@example.com");
        assert_eq!(
            config.account(Some("other@example.com")).unwrap(),
            "other@example.com"
        );
    }
}
