//! Configuration loading and management

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::helper::{default_fallback_dir, HelperConfig, DEFAULT_HELPER_PROGRAM};
use crate::host::{NotificationName, KEY_NOTIFIER_MESSAGE, KEY_NOTIFIER_OBJECT};

/// Environment variable naming the helper program
pub const ENV_HELPER: &str = "ENSO_KEY_NOTIFIER";
/// Environment variable naming the helper fallback directory
pub const ENV_HELPER_DIR: &str = "ENSO_KEY_NOTIFIER_DIR";
/// Environment variable naming the notification object
pub const ENV_NOTIFY_OBJECT: &str = "ENSO_NOTIFY_OBJECT";
/// Environment variable naming the notification message
pub const ENV_NOTIFY_NAME: &str = "ENSO_NOTIFY_NAME";

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// How to find and launch the key notifier
    pub helper: HelperConfig,

    /// Channel the key notifier posts on
    pub channel: NotificationName,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let program = lookup(ENV_HELPER).unwrap_or_else(|| DEFAULT_HELPER_PROGRAM.to_string());
        if program.trim().is_empty() {
            bail!("{ENV_HELPER} is set but empty");
        }

        let fallback_dir = match lookup(ENV_HELPER_DIR) {
            Some(dir) => Some(PathBuf::from(dir)),
            None => default_fallback_dir(),
        };

        let channel = NotificationName::new(
            lookup(ENV_NOTIFY_OBJECT).unwrap_or_else(|| KEY_NOTIFIER_OBJECT.to_string()),
            lookup(ENV_NOTIFY_NAME).unwrap_or_else(|| KEY_NOTIFIER_MESSAGE.to_string()),
        );

        Ok(Self {
            helper: HelperConfig {
                program,
                fallback_dir,
            },
            channel,
        })
    }

    /// Ensure the helper fallback directory, if any, is a directory
    pub fn check_fallback_dir(&self) -> Result<()> {
        if let Some(dir) = &self.helper.fallback_dir {
            if dir.exists() && !dir.is_dir() {
                bail!("key notifier fallback {} is not a directory", dir.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.helper.program, "EnsoKeyNotifier");
        assert_eq!(config.channel, NotificationName::default());
        assert!(config.helper.fallback_dir.unwrap().ends_with("bin"));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_HELPER, "KeyNotifierDev"),
            (ENV_HELPER_DIR, "/opt/enso/bin"),
            (ENV_NOTIFY_OBJECT, "Dev"),
            (ENV_NOTIFY_NAME, "Dev_msg"),
        ]))
        .unwrap();

        assert_eq!(config.helper.program, "KeyNotifierDev");
        assert_eq!(config.helper.fallback_dir, Some(PathBuf::from("/opt/enso/bin")));
        assert_eq!(config.channel, NotificationName::new("Dev", "Dev_msg"));
    }

    #[test]
    fn test_empty_program_is_rejected() {
        assert!(Config::from_lookup(lookup(&[(ENV_HELPER, " ")])).is_err());
    }

    #[test]
    fn test_check_fallback_dir() {
        let mut config = Config::from_lookup(lookup(&[(ENV_HELPER_DIR, "/nonexistent")])).unwrap();
        assert!(config.check_fallback_dir().is_ok());

        config.helper.fallback_dir = Some(std::env::current_exe().unwrap());
        assert!(config.check_fallback_dir().is_err());
    }
}
