use chrono::FixedOffset;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Fixed offset for day bucketing. `None` uses the server's local zone.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            utc_offset: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            match value.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(err) => warn!("ignoring PORT={value:?}: {err}"),
            }
        }

        if let Some(path) = lookup("APP_DATA_PATH").filter(|path| !path.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }

        if let Some(value) = lookup("APP_UTC_OFFSET_MINUTES") {
            config.utc_offset = value
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(|minutes| minutes.checked_mul(60))
                .and_then(FixedOffset::east_opt);
            if config.utc_offset.is_none() {
                warn!("ignoring APP_UTC_OFFSET_MINUTES={value:?}, using local time zone");
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
        assert!(config.utc_offset.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("APP_DATA_PATH", "/tmp/history.json"),
            ("APP_UTC_OFFSET_MINUTES", "-300"),
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.data_path, PathBuf::from("/tmp/history.json"));
        assert_eq!(config.utc_offset, FixedOffset::west_opt(5 * 3600));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("APP_UTC_OFFSET_MINUTES", "100000")]);
        assert_eq!(config.port, 8080);
        assert!(config.utc_offset.is_none());
    }
}
