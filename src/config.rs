use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Stayforecast";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_BIND: &str = "STAYFORECAST_BIND";
pub const ENV_DATA_DIR: &str = "STAYFORECAST_DATA_DIR";
pub const ENV_DB: &str = "STAYFORECAST_DB";
pub const ENV_ARTIFACTS: &str = "STAYFORECAST_ARTIFACTS";
pub const ENV_FACILITIES: &str = "STAYFORECAST_FACILITIES";

const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot determine home directory; set STAYFORECAST_DATA_DIR")]
    NoHomeDir,
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "stayforecast_lib=info,stayforecast=info"
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    /// Directory holding `onehot_encoder.json`, `robust_scaler.json` and `model.json`.
    pub artifacts_dir: PathBuf,
    /// Optional JSON array of facilities upserted at startup.
    pub facilities_seed: PathBuf,
}

impl AppConfig {
    /// Settings rooted at `data_dir`, everything else at its default.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_path: data_dir.join("stayforecast.db"),
            artifacts_dir: data_dir.join("artifacts"),
            facilities_seed: data_dir.join("facilities.json"),
            data_dir,
        }
    }

    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve settings through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let data_dir = match get(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let mut config = Self::with_data_dir(data_dir);

        let bind = get(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        config.bind_addr = bind.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                var: ENV_BIND,
                reason: format!("'{bind}': {e}"),
            }
        })?;

        if let Some(path) = get(ENV_DB) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_ARTIFACTS) {
            config.artifacts_dir = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_FACILITIES) {
            config.facilities_seed = PathBuf::from(path);
        }
        Ok(config)
    }
}

/// ~/Stayforecast/ on all platforms
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
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
        move |var| map.get(var).cloned()
    }

    #[test]
    fn paths_default_under_data_dir() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "/srv/stay")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/stay"));
        assert_eq!(config.database_path, PathBuf::from("/srv/stay/stayforecast.db"));
        assert_eq!(config.artifacts_dir, PathBuf::from("/srv/stay/artifacts"));
        assert_eq!(config.facilities_seed, PathBuf::from("/srv/stay/facilities.json"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/stay"),
            (ENV_DB, "/var/lib/stay.db"),
            (ENV_ARTIFACTS, "/opt/models"),
            (ENV_BIND, "0.0.0.0:9000"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/stay.db"));
        assert_eq!(config.artifacts_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let config =
            AppConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "/srv/stay"), (ENV_DB, "  ")])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/stay/stayforecast.db"));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/stay"),
            (ENV_BIND, "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_BIND, .. }));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
