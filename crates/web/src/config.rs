use std::{
    env,
    net::{AddrParseError, SocketAddr},
};

use capture::{builder::DEFAULT_MIN_DISTANCE_METERS, TraceOptions, UndoPolicy};
use database::{DatabaseConnectionInfo, DEFAULT_DATABASE_URL};
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REGIONS_BIND_ADDRESS `{value}` is not a socket address: {source}")]
    BindAddress {
        value: String,
        source: AddrParseError,
    },

    #[error("REGIONS_MIN_DISTANCE_METERS `{value}` must be a non-negative number")]
    MinDistance { value: String },

    #[error("REGIONS_UNDO_POLICY: {0}")]
    UndoPolicy(String),
}

pub struct Config {
    pub bind_address: SocketAddr,
    pub database: DatabaseConnectionInfo,
    pub trace: TraceOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns the value of an
    /// environment variable if it is set. Unset variables take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("REGIONS_BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        let bind_address = bind_address
            .parse()
            .map_err(|source| ConfigError::BindAddress {
                value: bind_address.clone(),
                source,
            })?;

        let database = DatabaseConnectionInfo::new(
            lookup("REGIONS_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
        );

        let min_distance_meters = match lookup("REGIONS_MIN_DISTANCE_METERS") {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(meters) if meters.is_finite() && meters >= 0.0 => meters,
                _ => return Err(ConfigError::MinDistance { value }),
            },
            None => DEFAULT_MIN_DISTANCE_METERS,
        };

        let undo_policy = match lookup("REGIONS_UNDO_POLICY") {
            Some(value) => value.trim().parse().map_err(ConfigError::UndoPolicy)?,
            None => UndoPolicy::default(),
        };

        Ok(Self {
            bind_address,
            database,
            trace: TraceOptions {
                min_distance_meters,
                undo_policy,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.trace, TraceOptions::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("REGIONS_BIND_ADDRESS", "127.0.0.1:3000"),
            ("REGIONS_DATABASE_URL", "sqlite::memory:"),
            ("REGIONS_MIN_DISTANCE_METERS", "7.5"),
            ("REGIONS_UNDO_POLICY", "reset-anchor"),
        ])
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.trace.min_distance_meters, 7.5);
        assert_eq!(config.trace.undo_policy, UndoPolicy::ResetAnchor);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("REGIONS_BIND_ADDRESS", "localhost")]),
            Err(ConfigError::BindAddress { .. })
        ));
        assert!(matches!(
            config(&[("REGIONS_MIN_DISTANCE_METERS", "-1")]),
            Err(ConfigError::MinDistance { .. })
        ));
        assert!(matches!(
            config(&[("REGIONS_MIN_DISTANCE_METERS", "NaN")]),
            Err(ConfigError::MinDistance { .. })
        ));
        assert!(matches!(
            config(&[("REGIONS_UNDO_POLICY", "forget")]),
            Err(ConfigError::UndoPolicy(_))
        ));
    }
}
