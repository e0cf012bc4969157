use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://taskboard.sqlite?mode=rwc";
const DEFAULT_HOST: [u8; 4] = [127, 0, 0, 1];
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_INVITE_TTL_DAYS: i64 = 7;
const MAX_INVITE_TTL_DAYS: i64 = 3650;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub invite_ttl_days: i64,
}

impl ServerConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = match var("HOST") {
            Some(raw) => raw.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
                name: "HOST",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => IpAddr::from(DEFAULT_HOST),
        };
        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let invite_ttl_days = match var("INVITE_TTL_DAYS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(days) if (1..=MAX_INVITE_TTL_DAYS).contains(&days) => days,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "INVITE_TTL_DAYS",
                        value: raw,
                        reason: format!("must be between 1 and {MAX_INVITE_TTL_DAYS}"),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "INVITE_TTL_DAYS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
            None => DEFAULT_INVITE_TTL_DAYS,
        };

        Ok(Self {
            database_url,
            host,
            port,
            invite_ttl_days,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = load(&[("PORT", "  ")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.invite_ttl_days, 7);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("INVITE_TTL_DAYS", "14"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.invite_ttl_days, 14);
    }

    #[test]
    fn invalid_values_fail_startup() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("INVITE_TTL_DAYS", "0")]),
            Err(ConfigError::Invalid {
                name: "INVITE_TTL_DAYS",
                ..
            })
        ));
        assert!(matches!(
            load(&[("HOST", "not a host")]),
            Err(ConfigError::Invalid { name: "HOST", .. })
        ));
    }

    #[test]
    fn invite_ttl_is_bounded_above() {
        assert_eq!(
            load(&[("INVITE_TTL_DAYS", "3650")]).unwrap().invite_ttl_days,
            3650
        );
        for raw in ["3651", "100000000", "9223372036854775807"] {
            assert!(
                matches!(
                    load(&[("INVITE_TTL_DAYS", raw)]),
                    Err(ConfigError::Invalid {
                        name: "INVITE_TTL_DAYS",
                        ..
                    })
                ),
                "{raw}"
            );
        }
    }
}
