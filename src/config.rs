use dotenvy::dotenv;
use std::env;
use std::ops::RangeInclusive;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ANTIFORGERY_TTL_MINUTES: i64 = 120;
const MAX_CONNECTIONS_RANGE: RangeInclusive<u32> = 1..=1_000;
/// One minute to one year.
const ANTIFORGERY_TTL_RANGE: RangeInclusive<i64> = 1..=525_600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub antiforgery_secret: String,
    pub antiforgery_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port = parse(
            "PORT",
            "a valid u16 number",
            required("PORT")?,
        )?;

        let database_url = required("DATABASE_URL")?;

        let antiforgery_secret = required("ANTIFORGERY_SECRET")?;
        if antiforgery_secret.trim().is_empty() {
            return Err(ConfigError::Missing("ANTIFORGERY_SECRET"));
        }

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => parse_bounded(
                "DB_MAX_CONNECTIONS",
                "an integer between 1 and 1000",
                v,
                MAX_CONNECTIONS_RANGE,
            )?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let antiforgery_ttl_minutes = match lookup("ANTIFORGERY_TTL_MINUTES") {
            Some(v) => parse_bounded(
                "ANTIFORGERY_TTL_MINUTES",
                "a number of minutes between 1 and 525600",
                v,
                ANTIFORGERY_TTL_RANGE,
            )?,
            None => DEFAULT_ANTIFORGERY_TTL_MINUTES,
        };

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            antiforgery_secret,
            antiforgery_ttl_minutes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, expected, value })
}

fn parse_bounded<T: std::str::FromStr + PartialOrd>(
    name: &'static str,
    expected: &'static str,
    value: String,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(v) if range.contains(&v) => Ok(v),
        _ => Err(ConfigError::Invalid { name, expected, value }),
    }
}
