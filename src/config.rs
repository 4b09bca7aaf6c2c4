//! Environment-driven configuration.
//!
//! Values are read from the process environment after an optional `.env`
//! file has been loaded by the binary with `dotenvy`.

use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

use crate::orders::OrderPolicy;

/// Why configuration could not be loaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Longest admin session lifetime accepted from the environment, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Connection pool sizing. The pool ceiling is the only admission control:
/// callers beyond it queue until `acquire_timeout` elapses, then fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 1,
            acquire_timeout: Duration::from_millis(2_000),
            idle_timeout: Duration::from_millis(30_000),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool: PoolConfig,
    /// Absolute lifetime of an admin session from the moment it is issued.
    pub session_ttl: time::Duration,
    pub order_policy: OrderPolicy,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections)?,
            acquire_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_MS",
                defaults.acquire_timeout.as_millis() as u64,
            )?),
            idle_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_IDLE_TIMEOUT_MS",
                defaults.idle_timeout.as_millis() as u64,
            )?),
        };
        if pool.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "the pool needs at least one connection".into(),
            });
        }

        let ttl_hours: i64 = parse_or(&lookup, "SESSION_TTL_HOURS", 24)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: format!("must be between 1 and {MAX_SESSION_TTL_HOURS}"),
            });
        }

        Ok(Self {
            database_url,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3001)))?,
            pool,
            session_ttl: time::Duration::hours(ttl_hours),
            order_policy: OrderPolicy {
                decrement_stock: parse_or(&lookup, "ORDER_DECREMENTS_STOCK", false)?,
            },
        })
    }

    /// Sea-ORM connection options carrying the pool settings.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.database_url.clone());
        opt.max_connections(self.pool.max_connections)
            .min_connections(self.pool.min_connections)
            .acquire_timeout(self.pool.acquire_timeout)
            .idle_timeout(self.pool.idle_timeout);
        opt
    }

    /// Opens the connection pool.
    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        Database::connect(self.connect_options()).await
    }
}

pub(crate) fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
    }
}
