use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[cfg(test)]
impl HashingConfig {
    /// Smallest legal cost, keeps tests fast.
    pub fn cheap() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub upload_root: PathBuf,
    pub max_upload_bytes: usize,
    pub redirect_delay_secs: u64,
    pub session: SessionConfig,
    pub hashing: HashingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let defaults = HashingConfig::default();
        let ttl_minutes: i64 = parse_or(&var, "SESSION_TTL_MINUTES", 60 * 24)?;
        anyhow::ensure!(ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive, got {ttl_minutes}");
        Ok(Self {
            database_url,
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 10)?,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "APP_PORT", 8080)?,
            upload_root: var("UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            redirect_delay_secs: parse_or(&var, "REDIRECT_DELAY_SECS", 2)?,
            session: SessionConfig {
                ttl_minutes,
                secure_cookie: parse_or(&var, "SESSION_SECURE_COOKIE", false)?,
            },
            hashing: HashingConfig {
                memory_kib: parse_or(&var, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_or(&var, "ARGON2_ITERATIONS", defaults.iterations)?,
                parallelism: parse_or(&var, "ARGON2_PARALLELISM", defaults.parallelism)?,
            },
        })
    }

    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}
