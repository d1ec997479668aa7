use anyhow::{Context, Result};
use std::{env, str::FromStr};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingJobConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST").context("DATABASE_HOST is not set")?,
            port: parse_or("DATABASE_PORT", 5432)?,
            username: env::var("DATABASE_USERNAME").context("DATABASE_USERNAME is not set")?,
            password: env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD is not set")?,
            database: env::var("DATABASE_NAME").context("DATABASE_NAME is not set")?,
        };
        let pricing = PricingJobConfig {
            reprice_interval_secs: parse_or("REPRICE_INTERVAL_SECS", 3600)?,
            max_attempts: parse_or("REPRICE_MAX_ATTEMPTS", 3)?,
        };
        let server = ServerConfig {
            port: parse_or("PORT", 8080)?,
        };
        Ok(Self {
            database,
            pricing,
            server,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct PricingJobConfig {
    /// 0 disables the periodic repricing job.
    pub reprice_interval_secs: u64,
    pub max_attempts: u32,
}

pub struct ServerConfig {
    pub port: u16,
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
