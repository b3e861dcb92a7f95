use std::env;

use anyhow::{Context, Result};

use crate::db::DEFAULT_MAX_POOL_SIZE;

/// Startup configuration for the persistence core.
///
/// The core never inspects the process environment on its own; callers build
/// this struct explicitly and inject it. [`CoreConfig::from_env`] exists as a
/// convenience for binaries that do want environment-driven setup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
}

impl CoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_pool_size: DEFAULT_MAX_POOL_SIZE,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);

        Ok(Self {
            database_url,
            database_max_pool_size,
        })
    }
}
