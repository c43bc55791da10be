use anyhow::{bail, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::dispatch::tracking::TrackingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub db_max_connections: u32,
    pub tracking_tick_ms: u64,
    pub tracking_initial_eta_minutes: u32,
    pub seed_demo_data: bool,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `load` uses the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = var("PORT", "50053").parse().unwrap_or(50053);
        let store_backend = var("STORE_BACKEND", "postgres").parse()?;

        let db_host = var("DB_HOST", "localhost");
        let db_port = var("DB_PORT", "5432");
        let db_name = var("DB_DATABASE", "emergency_db");
        let db_user = var("DB_USER", "emergency_user");
        let db_pwd = var("DB_PWD", "emergency");

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );
        let db_max_connections = var("DB_MAX_CONNECTIONS", "10").parse().unwrap_or(10);

        let tracking_tick_ms = var("TRACKING_TICK_MS", "1000").parse().unwrap_or(1000);
        let tracking_initial_eta_minutes = var("TRACKING_INITIAL_ETA_MINUTES", "10")
            .parse()
            .unwrap_or(10);

        let seed_demo_data = matches!(
            var("SEED_DEMO_DATA", "true").to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );

        let log_level = var("LOG_LEVEL", "info");

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            db_max_connections,
            tracking_tick_ms,
            tracking_initial_eta_minutes,
            seed_demo_data,
            log_level,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tracking_params(&self) -> TrackingParams {
        TrackingParams::default()
            .with_tick(Duration::from_millis(self.tracking_tick_ms.max(1)))
            .with_initial_eta(self.tracking_initial_eta_minutes)
    }
}
