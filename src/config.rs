use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    /// Cookie signing secret; at least 64 bytes when set.
    pub secret_key: Option<String>,
    pub session_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movieshelf.db?mode=rwc".to_string());

        let secret_key = std::env::var("SECRET_KEY").ok().filter(|s| !s.is_empty());
        if let Some(secret) = &secret_key {
            anyhow::ensure!(secret.len() >= 64, "SECRET_KEY must be at least 64 bytes");
        }

        let session_days: i64 =
            std::env::var("SESSION_DAYS").ok().and_then(|s| s.parse().ok()).unwrap_or(14);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            secret_key,
            session_days,
        })
    }
}
