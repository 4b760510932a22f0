mod accounts;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod forms;
mod models;
mod routes;
mod session;
mod templates;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::{accounts::Accounts, catalog::Catalog, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub accounts: Accounts,
    pub key: Key,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DatabaseConnection, key: Key) -> Self {
        Self {
            catalog: Catalog::new(db.clone()),
            accounts: Accounts::new(db),
            config,
            key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movieshelf=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let key = match &config.secret_key {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|_| anyhow::anyhow!("SECRET_KEY must be at least 64 bytes"))?,
        None => {
            tracing::warn!("SECRET_KEY not set; sessions will not survive a restart");
            Key::generate()
        },
    };

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = AppState::new(config.clone(), db, key);

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
