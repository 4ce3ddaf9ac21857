//! Shared router state.

use std::sync::Arc;

use estok_core::StockPolicy;
use estok_db::Database;

use crate::config::ServerConfig;

/// State cloned into every handler: the database handle, the stock policy,
/// and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub policy: StockPolicy,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            policy: config.stock_policy(),
            db,
            config: Arc::new(config),
        }
    }
}
