use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}
