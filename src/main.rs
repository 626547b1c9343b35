use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable_backend::api::router;
use timetable_backend::auth;
use timetable_backend::clock::SystemClock;
use timetable_backend::config::AppConfig;
use timetable_backend::db;
use timetable_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://timetable.db".to_string());

    let pool = db::connect(&database_url).await?;
    db::init_schema(&pool).await?;

    let admin_username =
        std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    auth::ensure_admin_user(&pool, &admin_username, &admin_password).await?;

    let state = AppState {
        db: pool,
        clock: Arc::new(SystemClock),
        config: Arc::new(AppConfig::from_env()),
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
