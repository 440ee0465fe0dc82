use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_booking::{
    config::Config,
    controllers,
    database::Database,
    redis_client::RedisClient,
    session::store::SessionStore,
    AppState,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cinema Booking API");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size)
        .await
        .expect("Failed to connect to database");
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    // Connect to Redis (session store)
    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    info!("Redis connected");

    let sessions = SessionStore::new(redis.clone(), config.auth.session_ttl_seconds);

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db,
        redis,
        sessions,
        config: config.clone(),
    });

    // Create the main router
    let app = Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        // Pass the application state to the router
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
