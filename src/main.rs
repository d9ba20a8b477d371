use std::sync::Arc;

use askaway::store::RealtimeDb;
use askaway::{AppState, auth, index, rooms};
use axum::{Router, routing::get};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://askaway.db?mode=rwc".to_owned());
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&database_url)
        .await
        .expect("database misconfigured");
    let db = Arc::new(RealtimeDb::open(db_pool).await.expect("failed to load documents"));

    let secret_path =
        dotenv::var("CLIENT_SECRET_PATH").unwrap_or_else(|_| "client_secret.json".to_owned());
    let secret = std::fs::read_to_string(&secret_path).expect("client secret missing");
    let public_url =
        dotenv::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned());
    let clients = auth::Clients::from_json(
        serde_json::from_str(&secret).expect("client secret is not json"),
        &public_url,
    )
    .expect("client secret incomplete");

    let app_state = AppState { db, clients };

    let app = Router::new()
        .route("/", get(index::index))
        .merge(auth::router())
        .nest("/r", rooms::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.expect("failed to bind");
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app).await.expect("server error");
}
