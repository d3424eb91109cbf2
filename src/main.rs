use barista_api::{app, config::AppConfig, store::DrinkStore, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let port = config.server.port;
    tracing::info!("starting barista API on port {}", port);

    let store = DrinkStore::connect(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to open drink store: {}", e));

    let state = AppState::new(config, store);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    axum::serve(listener, app(state)).await.expect("server");
}
