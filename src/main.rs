use axum::{
    routing::{get, post},
    Router,
};
use linebot_bridge::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let webhook_routes = Router::new().route("/webhook/", post(routes::webhook::handle_webhook));

    let admin_api = Router::new()
        .route("/api/admin/users", get(routes::admin::list_users))
        .route("/api/admin/messages", get(routes::admin::list_messages));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .nest(&config.webhook_path_prefix, webhook_routes)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    info!("LINE webhook mounted at {}/webhook/", config.webhook_path_prefix);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
