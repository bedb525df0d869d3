use axum::{
    routing::{get, post},
    Router,
};
use learnpal_backend::middleware::rate_limit::{quota_middleware, QuotaLimiter};
use learnpal_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth::require_session,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
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

    {
        let sessions = app_state.sessions.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                let purged = sessions.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Expired sessions dropped");
                }
            }
        });
    }

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Chat completion carries its own, tighter per-minute quota on top of
    // the service-wide one.
    let chat_api = Router::new()
        .route("/get_response", post(routes::chat::get_response))
        .layer(axum::middleware::from_fn_with_state(
            QuotaLimiter::per_minute(config.chat_per_minute),
            quota_middleware,
        ));

    let authed_api = Router::new()
        .route("/logout", get(routes::auth::logout))
        .route("/profile", get(routes::auth::profile))
        .route("/update_profile", post(routes::auth::update_profile))
        .route("/test_setup", post(routes::quiz::test_setup))
        .route(
            "/questions/:step",
            get(routes::quiz::get_question).post(routes::quiz::submit_answer),
        )
        .route("/answers", get(routes::quiz::answers))
        .route(
            "/iq_test",
            get(routes::iq::get_iq_test).post(routes::iq::submit_iq_test),
        )
        .route("/iq_results", get(routes::iq::iq_results))
        .route("/stats", get(routes::stats::stats))
        .route("/chatbot", get(routes::chat::chat_history))
        .route("/clear_chat", post(routes::chat::clear_chat))
        .route("/course", get(routes::course::recommended_courses))
        .merge(chat_api)
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    let app = public_api
        .merge(authed_api)
        .layer(axum::middleware::from_fn_with_state(
            QuotaLimiter::global(config.hourly_quota, config.daily_quota),
            quota_middleware,
        ))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
