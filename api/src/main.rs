use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod dialog;
mod error;
mod extract;
mod identity;
mod routes;
mod session;
mod state;
mod store;

use config::SkillConfig;
use dialog::Dialog;
use identity::SalesforceIdentity;
use session::SessionStore;
use store::postgres::PgOpportunityStore;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sales Assistant Skill API",
        version = "0.1.0",
        description = "Voice skill backend for looking up, updating and reporting on Salesforce opportunities."
    ),
    paths(routes::health::health_check, routes::skill::handle_turn),
    components(schemas(
        routes::health::HealthResponse,
        sales_assistant_core::error::ApiError,
        sales_assistant_core::skill::RequestEnvelope,
        sales_assistant_core::skill::SessionInfo,
        sales_assistant_core::skill::PlatformUser,
        sales_assistant_core::skill::Context,
        sales_assistant_core::skill::SystemContext,
        sales_assistant_core::skill::Device,
        sales_assistant_core::skill::ResponseEnvelope,
        sales_assistant_core::skill::ResponseBody,
        sales_assistant_core::skill::OutputSpeech,
        sales_assistant_core::skill::Reprompt,
        sales_assistant_core::slots::Slot,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_assistant_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = SkillConfig::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let identity =
        SalesforceIdentity::new(&config.login_url).expect("SALESFORCE_LOGIN_URL cannot be joined");
    let dialog = Dialog::new(
        PgOpportunityStore::new(pool.clone(), config.schema.clone()),
        identity,
        SessionStore::new(config.session_ttl),
        config.dialog.clone(),
    );
    let app_state = state::AppState {
        db: pool,
        dialog: Arc::new(dialog),
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::skill::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        schema = ?config.schema,
        revenue = ?config.dialog.revenue,
        "Sales assistant skill listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
