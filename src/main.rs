pub mod analytics;
pub mod attendance;
pub mod auth;
pub mod config;
mod error;
pub mod housing;
pub mod meal;
mod model;
mod repo;
mod schema;
pub mod session;
pub mod staff;
pub mod student;
pub mod validate;


use std::net::Ipv4Addr;
use std::sync::Arc;

use auth::{Keys, SecurityAddon};
use axum::{Json, Router};
use chrono::{NaiveDateTime, Utc};
use config::Config;
use diesel::{pg::Pg, Connection, PgConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

const AUTH_TAG: &str = "auth";
const STUDENT_TAG: &str = "student";
const STAFF_TAG: &str = "staff";
const HOUSING_TAG: &str = "housing";
const ATTENDANCE_TAG: &str = "attendance";
const MEAL_TAG: &str = "meal";
const ANALYTICS_TAG: &str = "analytics";
const HEALTH_TAG: &str = "health";

type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Clone)]
pub struct State {
    pool: Pool,
    keys: Arc<Keys>,
}

impl State {
    fn new(pool: Pool, config: &Config) -> Self {
        Self {
            pool,
            keys: Arc::new(Keys::new(
                &config.secret_key,
                config.token_lifetime_hours,
            )),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "SmartHostel API", description = "Hostel management backend"),
    modifiers(&SecurityAddon),
    tags(
        (name = AUTH_TAG, description = "Login and current user"),
        (name = STUDENT_TAG, description = "Student records"),
        (name = STAFF_TAG, description = "Employee records"),
        (name = HOUSING_TAG, description = "Rooms and hostels"),
        (name = ATTENDANCE_TAG, description = "Attendance log"),
        (name = MEAL_TAG, description = "Meal menu and opt-outs"),
        (name = ANALYTICS_TAG, description = "Daily analytics"),
        (name = HEALTH_TAG, description = "Liveness")
    )
)]
struct ApiDoc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn run_migrations(
    connection: &mut impl MigrationHarness<Pg>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

fn pool_builder(config: &Config) -> bb8::Builder<AsyncDieselConnectionManager<AsyncPgConnection>> {
    bb8::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.acquire_timeout)
}

#[derive(Debug, Serialize, ToSchema)]
struct Health {
    status: String,
    timestamp: NaiveDateTime,
}

/// Liveness probe
#[utoipa::path(get, path = "/health", responses((status = OK, body = Health)), tag = HEALTH_TAG)]
async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        timestamp: Utc::now().naive_utc(),
    })
}

fn app(state: State) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health))
        .nest("/api/auth", session::session_router())
        .nest("/api", student::student_router())
        .nest("/api", staff::staff_router())
        .nest("/api", housing::housing_router())
        .nest("/api", attendance::attendance_router())
        .nest("/api", meal::menu_router())
        .nest("/api", meal::choice_router())
        .nest("/api", analytics::analytics_router())
        .with_state(state)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/apidoc/openapi.json", api))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_filter(filter),
        )
        .init();

    let config = Config::from_env()?;

    let mut migration_connection = PgConnection::establish(&config.database_url)?;
    run_migrations(&mut migration_connection)?;
    drop(migration_connection);

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let pool = pool_builder(&config).build(manager).await?;
    let router = app(State::new(pool, &config));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
    info!("Listening on 0.0.0.0:{}", config.port);
    Ok(axum::serve(listener, router).await?)
}
