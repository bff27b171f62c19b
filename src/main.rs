use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chapel::{
    api,
    config::Settings,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chapel=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting {} on {}:{}", settings.site.name, settings.server.host, settings.server.port);

    // The site keeps serving from the fallback lists when the database is
    // disabled or cannot be opened at startup.
    let db_pool = if settings.database.enabled {
        let connect = SqlitePoolOptions::new()
            .max_connections(settings.database.max_connections)
            .acquire_timeout(Duration::from_millis(settings.database.timeout_ms))
            .connect(&settings.database.url)
            .await;

        match connect {
            Ok(pool) => {
                // Run migrations
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await?;
                Some(pool)
            }
            Err(e) => {
                tracing::warn!("Database unavailable ({}), using in-memory fallback lists", e);
                None
            }
        }
    } else {
        tracing::info!("Database disabled, using in-memory fallback lists");
        None
    };

    // Create service context
    let service_context = Arc::new(ServiceContext::from_settings(db_pool, &settings)?);

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
