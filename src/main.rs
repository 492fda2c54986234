use printdesk::bootstrap;
use printdesk::config::Config;
use printdesk::infrastructure::http::router::build_router;
use printdesk::infrastructure::observability;
use printdesk::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Tracing, optional OTLP export and the Prometheus endpoint
    let _observability = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    // Build application state (and start background jobs)
    let state = bootstrap::build_app_state(db, &config).await?;

    // Initialize admin user
    if let Err(e) = bootstrap::initialize_admin(&state, &config).await {
        tracing::error!("Failed to initialize admin user: {}", e);
        return Err(e.into());
    }

    let app = build_router(state);

    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
