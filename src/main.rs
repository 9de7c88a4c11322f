//! PocketCare API - Hospital Management Backend
//!
//! Serves the appointment and doctor management endpoints used by the
//! PocketCare frontend. Database bootstrap lives in the separate
//! `apply-sql` binary.

use pocketcare_api::config::Settings;
use pocketcare_api::db;
use pocketcare_api::routes::create_router;
use pocketcare_api::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting PocketCare API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // Initialize database pool - REQUIRED (no in-memory fallback)
    let pool = db::create_pool(&settings.database);
    if let Err(e) = db::ping(&pool).await {
        error!("❌ FATAL: Failed to reach MySQL: {}", e);
        error!(
            "Check DB_HOST/DB_PORT/DB_USER/DB_PASSWORD (or DATABASE_URL) and run `apply-sql` \
             to bootstrap the schema"
        );
        anyhow::bail!("Cannot start server without database connection");
    }
    info!("✅ Database pool created successfully");

    let state = Arc::new(AppState::new(pool));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Appointments ───");
    info!("   GET    /api/hospital-appointments          - List appointments (+stats)");
    info!("   POST   /api/hospital-appointments          - Book appointment");
    info!("   PUT    /api/hospital-appointments/:id      - Update appointment");
    info!("   PUT    /api/hospital-appointments/:id/status - Update status");
    info!("   DELETE /api/hospital-appointments/:id      - Delete appointment");
    info!("   GET    /api/hospital-appointments/doctors  - Doctors for booking form");
    info!("");
    info!("   ─── Doctors ───");
    info!("   GET    /api/hospital-doctors               - List doctors");
    info!("   POST   /api/hospital-doctors               - Add doctor");
    info!("   PUT    /api/hospital-doctors/:id           - Update doctor");
    info!("   DELETE /api/hospital-doctors/:id           - Remove doctor");
    info!("   GET    /api/hospital-doctors/statistics    - Staff statistics");
    info!("   GET    /api/hospital-doctors/specialties   - Specialty picker");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pocketcare_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
