use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::signal;
use tracing::{error, info, warn};

use game_persistence::DatabaseManager;
use game_server::{
    admin::AdminService,
    auth::AdminAuth,
    build_ai,
    config::Config,
    create_routes,
    game_service::{GameService, GameSettings},
};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            _ => warn!("Failed to install signal handlers, falling back to Ctrl+C"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Hver er maðurinn? server...");

    let config = Config::new();
    let settings = GameSettings::from_config(&config);
    if settings.force_round_open {
        warn!("FORCE_ROUND_OPEN is set, every round is open");
    }
    if settings.dev_random_round_per_session {
        warn!("DEV_RANDOM_ROUND_PER_SESSION is set, sessions get random rounds");
    }

    // Initialize database connection and run migrations
    let db = match DatabaseManager::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let (resolver, classifier) = build_ai(&config);
    let game_service = GameService::new(db.clone(), settings)
        .with_resolver(resolver)
        .with_classifier(classifier);

    if let Err(e) = game_service.prepare(Utc::now()).await {
        error!("Failed to seed default persons: {}", e);
        std::process::exit(1);
    }

    let admin_auth = AdminAuth::new(config.admin_token.as_deref());
    if !admin_auth.is_configured() {
        warn!("ADMIN_TOKEN is not set, admin endpoints are disabled");
    }
    let admin_service = AdminService::new(db, admin_auth, settings.calculator);

    let routes = create_routes(Arc::new(game_service), Arc::new(admin_service));

    let host = match config.host.parse::<IpAddr>() {
        Ok(host) => host,
        Err(e) => {
            error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((host, config.port), shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
