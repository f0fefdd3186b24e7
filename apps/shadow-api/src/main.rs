//! Shadow user service: wires the identity client, the shadow store and the
//! sync trigger endpoint together.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use orbit_api_sync::{router, SyncTriggerState, TriggerConfig};
use orbit_identity_client::{AuthorityConfig, IdentityClient};
use orbit_shadow::{PgUserStore, UserStore};

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orbit_identity_client=debug")),
        )
        .init();

    // Load configuration; every missing required setting is fatal here,
    // before any connection is attempted.
    let authority_config = AuthorityConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    let trigger_config = TriggerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        eprintln!("Configuration error: missing required environment variable: DATABASE_URL");
        std::process::exit(1);
    });
    let listen_addr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse::<SocketAddr>()
        .unwrap_or_else(|e| {
            eprintln!("Configuration error: invalid LISTEN_ADDR: {e}");
            std::process::exit(1);
        });

    tracing::info!(
        authority = %authority_config.endpoint_uri(),
        service = %authority_config.service_name,
        "starting shadow-api"
    );

    // Create database pool and bring the shadow schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Database connection error: {e}");
            std::process::exit(1);
        });

    let store = PgUserStore::new(pool);
    store.migrate().await.unwrap_or_else(|e| {
        eprintln!("Migration error: {e}");
        std::process::exit(1);
    });

    let client = Arc::new(IdentityClient::new(&authority_config));
    let store: Arc<dyn UserStore> = Arc::new(store);

    let state = SyncTriggerState::new(Arc::clone(&store), Arc::clone(&client), trigger_config);
    let app = router(state);

    tracing::info!(%listen_addr, "shadow-api listening");

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Bind error: {e}");
            std::process::exit(1);
        });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap_or_else(|e| {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    });

    // Teardown: release the authority channel explicitly rather than
    // leaving it to process exit.
    client.close().await;
    tracing::info!("authority connection closed; shutting down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }
}
