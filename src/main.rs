use anyhow::{Context, Result};
use homebase::affirmations::AffirmationStore;
use homebase::api::{
    create_affirmations_router, create_connections_router, create_content_router,
    create_spotify_router, AffirmationAppState, ContentAppState, SpotifyAppState,
    SpotifyProvider,
};
use homebase::auth::SessionVerifier;
use homebase::config;
use homebase::content::{ApodClient, LlmClient};
use homebase::credentials::CredentialStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homebase=info,tower_http=info".into()),
        )
        .init();

    info!("Homebase starting...");

    let config = Arc::new(config::resolve().context("Failed to load configuration")?);

    for (integration, vars) in config.missing_integrations() {
        warn!(integration, vars, "Integration not configured, running with fallbacks");
    }

    let encryption_key = config
        .storage
        .encryption_key
        .clone()
        .context("HOMEBASE_ENCRYPTION_KEY is required (base64-encoded 32-byte key)")?;

    info!(
        bind_addr = %config.server.bind_addr,
        public_url = %config.server.public_url,
        db_path = %config.storage.db_path,
        production = config.server.production,
        "Configuration loaded"
    );

    // Stores share one database file
    let credential_store = Arc::new(
        CredentialStore::new(&config.storage.db_path, &encryption_key)
            .context("Failed to initialize credential store")?,
    );
    let affirmation_store = Arc::new(
        AffirmationStore::new(&config.storage.db_path)
            .context("Failed to initialize affirmation store")?,
    );
    info!("Stores initialized");

    let http = config.http.build_client()?;
    let sessions = SessionVerifier::new(http.clone(), config.session.clone());
    let llm = LlmClient::from_config(http.clone(), &config.openai);

    let spotify_state = SpotifyAppState {
        credential_store,
        sessions: sessions.clone(),
        provider: SpotifyProvider::from_config(&config),
        http: http.clone(),
        secure_cookies: config.server.production,
    };

    let affirmation_state = AffirmationAppState {
        store: affirmation_store,
        sessions,
        llm: llm.clone(),
    };

    let content_state = ContentAppState {
        llm,
        apod: Arc::new(ApodClient::new(http, config.nasa.clone())),
    };

    let app = create_spotify_router(spotify_state)
        .merge(create_affirmations_router(affirmation_state))
        .merge(create_content_router(content_state))
        .merge(create_connections_router(Arc::clone(&config)))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(bind_addr = %config.server.bind_addr, "Homebase listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Homebase stopped");

    Ok(())
}
