use branching_chat::{
    Settings, SessionService,
    api::create_router,
    domain::Message,
    stream::SimulatedEmitter,
};
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[derive(Debug, Parser)]
#[command(name = "branching-chat", about = "Branching conversation session service")]
struct Args {
    /// Bind host (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Delay between simulated response tokens, in milliseconds
    #[arg(long)]
    stream_delay_ms: Option<u64>,

    /// Start with an empty main flow instead of the demo conversation
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branching_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration, CLI flags taking precedence over env
    let args = Args::parse();
    let mut settings =
        Settings::from_env().map_err(|e| format!("Failed to load settings: {}", e))?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(delay) = args.stream_delay_ms {
        settings.app.stream_delay_ms = delay;
    }
    if args.no_seed {
        settings.app.seed_conversation = false;
    }

    tracing::info!("Starting branching chat session service");

    // Initialize the session behind its service
    let emitter = SimulatedEmitter::new(settings.app.stream_delay_ms);
    let service = Arc::new(SessionService::new(emitter));

    if settings.app.seed_conversation {
        service.update_main_messages(seed_conversation());
        tracing::info!("Seeded demo conversation");
    }

    // Build router
    let app = create_router(service)
        .layer(CorsLayer::permissive())
        .layer(tower_http::catch_panic::CatchPanicLayer::new());

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check available at: http://{}/health", addr);
    tracing::info!("Session API available at: http://{}/api/v1/session", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// The conversation the UI boots with, mirroring a short exchange a user
/// might branch from.
fn seed_conversation() -> Vec<Message> {
    vec![
        Message::assistant(
            "Hi! I'm your assistant. I can help with anything from programming to \
             creative writing to data analysis. Select any part of my replies to \
             explore it in a side branch. What can I do for you?",
        ),
        Message::user(
            "I've been learning Rust lately. Can you explain the difference between \
             Rc and Arc, and when to reach for each?",
        ),
        Message::assistant(
            "Happy to! Rc is a single-threaded reference-counted pointer: cloning it \
             bumps a plain counter, which is cheap but not safe to share across \
             threads. Arc uses atomic operations for the counter, so clones can move \
             between threads at a small synchronization cost. Reach for Rc inside one \
             thread, and for Arc the moment a value has to outlive or cross a thread \
             boundary.",
        ),
        Message::user("Got it. Should I just default to Arc everywhere to be safe?"),
        Message::assistant(
            "Not recommended! Defaulting to Arc costs you atomic traffic you may not \
             need and, worse, hides the design question of who actually owns the \
             data. Start with plain ownership and borrows, introduce Rc when shared \
             ownership within a thread is genuinely required, and switch to Arc only \
             when the sharing crosses threads.",
        ),
    ]
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut terminate_signal =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                }
            },
            _ = terminate_signal.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
        }
    }

    tracing::info!("Shutdown signal received, commencing graceful shutdown");
}
