//! Shared process entrypoint for the server binaries.

use crate::{config::Config, db::Database, resolve_bind_address, serve_router, AppState};
use sozluk_core::DEFAULT_PORT;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sync_on_start: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--sync" => flags.sync_on_start = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

/// Parse process arguments, initialize logging, and serve until shutdown.
///
/// `binary` is the executable name shown in `--help`.
///
/// # Errors
/// Returns an error for unsupported arguments, storage initialization
/// failures, or when the listener cannot be bound.
pub async fn run(binary: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sozluk=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help(binary);
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;
    let state = AppState::new(config.clone(), database)?;

    if config.api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; public lookup requests will be rejected");
    }
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is unset; admin routes are disabled");
    }

    if cli_flags.sync_on_start {
        // A stale dictionary still serves lookups, so startup continues.
        match state.sync.update().await {
            Ok(status) => tracing::info!("Startup sync finished: {:?}", status),
            Err(err) => tracing::warn!("Startup sync failed: {}", err),
        }
    }

    let allow_public = config.allow_public_access;
    if allow_public {
        tracing::warn!("Public access enabled - admin routes accept requests from any origin");
    }

    let bind_addr = resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("Sözlük API running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

fn print_help(binary: &str) {
    println!("Sözlük API Server\n");
    println!("Usage: {} [OPTIONS]\n", binary);
    println!("Options:");
    println!("  --sync            Download or update the dictionary before serving");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database path (default: ~/.cache/sozluk/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  DATA_BASE_URL     Object store base URL for dictionary files");
    println!("  DATA_FOLDER       Folder under DATA_BASE_URL (default: offline)");
    println!("  API_KEYS          Comma-separated keys accepted in x-api-key");
    println!("  ADMIN_API_KEY     Key required in x-admin-key for admin routes");
    println!("  AUTOCOMPLETE_LIMIT  Default autocomplete size (default: 10, max 50)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow admin CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
