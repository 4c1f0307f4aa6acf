//! Command-line client for the Sözlük offline dictionary.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::Value;
use sozluk_core::models::word::WordRecord;
use sozluk_core::offline::{decide, Request};
use sozluk_core::search::{autocomplete, AutocompleteOptions};
use sozluk_core::sync::cache::{network_or_cached, ResolvedValue, ValueOrigin};
use sozluk_core::sync::{HttpSource, SyncManager, SyncProgress, SyncStatus};
use sozluk_core::text::fold_turkish;
use sozluk_core::{AppError, Config, Database};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:38420";

#[derive(Parser)]
#[command(name = "sozluk", about = "Sözlük offline dictionary CLI", version)]
struct Cli {
    /// Local store directory (defaults to DB_PATH or ~/.cache/sozluk/db)
    #[arg(long, env = "DB_PATH", global = true)]
    db_path: Option<String>,

    /// Object store base URL for dictionary files
    #[arg(long, env = "DATA_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for each operation
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "60", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Compare the local dictionary against the remote manifest
    Status,
    /// Download the dictionary for the first time
    Download,
    /// Update the local dictionary to the remote version
    Update,
    /// Delete the local dictionary
    Delete,
    /// Autocomplete against the local dictionary
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only return names that start with the query
        #[arg(long)]
        prefix_only: bool,
    },
    /// Show a word from the local dictionary
    Show { word: String },
    /// Look a word up through the public API, falling back to the local cache
    Lookup {
        word: String,
        /// API server URL
        #[arg(short, long, env = "SOZLUK_SERVER")]
        server: Option<String>,
        /// Key sent as x-api-key
        #[arg(long, env = "SOZLUK_API_KEY")]
        api_key: Option<String>,
    },
    /// Explain how the web client serves a path while offline or online
    Route {
        path: String,
        /// Treat the request as an asset fetch instead of a page navigation
        #[arg(long)]
        asset: bool,
        #[arg(long)]
        offline: bool,
    },
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

fn exit_with(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn explicit_override(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_config(db_path: Option<String>, base_url: Option<String>) -> Config {
    let mut config = Config::from_env();
    if let Some(db_path) = explicit_override(db_path) {
        config.db_path = db_path;
    }
    if let Some(base_url) = explicit_override(base_url) {
        config.data_base_url = base_url.trim_end_matches('/').to_string();
    }
    config
}

fn lookup_cache_key(word: &str) -> String {
    format!("word:{}", fold_turkish(word))
}

fn format_status(status: &SyncStatus, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(status)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(match status {
        SyncStatus::Idle => "Idle".to_string(),
        SyncStatus::Checking => "Checking for updates".to_string(),
        SyncStatus::NotDownloaded => "Offline dictionary is not downloaded".to_string(),
        SyncStatus::UpToDate { version } => {
            format!("Offline dictionary is up to date (version {})", version)
        }
        SyncStatus::UpdateAvailable { local, remote } => {
            format!("Update available: {} -> {}", local, remote)
        }
        SyncStatus::Downloading { processed, total } => {
            format!("Downloading {}/{}", processed, total)
        }
        SyncStatus::Error { message } => format!("Sync error: {}", message),
    })
}

fn format_progress(progress: &SyncProgress) -> String {
    format!(
        "[{}/{}] {} ({:.0}%)",
        progress.processed,
        progress.total,
        progress.file,
        progress.fraction() * 100.0
    )
}

fn format_word(word: &WordRecord, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(word)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let mut header = word.name.clone();
    if let Some(phonetic) = &word.phonetic {
        header.push_str(&format!(" [{}]", phonetic));
    }
    if let Some(origin) = &word.origin {
        header.push_str(&format!(" ({})", origin));
    }
    let mut lines = vec![header];
    for (index, meaning) in word.meanings.iter().enumerate() {
        let label = match &meaning.part_of_speech {
            Some(pos) => format!("  {}. ({}) {}", index + 1, pos, meaning.meaning),
            None => format!("  {}. {}", index + 1, meaning.meaning),
        };
        lines.push(label);
        for example in &meaning.examples {
            match &example.author {
                Some(author) => lines.push(format!("     \"{}\" - {}", example.sentence, author)),
                None => lines.push(format!("     \"{}\"", example.sentence)),
            }
        }
    }
    if !word.related_words.is_empty() {
        lines.push(format!("  Related: {}", word.related_words.join(", ")));
    }
    Ok(lines.join("\n"))
}

fn format_suggestions(names: &[String], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(names)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(names.join("\n"))
}

fn format_lookup(resolved: &ResolvedValue, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(resolved)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    let word: WordRecord = serde_json::from_value(resolved.data.clone())
        .map_err(|err| format!("unexpected word payload: {}", err))?;
    let mut output = format_word(&word, false)?;
    if resolved.origin == ValueOrigin::Cache {
        output.push_str(&format!(
            "\n(offline copy from {})",
            resolved.fetched_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    Ok(output)
}

async fn fetch_word(
    client: &reqwest::Client,
    url: reqwest::Url,
    api_key: Option<&str>,
) -> Result<Value, AppError> {
    let mut request = client.get(url);
    if let Some(key) = api_key {
        request = request.header(sozluk_core::constants::API_KEY_HEADER, key);
    }
    let res = request.send().await?;
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }
    let body = res.text().await.unwrap_or_default();
    let message = error_message_for_response(status, &body);
    Err(match status {
        reqwest::StatusCode::NOT_FOUND => AppError::NotFound,
        reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        _ if status.is_server_error() => AppError::Fetch(format!("{}: {}", status, message)),
        _ => AppError::BadRequest(message),
    })
}

fn open_database(config: &Config) -> Arc<Database> {
    match Database::new(&config.db_path) {
        Ok(db) => Arc::new(db),
        Err(err) => exit_with("Opening local store", err),
    }
}

fn sync_manager(config: &Config, db: Arc<Database>, timeout: u64) -> SyncManager {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
    {
        Ok(client) => client,
        Err(err) => exit_with("Building HTTP client", err),
    };
    let source = HttpSource::with_client(client, &config.data_base_url, &config.data_folder);
    SyncManager::new(db, Arc::new(source))
}

fn print_or_exit(action: &str, output: Result<String, String>) {
    match output {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output),
        Err(message) => exit_with(action, message),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        db_path,
        base_url,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sozluk=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = resolve_config(db_path, base_url);
    tracing::debug!("Using local store at {}", config.db_path);
    let started = Instant::now();

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before store setup"),
        Commands::Status => {
            let manager = sync_manager(&config, open_database(&config), timeout);
            let status = match manager.check_status().await {
                Ok(status) => status,
                Err(err) => exit_with("Status", err),
            };
            log_timing(timing, "status", started.elapsed());
            print_or_exit("Status", format_status(&status, json));
        }
        Commands::Download | Commands::Update => {
            let manager = sync_manager(&config, open_database(&config), timeout);
            let result = manager
                .update_with_progress(|progress| {
                    if !json {
                        eprintln!("{}", format_progress(&progress));
                    }
                })
                .await;
            let status = match result {
                Ok(status) => status,
                Err(err) => exit_with("Sync", err),
            };
            log_timing(timing, "sync", started.elapsed());
            print_or_exit("Sync", format_status(&status, json));
        }
        Commands::Delete => {
            let manager = sync_manager(&config, open_database(&config), timeout);
            let status = match manager.delete().await {
                Ok(status) => status,
                Err(err) => exit_with("Delete", err),
            };
            log_timing(timing, "delete", started.elapsed());
            print_or_exit("Delete", format_status(&status, json));
        }
        Commands::Search {
            query,
            limit,
            prefix_only,
        } => {
            let db = open_database(&config);
            let options = AutocompleteOptions {
                limit: limit.unwrap_or(config.autocomplete_limit),
                substring_fallback: !prefix_only,
            };
            let names = match autocomplete(&db, &query, options) {
                Ok(names) => names,
                Err(err) => exit_with("Search", err),
            };
            log_timing(timing, "search", started.elapsed());
            print_or_exit("Search", format_suggestions(&names, json));
        }
        Commands::Show { word } => {
            let db = open_database(&config);
            let record = match db.dictionary.get(&word) {
                Ok(Some(record)) => record,
                Ok(None) => exit_with("Show", format!("'{}' is not in the local dictionary", word)),
                Err(err) => exit_with("Show", err),
            };
            log_timing(timing, "show", started.elapsed());
            print_or_exit("Show", format_word(&record, json));
        }
        Commands::Lookup {
            word,
            server,
            api_key,
        } => {
            let server = normalize_server(
                explicit_override(server).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            );
            let url = match api_url(&server, &["api", "v1", "word", word.as_str()]) {
                Ok(url) => url,
                Err(message) => exit_with("Lookup", message),
            };
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout))
                .build()?;
            let db = open_database(&config);
            let api_key = explicit_override(api_key);
            let ttl = chrono::Duration::from_std(Duration::from_secs(config.cache_ttl_secs))
                .unwrap_or_else(|_| chrono::Duration::days(365));
            let resolved = network_or_cached(db, &lookup_cache_key(&word), ttl, || {
                fetch_word(&client, url, api_key.as_deref())
            })
            .await;
            let resolved = match resolved {
                Ok(resolved) => resolved,
                Err(err) => exit_with("Lookup", err),
            };
            log_timing(timing, "lookup", started.elapsed());
            print_or_exit("Lookup", format_lookup(&resolved, json));
        }
        Commands::Route {
            path,
            asset,
            offline,
        } => {
            let request = if asset {
                Request::asset(path)
            } else {
                Request::navigation(path)
            };
            let decision = decide(&request, !offline);
            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                println!("{:?}", decision);
            }
        }
    }

    Ok(())
}
