/// AI DJ Server - playlist request API and queue worker
use clap::{Parser, Subcommand};
use dj_core::{PlaylistId, PlaylistStore};
use dj_pipeline::SubmitPlaylist;
use dj_server::{
    api,
    config::ServiceConfig,
    jobs::{PlaylistWorker, WorkerOptions},
    services::Backends,
};
use dj_storage::job_queue;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dj-server")]
#[command(about = "AI DJ playlist generation service", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "DJ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API with embedded queue workers
    Serve,
    /// Start only the HTTP API
    Api,
    /// Start only the queue workers
    Worker,
    /// Run one request through the pipeline offline and print the playlist
    Demo {
        /// Prompt to generate from
        #[arg(long, default_value = "generate me a playlist of 20 songs like 'Blinding Lights'")]
        prompt: String,
        /// Requesting user
        #[arg(long, default_value = "demo-user")]
        user_id: String,
        /// Number of songs
        #[arg(long)]
        count: Option<i64>,
    },
    /// Inspect or recover dead-lettered messages
    DeadLetters {
        #[command(subcommand)]
        action: DeadLetterAction,
    },
}

#[derive(Subcommand)]
enum DeadLetterAction {
    /// List dead-lettered messages
    List,
    /// Move dead letters back onto the queue
    Redrive,
    /// Delete all dead letters
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dj_server=info,dj_pipeline=info,dj_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let load_config = || ServiceConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Serve => run(&load_config()?, true, true).await?,
        Commands::Api => run(&load_config()?, true, false).await?,
        Commands::Worker => run(&load_config()?, false, true).await?,
        Commands::Demo {
            prompt,
            user_id,
            count,
        } => demo(prompt, user_id, count).await?,
        Commands::DeadLetters { action } => dead_letters(&load_config()?, action).await?,
    }

    Ok(())
}

async fn run(config: &ServiceConfig, with_api: bool, with_workers: bool) -> anyhow::Result<()> {
    tracing::info!("Starting AI DJ server");
    tracing::info!("Region: {}", config.server.region);

    let backends = Backends::open(config).await?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    let mut workers = Vec::new();
    if with_workers {
        match start_workers(config, &backends, cancel.clone()).await {
            Ok(handles) => workers = handles,
            // Standalone workers cannot run without their backends
            Err(e) if !with_api => return Err(e),
            Err(e) => tracing::warn!(error = %e, "Queue workers not started"),
        }
    }

    if with_api {
        let app = api::router(
            backends.app_state(config),
            &config.server.allowed_origins,
        );

        let addr = SocketAddr::from((
            config.server.host.parse::<std::net::IpAddr>()?,
            config.server.port,
        ));

        tracing::info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let shutdown = cancel.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;
        cancel.cancel();
    }

    for handle in workers {
        handle.await?;
    }

    Ok(())
}

async fn start_workers(
    config: &ServiceConfig,
    backends: &Backends,
    cancel: CancellationToken,
) -> anyhow::Result<Vec<tokio::task::JoinHandle<()>>> {
    let queue = backends.require_queue()?.clone();
    let processor = backends.processor(config).await?;

    let worker = Arc::new(PlaylistWorker::new(
        queue,
        Arc::new(processor),
        WorkerOptions::from_config(config),
    ));

    tracing::info!(
        "Playlist queue started with {} workers",
        config.worker.workers
    );

    Ok(worker.start(config.worker.workers, cancel))
}

async fn demo(prompt: String, user_id: String, count: Option<i64>) -> anyhow::Result<()> {
    let db_path = std::env::temp_dir().join(format!("dj-demo-{}.db", uuid::Uuid::new_v4()));
    let db_url = format!("sqlite://{}", db_path.display());

    let mut config = ServiceConfig::default();
    config.queue.url = Some(db_url.clone());
    config.storage.table_url = Some(db_url);
    config.recommend.offline = true;

    let result = demo_round_trip(&config, prompt, user_id, count).await;

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", db_path.display(), suffix));
    }

    let record = result?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn demo_round_trip(
    config: &ServiceConfig,
    prompt: String,
    user_id: String,
    count: Option<i64>,
) -> anyhow::Result<dj_core::PlaylistRecord> {
    let backends = Backends::open(config).await?;

    let accepted = backends
        .intake(config)
        .submit(SubmitPlaylist {
            prompt: Some(prompt),
            user_id: Some(user_id),
            count,
            idempotency_key: None,
        })
        .await?;
    tracing::info!(playlist_id = %accepted.playlist_id, "Request queued");

    let worker = PlaylistWorker::new(
        backends.require_queue()?.clone(),
        Arc::new(backends.processor(config).await?),
        WorkerOptions::from_config(config),
    );
    let report = worker.poll_once().await?;
    tracing::info!(?report, "Queue drained");

    fetch(&backends, &accepted.playlist_id).await
}

async fn fetch(backends: &Backends, id: &PlaylistId) -> anyhow::Result<dj_core::PlaylistRecord> {
    let store = backends
        .store
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("playlist table not configured"))?;

    store
        .get(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("playlist {} was not written", id))
}

async fn dead_letters(config: &ServiceConfig, action: DeadLetterAction) -> anyhow::Result<()> {
    let backends = Backends::open(config).await?;
    let pool = backends.require_queue()?.pool();

    match action {
        DeadLetterAction::List => {
            let letters = job_queue::dead_letters(pool).await?;
            let stats = job_queue::stats(pool).await?;

            println!(
                "Queue: {} visible, {} in flight, {} awaiting retry, {} dead-lettered",
                stats.visible, stats.in_flight, stats.delayed, stats.dead_lettered
            );
            for letter in letters {
                println!(
                    "  #{} (received {} times): {}",
                    letter.id,
                    letter.receive_count,
                    letter.last_error.as_deref().unwrap_or("no error recorded")
                );
                println!("    {}", letter.body);
            }
        }
        DeadLetterAction::Redrive => {
            let moved = job_queue::redrive_dead_letters(pool).await?;
            println!("Redrove {} messages", moved);
        }
        DeadLetterAction::Purge => {
            let purged = job_queue::purge_dead_letters(pool).await?;
            println!("Purged {} messages", purged);
        }
    }

    Ok(())
}
