use anyhow::Context;
use clap::{Parser, Subcommand};
use exlog::write_event;
use exlog_core::{config::Config, CategoryEngine};
use exlog_feeds::{replay, IngestionPipeline, WatchAck};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "exlog", about = "exlog — live categorisation of game client logs")]
struct Cli {
    /// Config file (defaults to ~/.config/exlog/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level on stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow a log file and print events as JSON lines until Ctrl-C.
    Watch {
        file: PathBuf,
        /// Override `watch.poll_interval_ms`.
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Print every event in a log file once and exit.
    Classify { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries events; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.debug { "debug" } else { "warn" })
            }),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let engine =
        Arc::new(CategoryEngine::from_config(&config.classifier).context("compiling rules")?);

    match cli.command {
        Command::Classify { file } => {
            let events = replay(&file, &engine, &config.watch)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut out = std::io::stdout().lock();
            for event in &events {
                write_event(&mut out, event)?;
            }
            Ok(())
        }
        Command::Watch {
            file,
            poll_interval_ms,
        } => {
            if let Some(ms) = poll_interval_ms {
                config.watch.poll_interval_ms = ms;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(engine, config, file))
        }
    }
}

async fn watch(engine: Arc<CategoryEngine>, config: Config, file: PathBuf) -> anyhow::Result<()> {
    let mut pipeline = IngestionPipeline::new(engine, config.watch)?;
    let mut events = pipeline.subscribe();

    pipeline
        .start(&file)
        .await
        .with_context(|| format!("watching {}", file.display()))?;

    let mut out = std::io::stdout();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(event) => write_event(&mut out, &event)?,
                None => break,
            },
        }
    }

    if let WatchAck::Stopped {
        session: Some((path, stats)),
    } = pipeline.stop().await?
    {
        tracing::info!(
            path = %path.display(),
            lines = stats.lines_read,
            events = stats.events_emitted,
            "stopped"
        );
    }
    Ok(())
}
