/// Duet Player - dual-channel crossfade player for the terminal
use clap::Parser;
use duet_player::{
    commands::{ConsoleCommand, HELP},
    config::PlayerConfig,
    session::{log_event, Flow, Session},
};
use duet_playback::TrackSelector;
use duet_runtime::spawn_simulated;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duet-player")]
#[command(about = "Crossfading playlist player on a simulated media backend", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./duet.toml when present)
    #[arg(short, long, env = "DUET_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for shuffle, for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "duet_player=info,duet_playback=info,duet_runtime=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let catalog = config.catalog()?;
    let selector = match cli.seed {
        Some(seed) => TrackSelector::with_seed(seed),
        None => TrackSelector::new(),
    };

    tracing::info!(
        tracks = catalog.len(),
        crossfade_ms = config.playback.crossfade_ms,
        "Starting Duet Player"
    );

    let (player, task) = spawn_simulated(
        catalog.clone(),
        config.library(),
        &config.playback,
        &config.runtime,
        selector,
    );

    // Report discrete events as they happen
    let mut events = player.subscribe();
    let event_catalog = catalog.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event, &event_catalog),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let session = Session::new(player.clone(), catalog);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match session.execute(command).await {
            Ok((Flow::Quit, reply)) => {
                println!("{reply}");
                break;
            }
            Ok((Flow::Continue, reply)) => println!("{reply}"),
            Err(e) => println!("{e}"),
        }
    }

    player.shutdown().await.ok();
    task.await?;
    tracing::info!("Duet Player stopped");

    Ok(())
}
