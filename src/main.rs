use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contagio::{Config, Engine, EventHook};
use rmp_serde::encode;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the simulation config file.
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the config, then exit.
    Check,

    /// Run the simulation headless for a number of days.
    Run {
        #[arg(long)]
        days: usize,

        /// Write the per-day counter snapshots to this MessagePack file.
        #[arg(long)]
        trajectory: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to load config")?;
    log::info!("{cfg:#?}");

    match args.command {
        Command::Check => {}
        Command::Run { days, trajectory } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to build runtime")?;
            runtime.block_on(run_simulation(cfg, days, trajectory))?;
        }
    }

    Ok(())
}

async fn run_simulation(cfg: Config, days: usize, trajectory: Option<PathBuf>) -> Result<()> {
    let events: EventHook = Arc::new(|event| log::info!("{event}"));

    let mut engine = Engine::new(cfg.clone(), events).context("failed to construct engine")?;
    engine.start().context("failed to start simulation")?;

    let mut writer = match trajectory {
        Some(file) => {
            let file =
                File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    // One snapshot per day tick, taken before the day clock advances.
    let day = Duration::from_secs_f64(cfg.seconds_per_day);
    for _ in 0..days {
        tokio::time::sleep(day).await;

        let snapshot = engine.counters().snapshot();
        log::info!(
            "day {}: vulnerable {} sick {} immune {} dead {}",
            snapshot.day,
            snapshot.vulnerable,
            snapshot.sick,
            snapshot.immune,
            snapshot.dead,
        );
        if let Some(writer) = writer.as_mut() {
            encode::write(writer, &snapshot).context("failed to serialize snapshot")?;
        }

        engine.advance_day();
    }

    engine.stop();

    if let Some(mut writer) = writer {
        writer.flush().context("failed to flush writer stream")?;
    }

    Ok(())
}
