use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ovh_sniper::api::fetch_catalog;
use ovh_sniper::config::SavedConfig;
use ovh_sniper::controller::RunOutcome;
use ovh_sniper::lifecycle::{setup_tracing, SniperSystem};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Buy an OVH dedicated server the moment one comes into stock.
#[derive(Parser)]
#[command(name = "ovh-sniper", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one purchase task from a saved configuration bundle
    Run {
        /// Path to the JSON bundle (ovhConfig, taskConfig, telegramConfig)
        #[arg(long)]
        config: PathBuf,
        /// Attach the task's add-on options to the cart item before checkout
        #[arg(long)]
        attach_options: bool,
    },

    /// List dedicated-server plans from the public catalog
    Catalog {
        /// Take endpoint and zone from this bundle
        #[arg(long)]
        config: Option<PathBuf>,
        /// API host, e.g. eu.api.ovh.com
        #[arg(long)]
        endpoint: Option<String>,
        /// OVH subsidiary, e.g. IE
        #[arg(long)]
        zone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    setup_tracing();

    match Cli::parse().command {
        Commands::Run {
            config,
            attach_options,
        } => run(config, attach_options).await,
        Commands::Catalog {
            config,
            endpoint,
            zone,
        } => catalog(config, endpoint, zone).await,
    }
}

async fn run(path: PathBuf, attach_options: bool) -> anyhow::Result<ExitCode> {
    let mut config = SavedConfig::load(&path)?;
    if attach_options {
        config.pipeline.attach_options = true;
    }

    let system = SniperSystem::with_defaults().context("failed to set up notifier")?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", event);
        }
    });

    let controller = system.controller.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping task");
            if let Err(e) = controller.stop().await {
                warn!(error = %e, "stop request failed");
            }
        }
    });

    let report = system
        .controller
        .start(config.into_request().with_events(events_tx))
        .await?;
    let _ = printer.await;
    // The interrupt watcher holds a controller handle; the actor only exits once it is gone.
    interrupt.abort();

    info!(run_id = report.run_id, outcome = ?report.outcome, "Task finished");
    system
        .shutdown()
        .await
        .map_err(anyhow::Error::msg)?;

    Ok(match report.outcome {
        RunOutcome::Completed(_) | RunOutcome::Cancelled => ExitCode::SUCCESS,
        RunOutcome::NotFound => ExitCode::from(2),
        RunOutcome::Failed(_) => ExitCode::FAILURE,
    })
}

async fn catalog(
    path: Option<PathBuf>,
    endpoint: Option<String>,
    zone: Option<String>,
) -> anyhow::Result<ExitCode> {
    let saved = path.map(SavedConfig::load).transpose()?;
    let endpoint = endpoint.or_else(|| saved.as_ref().map(|c| c.ovh_config.endpoint.clone()));
    let zone = zone.or_else(|| saved.as_ref().map(|c| c.task_config.zone.clone()));

    let (endpoint, zone) = match (endpoint, zone) {
        (Some(endpoint), Some(zone)) => (endpoint, zone),
        _ => bail!("catalog needs --config or both --endpoint and --zone"),
    };

    let plans = fetch_catalog(&endpoint, &zone)
        .await
        .with_context(|| format!("failed to fetch catalog from {}", endpoint))?;
    for plan in &plans {
        println!("{:<24} {}", plan.plan_code, plan.invoice_name);
    }
    info!(count = plans.len(), %zone, "Catalog listed");
    Ok(ExitCode::SUCCESS)
}
