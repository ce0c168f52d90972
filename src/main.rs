use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use wakey::{
    evaluate, ConsoleNotifier, MachinesApi, MachinesClient, Notifier, SessionRegistry,
    ShutdownCoordinator, WakeOrchestrator, WakeOutcome, WakeRequest, WakeyConfig,
};

const ACK: &str = "✨ *squeak squeak* Time to wake that sleepy machine! \
     This can take a moment, but I am on it... 🐭";

#[derive(Parser)]
#[command(name = "wakey")]
#[command(about = "Wakes a sleeping machine on command and reports back when it is ready")]
#[command(long_about = "Wakey starts a suspended machine through its control plane, \
                       then polls its lifecycle state and health checks until the machine \
                       is confirmed ready, posting progress along the way.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the target machine and poll until it is ready
    Wake {
        /// Requester handle to address in the success report
        #[arg(long, help = "Mention this requester when the machine comes up")]
        mention: Option<String>,
    },
    /// Query the target machine once and print its readiness verdict
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    WakeyConfig::load_env_file()?;
    let config = WakeyConfig::load()?;
    config.validate()?;
    wakey::init_telemetry(&config.observability.log_level)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Wake { mention } => wake_command(&config, mention).await,
        Commands::Status => status_command(&config).await,
    }
}

fn build_client(config: &WakeyConfig) -> Result<MachinesClient> {
    let client = MachinesClient::new(
        config.fly.api_base.clone(),
        config.fly.api_token.clone().unwrap_or_default(),
        config.fly.app_name.clone(),
        config.fly.machine_id.clone(),
    )?;
    Ok(client)
}

async fn wake_command(config: &WakeyConfig, mention: Option<String>) -> Result<()> {
    let client = Arc::new(build_client(config)?);
    let notifier = Arc::new(ConsoleNotifier::new());
    let registry = SessionRegistry::new();
    let orchestrator = WakeOrchestrator::new(
        client,
        notifier.clone(),
        registry,
        config.fly.machine_id.clone(),
        config.poll_settings(),
    );

    // Acknowledging the trigger is the front end's job; the session only
    // rewrites this message afterwards.
    notifier.update(ACK).await?;

    let shutdown = ShutdownCoordinator::new();
    shutdown.spawn_signal_listener();

    let session = orchestrator.spawn(WakeRequest { requester: mention }, shutdown.token());
    match session.await? {
        WakeOutcome::Succeeded { polls } => {
            info!(polls, "wake session succeeded");
            Ok(())
        }
        WakeOutcome::Failed(err) => Err(anyhow::Error::new(err).context("wake failed")),
        WakeOutcome::Abandoned => {
            warn!("wake session abandoned before the machine was ready");
            Ok(())
        }
        WakeOutcome::Rejected => Ok(()),
    }
}

async fn status_command(config: &WakeyConfig) -> Result<()> {
    let client = build_client(config)?;
    let machine = client.describe().await?;
    let verdict = evaluate(&machine);
    println!(
        "machine {} ({}) is {}: {}",
        machine.id, config.fly.app_name, machine.state, verdict
    );
    Ok(())
}
