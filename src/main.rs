use clap::{Parser, Subcommand};
use streamwatch::{
    cmd::{ReplayArgs, replay},
    config::AppConfig,
    console::Console,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the live alert console.
    Run {
        /// Directory holding `app.yaml`.
        #[arg(short, long)]
        config_dir: Option<String>,
    },
    /// Replays recorded feed messages and prints the resulting notifications.
    Replay(ReplayArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_dir } => run_console(config_dir.as_deref()).await?,
        Commands::Replay(args) => replay::execute(args).await?,
    }

    Ok(())
}

async fn run_console(config_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(config_dir)?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        aggregate_feed = %config.aggregate_feed,
        "Configuration loaded."
    );

    let console = Console::builder().config(config).build().await?;
    tracing::info!("Console initialized, starting alert engine...");

    console.run().await?;

    Ok(())
}
