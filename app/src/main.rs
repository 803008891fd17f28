#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

mod command;

use command::{
    CommandStrategy, InfoStrategy, InitStrategy, ListStrategy, ProcessInput, ProcessStrategy,
    ShowStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Classify business documents and extract structured data", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/docflow/config.json
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify, extract and store one or more documents
    Process {
        /// Documents to process, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Conversation id to store under (a new one by default)
        #[arg(short = 's', long)]
        session: Option<Uuid>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Skip the model and use pattern extraction only
        #[arg(long)]
        offline: bool,
    },
    /// Show the record stored for a conversation
    Show {
        #[arg(short = 's', long)]
        session: Uuid,
    },
    /// List stored document keys
    List,
    /// Initialize configuration
    Init,
    /// Show configuration and store status
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Process {
            files,
            session,
            model,
            offline,
        } => {
            ProcessStrategy
                .execute(ProcessInput {
                    config_path,
                    files,
                    session,
                    model,
                    offline,
                })
                .await
        }
        Commands::Show { session } => ShowStrategy.execute((config_path, session)).await,
        Commands::List => ListStrategy.execute(config_path).await,
        Commands::Init => InitStrategy.execute(config_path).await,
        Commands::Info => InfoStrategy.execute(config_path).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
