use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, prelude::*};

use medibot::app::App;
use medibot::config::Config;
use medibot::session::ChatSession;
use medibot::ui::ChatUi;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Directory holding the persisted index (overrides config)
    #[arg(long)]
    persist_dir: Option<String>,

    /// Collection to answer from (overrides config)
    #[arg(long)]
    collection: Option<String>,
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = cli.persist_dir {
        config.persist_directory = dir;
    }
    if let Some(name) = cli.collection {
        config.collection_name = name;
    }
    config.validate().context("invalid configuration")?;

    let app = App::with_gemini(config)?;

    // Open the index up front so a missing store stops startup
    app.index().context("failed to open vector index")?;
    info!("Chat model: {}", app.config().chat.model);

    let stdin = io::stdin();
    let mut ui = ChatUi::new(ChatSession::new(&app), stdin.lock(), io::stdout());
    ui.run().context("terminal I/O failed")?;

    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "medibot=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
