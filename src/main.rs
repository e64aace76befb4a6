use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use econsult::api::{self, AppState};
use econsult::store::ImportDocument;
use econsult::{Analyzer, Config, Store};

#[derive(Debug, Parser)]
#[command(name = "econsult", version, about = "Sentiment analysis for consultation comments")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Analyze one draft and print the report as JSON
    Analyze { draft_id: i64 },
    /// Load drafts, sections and comments from a JSON file
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = Config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("econsult=info,tower_http=info")),
        )
        .init();

    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let config = cli.config;

    let store = Store::connect(&config.database_url).await?;
    store.init_schema().await?;

    match cli.command {
        Command::Serve => serve(&config, store).await,
        Command::Analyze { draft_id } => {
            let report = build_analyzer(&config, store)?.analyze_draft(draft_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let document: ImportDocument =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;
            let summary = store.import(&document).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

fn build_analyzer(config: &Config, store: Store) -> anyhow::Result<Analyzer> {
    let gateway = config.gemini_client()?;
    if gateway.is_online() {
        info!("Gemini model: {}", config.gemini_model);
    } else {
        warn!("GEMINI_API_KEY not set, using the offline heuristic");
    }

    Ok(Analyzer::new(store, Arc::new(gateway))
        .with_mode(config.classification_mode)
        .with_batch_size(config.batch_size))
}

async fn serve(config: &Config, store: Store) -> anyhow::Result<()> {
    let analyzer = build_analyzer(config, store)?;
    let app = api::router(Arc::new(AppState::new(analyzer)));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
