use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faqseek_common::{logger, AppConfig};
use faqseek_vector::SearchEngine;
use std::path::PathBuf;
use std::sync::Arc;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "faqseek")]
#[command(about = "FaqSeek - semantic search over a FAQ corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// FAQ corpus JSON file
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Build the index on the first request instead of at startup
        #[arg(long)]
        no_warm_up: bool,
    },

    /// Run a single search and print the results as JSON
    Query {
        /// Question to search for
        text: String,

        /// FAQ corpus JSON file
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            corpus,
            no_warm_up,
        }) => {
            // CLI arguments override the environment
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(corpus) = corpus {
                config.corpus_path = corpus;
            }

            serve(config, !no_warm_up).await?;
        }
        Some(Commands::Query { text, corpus }) => {
            if let Some(corpus) = corpus {
                config.corpus_path = corpus;
            }
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            let engine = SearchEngine::from_config(&config);
            let results = engine.search(&text).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        None => {
            serve(config, true).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig, warm_up: bool) -> Result<()> {
    config.validate()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("FaqSeek starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Corpus: {}", config.corpus_path.display());
    tracing::info!(
        "  Embeddings: {} ({})",
        config.embedding_model,
        config.embedding_backend
    );
    tracing::info!("  Metric: {}", config.distance_metric);

    let engine = Arc::new(SearchEngine::from_config(&config));

    // Corpus, model and index problems are fatal; surface them before
    // accepting traffic
    if warm_up {
        let stats = engine
            .warm_up()
            .await
            .context("Failed to initialize the search engine")?;
        tracing::info!(
            "Index ready: {} entries, dimension {}",
            stats.entries,
            stats.dimension
        );
    }

    println!("Server listening on http://{}", config.server_bind_address());

    faqseek_server::start_server(config, engine).await?;

    Ok(())
}
