use anyhow::{Context, Result};
use cardsim::{
    ResolverConfig, ServerConfig, SimilarRequest, WEAVIATE_URL_ENV, WeaviateConfig, connect,
    format_results,
};
use clap::{Parser, Subcommand};

/// Find Magic: The Gathering cards similar to the ones you name.
#[derive(Parser, Debug)]
#[command(name = "cardsim", version, about = "Card similarity over a Weaviate vector store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the cards nearest to one or more named cards.
    Similar {
        /// Card names; several names are averaged into one query.
        #[arg(required = true)]
        names: Vec<String>,
        /// Number of results (non-positive uses the default).
        #[arg(short, default_value_t = cardsim::DEFAULT_K as i64, allow_negative_numbers = true)]
        k: i64,
        /// Weaviate base URL.
        #[arg(long, env = WEAVIATE_URL_ENV)]
        url: Option<String>,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP server with the loaded configuration.
    Serve {},
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Similar { names, k, url, json } => similar(names, k, url, json).await,
        Commands::Serve {} => {
            let config = ServerConfig::load()?;
            cardsim::start_server(config).await
        }
    }
}

async fn similar(names: Vec<String>, k: i64, url: Option<String>, json: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store_cfg = match url {
        Some(url) => WeaviateConfig::default().with_url(url),
        None => WeaviateConfig::default(),
    };
    let resolver = connect(&store_cfg, ResolverConfig::default())?;

    let request = SimilarRequest::new(names, k);
    let results = resolver
        .find_similar(&request)
        .await
        .with_context(|| format!("similarity query against {} failed", store_cfg.base_url()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_results(&results));
    }
    Ok(())
}
