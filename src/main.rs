//! `archmaster` binary: run the API server or generate a single topic.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use archmaster::api::{start_server, AppState};
use archmaster::cache::{SupabaseCache, TopicCache};
use archmaster::config::Config;
use archmaster::logging::{self, LogFormat};
use archmaster::providers::{GeminiProvider, LlmProvider};
use archmaster::TopicService;

#[derive(Parser, Debug)]
#[command(name = "archmaster", version, about = "System design generation API")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Bind address (overrides ARCHMASTER_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Listen port (overrides ARCHMASTER_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch or generate one topic and print it as JSON
    Generate {
        /// Topic identifier, e.g. `url-shortener`
        topic_id: String,
        /// Skip the cache and regenerate
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let mut config = Config::from_env().context("failed to load configuration")?;
    let service = Arc::new(build_service(&config)?);

    match cli.command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start_server(&config.server, AppState::new(service))
                .await
                .map_err(|e| anyhow::anyhow!("API server failed: {e}"))?;
        }
        Command::Generate { topic_id, refresh } => {
            let document = service
                .get_topic(&topic_id, refresh)
                .await
                .with_context(|| format!("failed to get topic {topic_id}"))?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}

fn build_service(config: &Config) -> Result<TopicService> {
    let cache: Arc<dyn TopicCache> = Arc::new(SupabaseCache::new(&config.supabase)?);
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_config(&config.gemini)?);
    info!(
        cache = cache.name(),
        provider = provider.name(),
        model = provider.model(),
        "Topic service ready"
    );
    Ok(TopicService::new(cache, provider))
}
