use clap::Parser;
use scopematch_core::config::{self, ScoringWeights};
use scopematch_core::exclusions::ExclusionList;
use scopematch_core::sdg::SdgCatalog;
use scopematch_server::api::create_router;
use scopematch_server::api::handlers::AppState;
use scopematch_server::corpus::CorpusService;
use scopematch_server::embedding::{DisabledEmbeddings, EmbeddingProvider, OpenAiEmbeddings};
use scopematch_server::recommender::Recommender;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scopematch", about = "Journal and SDG recommendations for research abstracts")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SCOPEMATCH_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Directory holding journals.jsonl, exclusions.json and sdgs.json
    #[arg(short, long, env = "SCOPEMATCH_DATA_DIR", default_value = config::DEFAULT_DATA_DIR)]
    data_dir: String,

    /// Embedding dimension of the corpus vectors
    #[arg(long, env = "SCOPEMATCH_DIMENSION", default_value_t = config::DEFAULT_DIMENSION)]
    dimension: usize,

    /// Maximum number of journals held in memory
    #[arg(long, env = "SCOPEMATCH_MAX_ENTRIES", default_value_t = config::DEFAULT_MAX_ENTRIES)]
    max_entries: usize,

    /// Embedding model name
    #[arg(long, env = "SCOPEMATCH_EMBEDDING_MODEL", default_value = config::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Base URL of the OpenAI-compatible embeddings API
    #[arg(long, env = "SCOPEMATCH_EMBEDDING_BASE_URL", default_value = config::DEFAULT_EMBEDDING_BASE_URL)]
    embedding_base_url: String,

    /// Embedding request timeout in seconds
    #[arg(long, env = "SCOPEMATCH_EMBEDDING_TIMEOUT_SECS", default_value_t = config::DEFAULT_EMBEDDING_TIMEOUT_SECS)]
    embedding_timeout_secs: u64,

    /// Weight of the SDG cosine similarity
    #[arg(long, env = "SCOPEMATCH_SEMANTIC_WEIGHT", default_value_t = config::DEFAULT_SEMANTIC_WEIGHT)]
    semantic_weight: f64,

    /// Bonus per matched SDG keyword
    #[arg(long, env = "SCOPEMATCH_KEYWORD_WEIGHT", default_value_t = config::DEFAULT_KEYWORD_WEIGHT)]
    keyword_weight: f64,

    /// Load the corpus at startup instead of on the first request
    #[arg(long, env = "SCOPEMATCH_PRELOAD", default_value_t = false)]
    preload: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "scopematch_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "scopematch_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    if args.dimension == 0 || args.dimension > config::MAX_DIMENSION {
        eprintln!("Error: dimension must be 1-{}", config::MAX_DIMENSION);
        std::process::exit(1);
    }
    if args.max_entries == 0 {
        eprintln!("Error: max_entries must be > 0");
        std::process::exit(1);
    }
    for (name, w) in [
        ("semantic_weight", args.semantic_weight),
        ("keyword_weight", args.keyword_weight),
    ] {
        if !w.is_finite() || w < 0.0 {
            eprintln!("Error: {} must be a finite, non-negative number", name);
            std::process::exit(1);
        }
    }
    let data_path = PathBuf::from(&args.data_dir);
    if data_path.exists() && !data_path.is_dir() {
        eprintln!(
            "Error: data_dir '{}' exists but is not a directory",
            args.data_dir
        );
        std::process::exit(1);
    }

    let embeddings: Arc<dyn EmbeddingProvider> = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let provider = OpenAiEmbeddings::new(
                &args.embedding_base_url,
                &args.embedding_model,
                key.trim(),
                Duration::from_secs(args.embedding_timeout_secs),
            )?;
            tracing::info!(model = %args.embedding_model, "Semantic scoring enabled");
            Arc::new(provider)
        }
        _ => {
            tracing::info!("No OPENAI_API_KEY set, journals will be ranked by token overlap only");
            Arc::new(DisabledEmbeddings)
        }
    };

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let corpus = Arc::new(CorpusService::new(
        data_path.clone(),
        args.dimension,
        args.max_entries,
    ));
    let catalog = Arc::new(SdgCatalog::load(&data_path));
    let exclusions = Arc::new(ExclusionList::in_dir(&data_path));
    let weights = ScoringWeights {
        semantic: args.semantic_weight,
        keyword: args.keyword_weight,
    };

    let recommender = Arc::new(Recommender::new(
        corpus.clone(),
        exclusions,
        catalog.clone(),
        embeddings,
        weights,
        Duration::from_secs(args.embedding_timeout_secs),
    ));

    if args.preload {
        if let Err(e) = corpus.ensure_loaded().await {
            tracing::warn!("Corpus preload failed, will retry on first request: {}", e);
        }
    }

    let state = AppState {
        recommender,
        prometheus_handle,
        start_time: Instant::now(),
    };
    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        data_dir = %args.data_dir,
        dimension = args.dimension,
        max_entries = args.max_entries,
        sdgs = catalog.len(),
        semantic_weight = weights.semantic,
        keyword_weight = weights.keyword,
        preload = args.preload,
        "scopematch ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
