//! ThreadLens — asynchronous question-log analysis server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod client;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("THREADLENS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "submit" => {
                if args.len() < 4 {
                    eprintln!("Usage: threadlens submit <owner> <file>...");
                    std::process::exit(1);
                }
                let files: Vec<PathBuf> = args[3..].iter().map(PathBuf::from).collect();
                let code = client::run_submit(&args[2], &files).await;
                std::process::exit(code);
            }
            "--help" | "-h" | "help" => {
                println!("ThreadLens — question-log analysis server");
                println!();
                println!("Usage: threadlens [command]");
                println!();
                println!("Commands:");
                println!("  (none)                     Start the server");
                println!("  submit <owner> <file>...   Submit transcripts and wait for the result");
                println!("  help                       Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT, THREADLENS_DATA_DIR, THREADLENS_URL, RUST_LOG");
                println!("  OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'threadlens help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = threadlens_core::ThreadLensConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = threadlens_store::SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    // Jobs still pending here lost their worker with the previous process.
    threadlens_runtime::expire_interrupted(&store)
        .map_err(|e| anyhow::anyhow!("Failed to expire interrupted jobs: {}", e))?;

    let state = Arc::new(AppState::new(config, store));
    info!("Reasoning engine: {}", state.engine.name());

    let rx = state
        .take_analysis_rx()
        .ok_or_else(|| anyhow::anyhow!("Analysis queue already taken"))?;
    threadlens_runtime::start_analysis_worker(state.worker(), rx);
    threadlens_runtime::start_reaper(state.store.clone(), &state.config.limits);

    let app = routes::build_router(state.clone());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ThreadLens server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
