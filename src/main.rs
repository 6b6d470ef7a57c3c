use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use redline::config::ServerConfig;
use redline::server::{AppState, create_router};
use redline::store::{MemoryStore, SqliteStore, Store};

#[derive(Parser)]
#[command(name = "redline")]
#[command(about = "A document-review tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Keep all state in memory instead of on disk (lost on exit)
        #[arg(long)]
        ephemeral: bool,

        /// Create the stock departments when none exist yet
        #[arg(long)]
        seed: bool,
    },
}

const SEED_DEPARTMENTS: &[(&str, &str)] = &[
    ("QA", "QA"),
    ("PROD", "Production"),
    ("PPIC", "PPIC"),
    ("RA", "Regulatory Affairs"),
    ("LOG", "Logistics"),
];

fn seed_departments(store: &dyn Store) -> anyhow::Result<()> {
    if !store.list_departments(None)?.is_empty() {
        return Ok(());
    }

    for (id, name) in SEED_DEPARTMENTS {
        store.upsert_department(id, name, None)?;
    }
    info!("Seeded {} departments", SEED_DEPARTMENTS.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("redline=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            ephemeral,
            seed,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            let store: Arc<dyn Store> = if ephemeral {
                info!("Using in-memory store, state is lost on exit");
                Arc::new(MemoryStore::new())
            } else {
                fs::create_dir_all(&config.data_dir)?;
                Arc::new(SqliteStore::new(config.db_path())?)
            };
            store.initialize()?;

            if seed {
                seed_departments(store.as_ref())?;
            }

            let state = Arc::new(AppState { store });
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
