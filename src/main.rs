use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pano_desk::{api, config::Config, db};

#[derive(Parser)]
#[command(name = "pano-desk")]
#[command(about = "Admin console core for 360° virtual tour hosting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the PanoDesk server
    Serve {
        /// Port for HTTP API (overrides PANO_DESK_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fill the store with demo tours
    Seed,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pano_desk=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting PanoDesk server on port {}", port);

    let db = open_database(config)?;
    let app = api::create_router(db, config.review_policy);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("PanoDesk server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(&config, port.unwrap_or(config.port)).await?;
        }
        Some(Commands::Seed) => {
            let db = open_database(&config)?;
            let tours = db.seed_demo()?;
            for tour in &tours {
                println!(
                    "Seeded {} ({} scenes) for {}",
                    tour.title,
                    tour.scenes.len(),
                    tour.client_name
                );
            }
        }
        None => {
            // Default: start server
            serve(&config, config.port).await?;
        }
    }

    Ok(())
}
