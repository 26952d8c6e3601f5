use clap::Parser;
use restmock::cli::Cli;
use restmock::config::Settings;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restmock=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration (file, env vars, CLI overrides)
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!(
        "Starting restmock with {} endpoint declarations ({:?} storage)",
        settings.endpoints.len(),
        settings.storage.backend
    );

    // Registry, seeding and route binding all finish before the listener opens
    let app = restmock::bootstrap(&settings).await?;
    let router = restmock::create_app(app);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
