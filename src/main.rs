use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tarkov_news::{
    config::NewsConfig,
    http::{routes::NEWS_PATH, AppState, Deployment, HttpServer},
};

#[derive(Parser)]
#[command(name = "tarkov-news")]
#[command(about = "Cached, normalized Tarkov news feed API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(short, long, default_value = "8787")]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long)]
    debug: bool,

    /// Standalone routes every path itself; route expects only the news path
    #[arg(long, value_enum, default_value_t = Deployment::Standalone)]
    variant: Deployment,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tarkov_news={filter_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = NewsConfig::from_env().context("failed to load configuration")?;
    info!(
        "upstream: {} (cache max-age {}s, headers {:?})",
        config.upstream_url, config.cache_max_age, config.header_profile
    );

    let state = AppState::from_config(config).context("failed to build upstream client")?;
    let server = HttpServer::new(state, args.variant);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("news server started on {} ({:?})", bind_addr, args.variant);
    info!("   curl 'http://{}{}?lang=en&hours=72&limit=12'", bind_addr, NEWS_PATH);

    server
        .serve(listener, shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
