// File: gameplug-server/src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::{Handle, Server};
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use gameplug_core::Database;

mod auth;
mod context;
mod error;
mod handlers;
mod routes;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "gameplug-server")]
#[command(author, version, about = "Game Plug loyalty service - points ledger, quests, rewards and loot packs")]
struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    server_addr: String,

    /// Postgres connection URL.
    #[arg(long, default_value = "postgres://gameplug@localhost:5432/gameplug")]
    db_path: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("gameplug=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let db = Database::new(&args.db_path).await?;
    db.migrate().await?;

    let ctx = Arc::new(ServerContext::new(&db));
    let app = routes::router(ctx);

    let addr: SocketAddr = args.server_addr.parse()?;
    info!("Loyalty server listening on http://{}", addr);

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received.");
            shutdown_handle.graceful_shutdown(None);
        }
    });

    Server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server shut down.");
    Ok(())
}
