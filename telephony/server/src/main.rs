use anyhow::Result;
use dotenvy::dotenv;
use std::{env, net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voice_server::config::ServerConfig;
use voice_server::{app, build_engine, spawn_sweeper, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "voice_server=info,dialogue_core=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let engine = Arc::new(build_engine(&config)?);
    let sweeper = spawn_sweeper(&engine, &config);

    let state = AppState { engine, speech: config.speech.clone() };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);
    info!(
        operator = %config.policy.operator_number,
        idle_secs = config.session_idle.num_seconds(),
        voice = %config.speech.voice,
        language = %config.speech.language,
        "voice webhook ready at POST /voice"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    let _ = sweeper.send(true);
    Ok(())
}
