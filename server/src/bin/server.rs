//! Headless archive server.

use vod_archive_lib::app::SharedState;
use vod_archive_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vod_archive_lib::init_tracing();
    tracing::info!("Starting VOD archive server v{}", vod_archive_lib::get_version());

    let (db, config) = vod_archive_lib::init_foundation()?;
    let state = SharedState::new(db, config);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    server_handle.abort();
    Ok(())
}
