use playlens::{config, error, info, server};

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    info!(
        "Starting playlens dashboard server on {}",
        config::server_addr()
    );
    server::start_dashboard_server().await;
}
