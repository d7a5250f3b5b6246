mod config;
mod forwarder;
mod relay_server;

use log::{error, info};

use crate::config::RelayConfig;
use crate::relay_server::RelayServer;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // usage: server [udp_addr] [tcp_addr]
    let config = match RelayConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid address argument: {}", e);
            std::process::exit(2);
        }
    };
    info!("Starting relay with {:?}", config);

    let server = RelayServer::new(config);
    if let Err(e) = server.run().await {
        error!("Relay stopped: {}", e);
        std::process::exit(1);
    }
}
