mod load_client;
mod pattern;

use std::net::SocketAddr;

use log::{error, info};

use crate::load_client::LoadClient;

const DATA_SIZE: usize = 10 * 1024 * 1024; // 10 MB
const DATAGRAM_SIZE: usize = 1024;

const DEFAULT_UDP_TARGET: &str = "127.0.0.1:8071";
const DEFAULT_TCP_TARGET: &str = "127.0.0.1:8072";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // usage: client [udp_target] [tcp_target]
    let mut args = std::env::args().skip(1);
    let udp_target = args.next().unwrap_or_else(|| DEFAULT_UDP_TARGET.to_string());
    let tcp_target = args.next().unwrap_or_else(|| DEFAULT_TCP_TARGET.to_string());
    let (udp_target, tcp_target) = match (
        udp_target.parse::<SocketAddr>(),
        tcp_target.parse::<SocketAddr>(),
    ) {
        (Ok(udp), Ok(tcp)) => (udp, tcp),
        (Err(e), _) | (_, Err(e)) => {
            error!("Invalid address argument: {}", e);
            std::process::exit(2);
        }
    };

    info!("Sending {} MB through the relay...", DATA_SIZE / 1024 / 1024);
    let client = LoadClient::new(udp_target, tcp_target);
    match client.run(DATA_SIZE, DATAGRAM_SIZE).await {
        Ok(report) if report.mismatches > 0 || report.received < report.sent => {
            error!("Lossy transfer: {:?}", report);
            std::process::exit(1);
        }
        Ok(report) => info!("Transfer verified: {:?}", report),
        Err(e) => {
            error!("Transfer failed: {}", e);
            std::process::exit(1);
        }
    }
}
