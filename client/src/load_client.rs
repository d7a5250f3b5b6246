use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use log::*;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpStream, UdpSocket};
use xbuffer::FixedRingQueue;

use crate::pattern::{self, Verifier};

/// Capacity of the receive-side queue.
pub const QUEUE_CAPACITY: usize = 256 * 1024;

/// Bytes handed to the verifier per drain.
const VERIFY_CHUNK: usize = 4096;

/// Datagrams sent between pauses, so a local relay can keep up.
const BURST: usize = 64;

/// Stop reading once the relay has been silent this long.
const IDLE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Default, Clone, Copy)]
pub struct Report {
    pub sent: u64,
    pub received: u64,
    pub mismatches: u64,
}

/// Pushes patterned UDP datagrams through the relay and reads them back over TCP.
pub struct LoadClient {
    udp_target: SocketAddr,
    tcp_target: SocketAddr,
}

impl LoadClient {
    pub fn new(udp_target: SocketAddr, tcp_target: SocketAddr) -> Self {
        Self {
            udp_target,
            tcp_target,
        }
    }

    pub async fn run(&self, total: usize, datagram_size: usize) -> io::Result<Report> {
        info!("Subscribing to relay at {}", self.tcp_target);
        let stream = TcpStream::connect(self.tcp_target).await?;
        info!("TCP socket connected.");

        let udp = UdpSocket::bind("0.0.0.0:0").await?;
        udp.connect(self.udp_target).await?;
        let sender = tokio::spawn(send_datagrams(udp, total, datagram_size));

        let start = Instant::now();
        let (received, mismatches) = drain(stream, total).await?;
        let sent = sender.await.map_err(io::Error::other)??;
        let elapsed = start.elapsed();

        let speed = (received as f64 / 1024.0 / 1024.0) / elapsed.as_secs_f64();
        info!("=== Transfer Complete ===");
        info!("Total sent: {} KB", sent / 1024);
        info!("Total received: {} KB", received / 1024);
        info!("Pattern mismatches: {}", mismatches);
        info!("Time: {:.2} seconds", elapsed.as_secs_f64());
        info!("Speed: {:.2} MB/s", speed);

        Ok(Report {
            sent,
            received,
            mismatches,
        })
    }
}

async fn send_datagrams(udp: UdpSocket, total: usize, datagram_size: usize) -> io::Result<u64> {
    let mut datagram = vec![0u8; datagram_size.max(1)];
    let mut offset = 0usize;
    let mut count = 0usize;

    while offset < total {
        let len = datagram.len().min(total - offset);
        pattern::fill(offset as u64, &mut datagram[..len]);
        udp.send(&datagram[..len]).await?;
        offset += len;

        count += 1;
        if count % BURST == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    info!("Sent {} datagrams", count);
    Ok(offset as u64)
}

/// Reads the relayed stream through a fixed queue and verifies it.
async fn drain(mut stream: TcpStream, expected: usize) -> io::Result<(u64, u64)> {
    let mut queue = FixedRingQueue::alloc(QUEUE_CAPACITY)?;
    let mut scratch = vec![0u8; VERIFY_CHUNK];
    let mut chunk = vec![0u8; VERIFY_CHUNK];
    let mut verifier = Verifier::new();

    while (verifier.checked() as usize) < expected {
        let room = queue.unused().min(scratch.len());
        let n = match tokio::time::timeout(IDLE_TIMEOUT, stream.read(&mut scratch[..room])).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Relay idle for {:?}, giving up", IDLE_TIMEOUT);
                break;
            }
        };
        if n == 0 {
            info!("Relay closed the stream");
            break;
        }
        queue.put(&scratch[..n])?;

        while queue.len() >= VERIFY_CHUNK {
            let got = queue.get(&mut chunk)?;
            verifier.check(&chunk[..got]);
        }
    }

    // Whatever is left is shorter than a chunk.
    while let Ok(got) = queue.get(&mut chunk) {
        verifier.check(&chunk[..got]);
    }
    queue.free();

    Ok((verifier.checked(), verifier.mismatches()))
}
