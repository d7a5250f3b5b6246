use std::io;
use std::sync::Arc;
use std::time::Instant;

use log::*;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;

use crate::config::{MAX_DATAGRAM_SIZE, RelayConfig};
use crate::forwarder::{ForwardStats, Forwarder};

/// Relays UDP datagrams to one TCP subscriber at a time.
pub struct RelayServer {
    config: RelayConfig,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> io::Result<()> {
        let udp = Arc::new(UdpSocket::bind(self.config.udp_addr).await?);
        info!("Receiving datagrams on UDP {}", udp.local_addr()?);

        let listener = TcpListener::bind(self.config.tcp_addr).await?;
        info!("Server listening on TCP {}", listener.local_addr()?);

        loop {
            let (stream, peer) = listener.accept().await?;
            info!("Accepted TCP subscriber from {:?}", peer);
            match self.serve(Arc::clone(&udp), stream).await {
                Ok(stats) => info!("Subscriber {} finished: {:?}", peer, stats),
                Err(e) => error!("Subscriber {} error: {}", peer, e),
            }
        }
    }

    /// Forwards datagrams to `stream` until the subscriber goes away.
    pub async fn serve(&self, udp: Arc<UdpSocket>, stream: TcpStream) -> io::Result<ForwardStats> {
        let forwarder = Forwarder::new(&self.config)?;
        let (tx, rx) = mpsc::channel(self.config.channel_depth);
        let receiver = tokio::spawn(receive_datagrams(udp, tx));

        let start = Instant::now();
        let result = forward(stream, rx, forwarder).await;
        receiver.abort();
        let stats = result?;

        let elapsed = start.elapsed();
        let speed = (stats.bytes_out as f64 / 1024.0) / elapsed.as_secs_f64();
        info!("=== Relay Complete ===");
        info!("Total staged: {} KB", stats.bytes_in / 1024);
        info!("Total forwarded: {} KB", stats.bytes_out / 1024);
        info!("Frames staged: {}, dropped: {}", stats.staged, stats.dropped);
        info!("Time: {:.2} seconds", elapsed.as_secs_f64());
        info!("Speed: {:.2} KB/s", speed);

        Ok(stats)
    }
}

/// Producer side: one `send` per received datagram.
async fn receive_datagrams(udp: Arc<UdpSocket>, frames: mpsc::Sender<Vec<u8>>) -> io::Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (n, from) = udp.recv_from(&mut buf).await?;
        trace!("Received {} bytes from {}", n, from);
        if frames.send(buf[..n].to_vec()).await.is_err() {
            debug!("Forwarder gone, receiver exiting");
            return Ok(());
        }
    }
}

/// Consumer side: stages frames and writes chunks whenever the stream is
/// writable. Returns once the subscriber closes its end, or once the frame
/// channel closes and everything staged has been written.
pub(crate) async fn forward(
    mut stream: TcpStream,
    mut frames: mpsc::Receiver<Vec<u8>>,
    mut forwarder: Forwarder,
) -> io::Result<ForwardStats> {
    // Subscribers never send; anything they do send is discarded.
    let mut inbound = [0u8; 512];
    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Some(frame) => {
                    forwarder.stage(&frame);
                }
                None => break,
            },
            ready = stream.writable(), if forwarder.has_pending() => {
                ready?;
                match stream.try_write(forwarder.next_chunk()) {
                    Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                    Ok(n) => forwarder.commit(n),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                    Err(e) => return Err(e),
                }
            }
            ready = stream.readable() => {
                ready?;
                match stream.try_read(&mut inbound) {
                    Ok(0) => {
                        info!(
                            "Subscriber closed the connection, {} bytes left unsent",
                            forwarder.buffered()
                        );
                        return Ok(forwarder.stats());
                    }
                    Ok(n) => trace!("Discarded {} bytes from subscriber", n),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    while forwarder.has_pending() {
        let chunk = forwarder.next_chunk();
        stream.write_all(chunk).await?;
        let sent = chunk.len();
        forwarder.commit(sent);
    }
    stream.flush().await?;

    debug!("Forwarder drained: {:?}", forwarder.stats());
    Ok(forwarder.stats())
}
