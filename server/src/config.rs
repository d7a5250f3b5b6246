use std::net::{AddrParseError, SocketAddr};

use xbuffer::BufferConfig;

/// UDP port the original camera relay listened on.
pub const DEFAULT_UDP_PORT: u16 = 8071;
pub const DEFAULT_TCP_PORT: u16 = 8072;

pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;
pub const DEFAULT_MAX_BUFFER_CAPACITY: usize = 4 * 1024 * 1024;

/// Bytes handed to the TCP stream per send opportunity.
pub const DEFAULT_CHUNK_SIZE: usize = 1400;

/// Datagrams queued between the UDP receiver and the forwarder.
pub const DEFAULT_CHANNEL_DEPTH: usize = 256;

/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65507;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub udp_addr: SocketAddr,
    pub tcp_addr: SocketAddr,
    pub buffer_capacity: usize,
    pub max_buffer_capacity: usize,
    pub chunk_size: usize,
    pub channel_depth: usize,
}

impl RelayConfig {
    pub fn new() -> Self {
        Self {
            udp_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_UDP_PORT)),
            tcp_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_TCP_PORT)),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            channel_depth: DEFAULT_CHANNEL_DEPTH,
        }
    }

    /// Builds a config from positional arguments: `[udp_addr] [tcp_addr]`.
    pub fn from_args<I>(args: I) -> Result<Self, AddrParseError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::new();
        let mut args = args.into_iter();
        if let Some(udp) = args.next() {
            config = config.with_udp_addr(udp.parse()?);
        }
        if let Some(tcp) = args.next() {
            config = config.with_tcp_addr(tcp.parse()?);
        }
        Ok(config)
    }

    pub fn with_udp_addr(mut self, addr: SocketAddr) -> Self {
        self.udp_addr = addr;
        self
    }

    pub fn with_tcp_addr(mut self, addr: SocketAddr) -> Self {
        self.tcp_addr = addr;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_max_buffer_capacity(mut self, capacity: usize) -> Self {
        self.max_buffer_capacity = capacity;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_channel_depth(mut self, depth: usize) -> Self {
        self.channel_depth = depth;
        self
    }

    /// Staging buffer config: grows on bursts, up to the ceiling.
    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig::growable(self.buffer_capacity).with_max_capacity(self.max_buffer_capacity)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}
