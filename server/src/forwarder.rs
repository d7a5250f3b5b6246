use log::{error, warn};
use xbuffer::{ContiguousRingBuffer, ErrorKind};

use crate::config::RelayConfig;

/// Counters for one subscriber session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ForwardStats {
    /// Datagrams accepted into the staging buffer.
    pub staged: u64,
    /// Datagrams dropped because the buffer was full.
    pub dropped: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Stages received datagrams and hands them out in stream-sized chunks.
///
/// The forwarder is owned by a single task; datagrams reach it over a
/// channel, so the buffer itself is never shared.
#[derive(Debug)]
pub struct Forwarder {
    buffer: ContiguousRingBuffer,
    chunk_size: usize,
    stats: ForwardStats,
}

impl Forwarder {
    pub fn new(config: &RelayConfig) -> xbuffer::Result<Self> {
        Ok(Self {
            buffer: ContiguousRingBuffer::with_config(config.buffer_config())?,
            chunk_size: config.chunk_size.max(1),
            stats: ForwardStats::default(),
        })
    }

    /// Puts one datagram into the staging buffer.
    ///
    /// Returns false if the datagram was dropped.
    pub fn stage(&mut self, frame: &[u8]) -> bool {
        match self.buffer.put(frame) {
            Ok(n) => {
                self.stats.staged += 1;
                self.stats.bytes_in += n as u64;
                true
            }
            Err(e) => {
                if e.kind() == ErrorKind::AllocationFailed {
                    error!("Dropping {}-byte frame: {}", frame.len(), e);
                } else {
                    warn!(
                        "Dropping {}-byte frame, {} bytes buffered: {}",
                        frame.len(),
                        self.buffered(),
                        e
                    );
                }
                self.stats.dropped += 1;
                false
            }
        }
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.used_size()
    }

    /// Returns the next bytes to send, at most `chunk_size` of them.
    pub fn next_chunk(&self) -> &[u8] {
        let len = self.chunk_size.min(self.buffer.contiguous_len());
        self.buffer.peek(len).unwrap_or_default()
    }

    /// Marks `sent` bytes from the front of the buffer as delivered.
    pub fn commit(&mut self, sent: usize) {
        let skipped = self.buffer.skip(sent);
        self.stats.bytes_out += skipped as u64;
    }

    pub fn stats(&self) -> ForwardStats {
        self.stats
    }
}
