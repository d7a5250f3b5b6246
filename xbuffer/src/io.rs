//! `std::io` adapters, so the buffers compose with `std::io::copy` and friends.
//!
//! An empty buffer reads as `Ok(0)`. Writes accept as many bytes as fit and
//! report `Ok(0)` when nothing does.

use std::io;

use crate::buffer::{ContiguousRingBuffer, FixedRingQueue};
use crate::error::ErrorKind;

impl io::Read for ContiguousRingBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        Ok(self.get(buf)?)
    }
}

impl io::Write for ContiguousRingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.put(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::InsufficientSpace => {
                // Whatever fits in the unused space can always be committed.
                let fits = buf.len().min(self.unused_size());
                Ok(self.put(&buf[..fits])?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for FixedRingQueue {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        Ok(self.get(buf)?)
    }
}

impl io::Write for FixedRingQueue {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let fits = buf.len().min(self.unused());
        self.put(&buf[..fits])?;
        Ok(fits)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
