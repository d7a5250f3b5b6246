//! Buffer implementations.
//!
//! - ContiguousRingBuffer: bip buffer with contiguous read views and optional growth
//! - FixedRingQueue: fixed-capacity kfifo byte queue

mod bip;
mod kfifo;

pub use bip::ContiguousRingBuffer;
pub use kfifo::FixedRingQueue;

use alloc::vec::Vec;

use crate::error::{Error, ErrorKind, Result};

/// Reserves a zeroed backing store of exactly `size` bytes.
fn allocate(size: usize) -> Result<Vec<u8>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(size)
        .map_err(|_| Error::new(ErrorKind::AllocationFailed))?;
    storage.resize(size, 0);
    Ok(storage)
}
