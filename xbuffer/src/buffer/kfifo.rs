//! Fixed-capacity byte queue in the style of the Linux kfifo.
//!
//! Read and write positions are free-running counters; the slot of a position
//! is `pos & mask`, and the fill level is `write_pos - read_pos` in wrapping
//! arithmetic. Capacity is rounded up to a power of two so the mask works.

use core::cmp;

use alloc::vec::Vec;
use log::trace;

use super::allocate;
use crate::error::{Error, ErrorKind, Result};

/// A fixed-capacity FIFO byte queue.
///
/// Puts are all-or-nothing; gets transfer as much as is available. The
/// queue never grows and makes no contiguity promise about its contents.
#[derive(Debug)]
pub struct FixedRingQueue {
    /// The underlying storage, a power of two in length.
    buffer: Vec<u8>,

    /// `buffer.len() - 1`.
    mask: usize,

    /// Total bytes ever written.
    write_pos: usize,

    /// Total bytes ever read.
    read_pos: usize,
}

impl FixedRingQueue {
    /// Allocates a queue holding at least `size` bytes.
    ///
    /// The capacity is `size` rounded up to the next power of two.
    pub fn alloc(size: usize) -> Result<Self> {
        let capacity = size
            .checked_next_power_of_two()
            .filter(|_| size > 0)
            .ok_or(Error::new(ErrorKind::InvalidCapacity))?;

        if capacity != size {
            trace!("kfifo: capacity {} rounded up to {}", size, capacity);
        }

        Ok(Self {
            buffer: allocate(capacity)?,
            mask: capacity - 1,
            write_pos: 0,
            read_pos: 0,
        })
    }

    /// Releases the backing storage.
    ///
    /// The queue is consumed, so it cannot be freed twice:
    ///
    /// ```compile_fail
    /// use xbuffer::FixedRingQueue;
    ///
    /// let fifo = FixedRingQueue::alloc(16).unwrap();
    /// fifo.free();
    /// fifo.free();
    /// ```
    pub fn free(self) {
        trace!("kfifo: releasing {} bytes", self.buffer.len());
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.write_pos.wrapping_sub(self.read_pos)
    }

    /// Returns true if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the queue is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Returns the capacity, a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of bytes that can still be put.
    #[inline]
    pub fn unused(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Appends all of `buf`, or nothing.
    ///
    /// Fails with `InsufficientSpace` if `buf` is longer than [`unused`](Self::unused).
    pub fn put(&mut self, buf: &[u8]) -> Result<()> {
        if buf.len() > self.unused() {
            return Err(Error::new(ErrorKind::InsufficientSpace));
        }

        let start = self.write_pos & self.mask;
        let first_chunk = cmp::min(buf.len(), self.capacity() - start);
        self.buffer[start..start + first_chunk].copy_from_slice(&buf[..first_chunk]);
        self.buffer[..buf.len() - first_chunk].copy_from_slice(&buf[first_chunk..]);

        self.write_pos = self.write_pos.wrapping_add(buf.len());
        Ok(())
    }

    /// Moves up to `out.len()` of the oldest bytes into `out`.
    ///
    /// Returns the number of bytes copied. Fails with `InsufficientData` only
    /// when the queue is empty.
    pub fn get(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::new(ErrorKind::InsufficientData));
        }

        let n = self.peek(out);
        self.read_pos = self.read_pos.wrapping_add(n);
        Ok(n)
    }

    /// Copies up to `out.len()` of the oldest bytes into `out` without
    /// consuming them.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let n = cmp::min(out.len(), self.len());
        let start = self.read_pos & self.mask;
        let first_chunk = cmp::min(n, self.capacity() - start);

        out[..first_chunk].copy_from_slice(&self.buffer[start..start + first_chunk]);
        out[first_chunk..n].copy_from_slice(&self.buffer[..n - first_chunk]);
        n
    }

    /// Consumes up to `count` bytes without reading them.
    pub fn skip(&mut self, count: usize) -> usize {
        let n = cmp::min(count, self.len());
        self.read_pos = self.read_pos.wrapping_add(n);
        n
    }

    /// Discards all unread bytes.
    pub fn clear(&mut self) {
        self.read_pos = self.write_pos;
    }

    /// Returns the unread bytes as up to two slices in FIFO order.
    ///
    /// The second slice is empty unless the data wraps.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let len = self.len();
        let start = self.read_pos & self.mask;
        let first_chunk = cmp::min(len, self.capacity() - start);
        (
            &self.buffer[start..start + first_chunk],
            &self.buffer[..len - first_chunk],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_put_get() {
        let mut fifo = FixedRingQueue::alloc(64).unwrap();
        assert!(fifo.is_empty());

        fifo.put(b"Hello").unwrap();
        assert_eq!(fifo.len(), 5);

        let mut out = [0u8; 10];
        let read = fifo.get(&mut out).unwrap();
        assert_eq!(read, 5);
        assert_eq!(&out[..5], b"Hello");
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_capacity_rounds_up() {
        assert_eq!(FixedRingQueue::alloc(10).unwrap().capacity(), 16);
        assert_eq!(FixedRingQueue::alloc(16).unwrap().capacity(), 16);
        assert_eq!(FixedRingQueue::alloc(1).unwrap().capacity(), 1);
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            FixedRingQueue::alloc(0).unwrap_err().kind(),
            ErrorKind::InvalidCapacity
        );
        assert_eq!(
            FixedRingQueue::alloc(usize::MAX).unwrap_err().kind(),
            ErrorKind::InvalidCapacity
        );
    }

    #[test]
    fn test_allocation_failure() {
        // Representable power of two, but beyond what a Vec may hold.
        let err = FixedRingQueue::alloc(1 << (usize::BITS - 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailed);
    }

    #[test]
    fn test_put_is_all_or_nothing() {
        let mut fifo = FixedRingQueue::alloc(8).unwrap();
        fifo.put(b"123456").unwrap();

        let err = fifo.put(b"789").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientSpace);
        assert_eq!(fifo.len(), 6);

        fifo.put(b"78").unwrap();
        assert!(fifo.is_full());
        assert!(fifo.put(b"9").is_err());
        assert!(fifo.put(&[]).is_ok());
    }

    #[test]
    fn test_get_returns_min_of_request_and_len() {
        let mut fifo = FixedRingQueue::alloc(16).unwrap();
        fifo.put(b"abcdefgh").unwrap();

        let mut out = [0u8; 3];
        assert_eq!(fifo.get(&mut out).unwrap(), 3);
        assert_eq!(&out, b"abc");
        assert_eq!(fifo.len(), 5);

        let mut out = [0u8; 32];
        assert_eq!(fifo.get(&mut out).unwrap(), 5);
        assert_eq!(&out[..5], b"defgh");
        assert_eq!(fifo.len(), 0);
    }

    #[test]
    fn test_empty_get_fails() {
        let mut fifo = FixedRingQueue::alloc(8).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(
            fifo.get(&mut out).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );

        // Zero-length read of a non-empty queue is a partial transfer, not an error.
        fifo.put(b"x").unwrap();
        assert_eq!(fifo.get(&mut []).unwrap(), 0);
        assert_eq!(fifo.len(), 1);
    }

    #[test]
    fn test_wrap_around() {
        let mut fifo = FixedRingQueue::alloc(8).unwrap();

        fifo.put(b"12345").unwrap();
        let mut out = [0u8; 3];
        fifo.get(&mut out).unwrap();
        assert_eq!(&out, b"123");

        fifo.put(b"ABCDE").unwrap();
        assert_eq!(fifo.len(), 7);

        let (s1, s2) = fifo.as_slices();
        assert_eq!(s1, b"45ABC");
        assert_eq!(s2, b"DE");

        let mut out = [0u8; 8];
        assert_eq!(fifo.get(&mut out).unwrap(), 7);
        assert_eq!(&out[..7], b"45ABCDE");
    }

    #[test]
    fn test_counter_overflow() {
        let mut fifo = FixedRingQueue::alloc(8).unwrap();
        fifo.write_pos = usize::MAX - 2;
        fifo.read_pos = usize::MAX - 2;
        assert!(fifo.is_empty());

        fifo.put(b"abcdef").unwrap();
        assert_eq!(fifo.len(), 6);
        assert!(fifo.write_pos < fifo.read_pos);

        let mut out = [0u8; 6];
        assert_eq!(fifo.get(&mut out).unwrap(), 6);
        assert_eq!(&out, b"abcdef");
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_peek_and_skip() {
        let mut fifo = FixedRingQueue::alloc(32).unwrap();
        fifo.put(b"Test data").unwrap();

        let mut out1 = [0u8; 4];
        let mut out2 = [0u8; 4];
        fifo.peek(&mut out1);
        fifo.peek(&mut out2);
        assert_eq!(&out1, b"Test");
        assert_eq!(&out2, b"Test");
        assert_eq!(fifo.len(), 9);

        assert_eq!(fifo.skip(5), 5);
        assert_eq!(fifo.as_slices().0, b"data");
        assert_eq!(fifo.skip(100), 4);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut fifo = FixedRingQueue::alloc(4).unwrap();
        fifo.put(b"abcd").unwrap();
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.unused(), 4);
        fifo.put(b"efgh").unwrap();
        assert_eq!(fifo.as_slices(), (&b"efgh"[..], &[][..]));
    }
}
