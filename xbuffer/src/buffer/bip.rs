//! Bip buffer implementation.
//!
//! Readable bytes live in region A and, once writes wrap past the physical end
//! of the storage, in region B, which always starts at offset 0. Reads drain A
//! first; when A runs dry, B becomes the new A. Views never span both regions,
//! so every slice handed out is contiguous.

use core::cmp;

use alloc::vec::Vec;
use log::{debug, trace};

use super::allocate;
use crate::config::{BufferConfig, GrowthPolicy};
use crate::error::{Error, ErrorKind, Result};

/// Half-open byte range `[start, end)` in the backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    start: usize,
    end: usize,
}

impl Region {
    const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    const fn len(&self) -> usize {
        self.end - self.start
    }

    const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Which regions currently hold readable bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Nothing to read; the next put lands at offset 0.
    Empty,

    /// Region A only. Never empty.
    Single(Region),

    /// Region A plus region B at `[0, b_end)`, where `0 < b_end <= a.start`.
    Wrapped { a: Region, b_end: usize },
}

impl Layout {
    fn region_a(&self) -> Option<Region> {
        match *self {
            Layout::Empty => None,
            Layout::Single(a) | Layout::Wrapped { a, .. } => Some(a),
        }
    }

    fn used(&self) -> usize {
        match *self {
            Layout::Empty => 0,
            Layout::Single(a) => a.len(),
            Layout::Wrapped { a, b_end } => a.len() + b_end,
        }
    }
}

/// A bip buffer: a byte ring that only hands out contiguous views.
///
/// Writes are appended in FIFO order. When the physical end of the storage is
/// reached while the front has already been drained, writing continues in
/// region B at offset 0. [`peek`](Self::peek) and [`get_old`](Self::get_old)
/// only ever look at region A, while [`get`](Self::get) copies across the
/// region boundary.
///
/// With [`GrowthPolicy::Growable`] a put that exceeds the unused space
/// reallocates the storage instead of failing.
///
/// Views borrow the buffer, so they cannot outlive the next mutating call.
#[derive(Debug)]
pub struct ContiguousRingBuffer {
    /// The backing storage. Its length is the current capacity.
    storage: Vec<u8>,

    /// Readable regions.
    layout: Layout,

    config: BufferConfig,
}

impl ContiguousRingBuffer {
    /// Creates a fixed-size buffer of `size` bytes.
    pub fn create(size: usize) -> Result<Self> {
        Self::with_config(BufferConfig::new(size))
    }

    /// Creates a buffer with an explicit growth policy.
    ///
    /// Fails with `InvalidCapacity` when the capacity is zero or larger than
    /// the configured growth ceiling, and with `AllocationFailed` when the
    /// storage cannot be reserved.
    pub fn with_config(config: BufferConfig) -> Result<Self> {
        let ceiling_too_low = config
            .max_capacity
            .is_some_and(|max| max < config.capacity);
        if config.capacity == 0 || ceiling_too_low {
            return Err(Error::new(ErrorKind::InvalidCapacity));
        }

        Ok(Self {
            storage: allocate(config.capacity)?,
            layout: Layout::Empty,
            config,
        })
    }

    /// Releases the backing storage.
    ///
    /// The buffer is consumed, so it cannot be destroyed twice:
    ///
    /// ```compile_fail
    /// use xbuffer::ContiguousRingBuffer;
    ///
    /// let buf = ContiguousRingBuffer::create(16).unwrap();
    /// buf.destroy();
    /// buf.destroy();
    /// ```
    pub fn destroy(self) {
        trace!("bip: releasing {} bytes", self.storage.len());
    }

    /// Returns the configuration the buffer was created with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Returns true if the buffer grows instead of rejecting puts.
    #[inline]
    pub fn is_growable(&self) -> bool {
        self.config.growth == GrowthPolicy::Growable
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn used_size(&self) -> usize {
        self.layout.used()
    }

    /// Returns the number of bytes not holding unread data.
    #[inline]
    pub fn unused_size(&self) -> usize {
        self.storage.len() - self.layout.used()
    }

    /// Returns the current capacity of the backing storage.
    #[inline]
    pub fn max_payload_size(&self) -> usize {
        self.storage.len()
    }

    /// Returns true if there is nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout == Layout::Empty
    }

    /// Returns the length of region A, the longest view [`peek`](Self::peek)
    /// can return.
    #[inline]
    pub fn contiguous_len(&self) -> usize {
        self.layout.region_a().map_or(0, |a| a.len())
    }

    /// Appends `data` after the last unread byte.
    ///
    /// Returns the number of bytes written, which is always `data.len()`.
    /// When the data does not fit in the unused space, a fixed buffer fails
    /// with `InsufficientSpace` and a growable one reallocates first. Nothing
    /// is written on error.
    pub fn put(&mut self, data: &[u8]) -> Result<usize> {
        let len = data.len();
        if len == 0 {
            return Ok(0);
        }

        if len > self.unused_size() {
            self.grow(len)?;
        }

        match self.layout {
            Layout::Empty => {
                self.storage[..len].copy_from_slice(data);
                self.layout = Layout::Single(Region::new(0, len));
            }
            Layout::Single(mut a) => {
                let tail_room = self.storage.len() - a.end;
                if len <= tail_room {
                    self.storage[a.end..a.end + len].copy_from_slice(data);
                    a.end += len;
                    self.layout = Layout::Single(a);
                } else if len <= a.start {
                    self.storage[..len].copy_from_slice(data);
                    trace!("bip: region B started with {} bytes", len);
                    self.layout = Layout::Wrapped { a, b_end: len };
                } else {
                    // Neither side fits alone: fill up to the physical end and
                    // continue in region B.
                    let (head, rest) = data.split_at(tail_room);
                    self.storage[a.end..].copy_from_slice(head);
                    self.storage[..rest.len()].copy_from_slice(rest);
                    a.end = self.storage.len();
                    trace!(
                        "bip: {} bytes split across the end, region B holds {}",
                        len,
                        rest.len()
                    );
                    self.layout = Layout::Wrapped {
                        a,
                        b_end: rest.len(),
                    };
                }
            }
            Layout::Wrapped { a, b_end } => {
                if len <= a.start - b_end {
                    self.storage[b_end..b_end + len].copy_from_slice(data);
                    self.layout = Layout::Wrapped {
                        a,
                        b_end: b_end + len,
                    };
                } else {
                    self.compact();
                    let used = self.used_size();
                    self.storage[used..used + len].copy_from_slice(data);
                    self.layout = Layout::Single(Region::new(0, used + len));
                }
            }
        }

        Ok(len)
    }

    /// Returns a view of the next `len` unread bytes without consuming them.
    ///
    /// Returns `None` when region A holds fewer than `len` bytes, even if
    /// region B would make up the difference.
    pub fn peek(&self, len: usize) -> Option<&[u8]> {
        let a = self.layout.region_a()?;
        if len > a.len() {
            return None;
        }
        Some(&self.storage[a.start..a.start + len])
    }

    /// Copies up to `out.len()` unread bytes into `out` and consumes them.
    ///
    /// Returns the number of bytes copied, which is smaller than `out.len()`
    /// when less data is available. Fails with `InsufficientData` only when
    /// the buffer is empty.
    pub fn get(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::new(ErrorKind::InsufficientData));
        }

        let mut copied = 0;
        while copied < out.len() {
            let Some(a) = self.layout.region_a() else {
                break;
            };
            let n = cmp::min(a.len(), out.len() - copied);
            out[copied..copied + n].copy_from_slice(&self.storage[a.start..a.start + n]);
            self.advance(n);
            copied += n;
        }

        Ok(copied)
    }

    /// Consumes exactly `size` bytes and returns a view of them.
    ///
    /// Returns `None` and consumes nothing unless region A holds at least
    /// `size` bytes. Prefer [`get`](Self::get), which accepts partial reads.
    pub fn get_old(&mut self, size: usize) -> Option<&[u8]> {
        let a = self.layout.region_a()?;
        if size > a.len() {
            return None;
        }
        self.advance(size);
        Some(&self.storage[a.start..a.start + size])
    }

    /// Consumes up to `count` bytes without copying them.
    ///
    /// Returns the number of bytes skipped.
    pub fn skip(&mut self, count: usize) -> usize {
        let mut skipped = 0;
        while skipped < count {
            let Some(a) = self.layout.region_a() else {
                break;
            };
            let n = cmp::min(a.len(), count - skipped);
            self.advance(n);
            skipped += n;
        }
        skipped
    }

    /// Returns region A and region B, in read order. The second slice is
    /// empty unless the data has wrapped.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        match self.layout {
            Layout::Empty => (&[], &[]),
            Layout::Single(a) => (&self.storage[a.start..a.end], &[]),
            Layout::Wrapped { a, b_end } => {
                (&self.storage[a.start..a.end], &self.storage[..b_end])
            }
        }
    }

    /// Discards all unread bytes.
    pub fn clear(&mut self) {
        self.layout = Layout::Empty;
    }

    /// Moves the read cursor forward within region A, promoting region B once
    /// A is drained.
    fn advance(&mut self, count: usize) {
        self.layout = match self.layout {
            Layout::Empty => Layout::Empty,
            Layout::Single(a) => {
                debug_assert!(count <= a.len());
                let a = Region::new(a.start + count, a.end);
                if a.is_empty() {
                    Layout::Empty
                } else {
                    Layout::Single(a)
                }
            }
            Layout::Wrapped { a, b_end } => {
                debug_assert!(count <= a.len());
                let a = Region::new(a.start + count, a.end);
                if a.is_empty() {
                    trace!("bip: region B promoted to region A ({} bytes)", b_end);
                    Layout::Single(Region::new(0, b_end))
                } else {
                    Layout::Wrapped { a, b_end }
                }
            }
        };
    }

    /// Rotates the unread bytes to offset 0, region A first, so that all
    /// unused space follows them contiguously.
    fn compact(&mut self) {
        let Some(a) = self.layout.region_a() else {
            return;
        };
        if a.start == 0 {
            // Single region already at the front; Wrapped always has a.start > 0.
            return;
        }

        let used = self.layout.used();
        // [B | free | A | dead] -> [A | B | free]
        self.storage[..a.end].rotate_left(a.start);
        debug!("bip: compacted {} bytes to offset 0", used);
        self.layout = Layout::Single(Region::new(0, used));
    }

    /// Makes room for `additional` more bytes, or explains why it cannot.
    fn grow(&mut self, additional: usize) -> Result<()> {
        if !self.is_growable() {
            return Err(Error::new(ErrorKind::InsufficientSpace));
        }

        let capacity = self.storage.len();
        let required = self
            .used_size()
            .checked_add(additional)
            .ok_or(Error::new(ErrorKind::AllocationFailed))?;

        let mut target = cmp::max(capacity.saturating_mul(2), required);
        if let Some(max) = self.config.max_capacity {
            if required > max {
                debug!(
                    "bip: {} bytes needed, growth capped at {}",
                    required, max
                );
                return Err(Error::new(ErrorKind::InsufficientSpace));
            }
            target = cmp::min(target, max);
        }

        // Reserve before touching the layout so a failure leaves the buffer as it was.
        if self.storage.try_reserve_exact(target - capacity).is_err() {
            debug!(
                "bip: could not reserve {} bytes, retrying with {}",
                target, required
            );
            target = cmp::max(required, capacity);
            self.storage
                .try_reserve_exact(target - capacity)
                .map_err(|_| Error::new(ErrorKind::AllocationFailed))?;
        }
        self.compact();
        self.storage.resize(target, 0);

        debug!("bip: grew from {} to {} bytes", capacity, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_accounting(buf: &ContiguousRingBuffer) {
        assert_eq!(
            buf.used_size() + buf.unused_size(),
            buf.max_payload_size()
        );
    }

    #[test]
    fn test_basic_put_get() {
        let mut buf = ContiguousRingBuffer::create(64).unwrap();
        assert!(buf.is_empty());

        assert_eq!(buf.put(b"Hello").unwrap(), 5);
        assert_eq!(buf.used_size(), 5);
        assert_eq!(buf.unused_size(), 59);
        assert!(!buf.is_empty());

        let mut out = [0u8; 10];
        let read = buf.get(&mut out).unwrap();
        assert_eq!(read, 5);
        assert_eq!(&out[..5], b"Hello");
        assert!(buf.is_empty());
        assert_accounting(&buf);
    }

    #[test]
    fn test_create_rejects_zero_capacity() {
        let err = ContiguousRingBuffer::create(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);

        let config = BufferConfig::growable(32).with_max_capacity(16);
        let err = ContiguousRingBuffer::with_config(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
    }

    #[test]
    fn test_create_allocation_failure() {
        let err = ContiguousRingBuffer::create(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailed);
    }

    #[test]
    fn test_empty_buffer() {
        let mut buf = ContiguousRingBuffer::create(8).unwrap();
        let mut out = [0u8; 4];

        assert_eq!(
            buf.get(&mut out).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(buf.get_old(1), None);
        assert_eq!(buf.get_old(0), None);
        assert_eq!(buf.peek(1), None);
        assert_eq!(buf.as_slices(), (&[][..], &[][..]));
        assert_eq!(buf.contiguous_len(), 0);
        assert_eq!(buf.skip(4), 0);
    }

    #[test]
    fn test_empty_put_is_noop() {
        let mut buf = ContiguousRingBuffer::create(8).unwrap();
        assert_eq!(buf.put(&[]).unwrap(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_get() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();
        buf.put(b"abc").unwrap();

        let mut out = [0u8; 8];
        assert_eq!(buf.get(&mut out).unwrap(), 3);
        assert_eq!(&out[..3], b"abc");

        // A zero-sized read on a non-empty buffer is a partial read of nothing.
        buf.put(b"d").unwrap();
        assert_eq!(buf.get(&mut []).unwrap(), 0);
        assert_eq!(buf.used_size(), 1);
    }

    #[test]
    fn test_wrap_around() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();

        buf.put(b"0123456789").unwrap();

        let mut out = [0u8; 6];
        assert_eq!(buf.get(&mut out).unwrap(), 6);
        assert_eq!(&out, b"012345");

        // 6 bytes left at the physical end, 6 drained at the front.
        assert_eq!(buf.put(b"abcdefgh").unwrap(), 8);
        assert_eq!(buf.used_size(), 12);
        assert_accounting(&buf);

        let (a, b) = buf.as_slices();
        assert_eq!(a, b"6789abcdef");
        assert_eq!(b, b"gh");

        // Views never stitch the two regions together.
        assert_eq!(buf.contiguous_len(), 10);
        assert_eq!(buf.peek(12), None);
        assert_eq!(buf.peek(10), Some(&b"6789abcdef"[..]));

        let mut out = [0u8; 12];
        assert_eq!(buf.get(&mut out).unwrap(), 12);
        assert_eq!(&out, b"6789abcdefgh");
        assert!(buf.is_empty());
        assert_accounting(&buf);
    }

    #[test]
    fn test_region_b_before_region_a() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();
        buf.put(b"AAAAAAAABBBB").unwrap();
        assert_eq!(buf.skip(8), 8);

        // 4 bytes of tail room, 8 drained at the front: the record goes to B whole.
        buf.put(b"CCCCCC").unwrap();
        let (a, b) = buf.as_slices();
        assert_eq!(a, b"BBBB");
        assert_eq!(b, b"CCCCCC");

        // Further puts extend region B.
        buf.put(b"DD").unwrap();
        assert_eq!(buf.as_slices().1, b"CCCCCCDD");
        assert_accounting(&buf);

        // Draining A promotes B.
        assert_eq!(buf.get_old(4), Some(&b"BBBB"[..]));
        assert_eq!(buf.as_slices(), (&b"CCCCCCDD"[..], &[][..]));
        assert_eq!(buf.peek(8), Some(&b"CCCCCCDD"[..]));
    }

    #[test]
    fn test_compaction_when_gap_too_small() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();
        buf.put(b"xxxxxxxxABCD").unwrap();
        buf.skip(8);
        buf.put(b"EFGHIJ").unwrap();

        // Only 2 bytes between B and A, 6 unused in total.
        assert_eq!(buf.unused_size(), 6);
        buf.put(b"KLMNO").unwrap();

        assert_eq!(buf.as_slices(), (&b"ABCDEFGHIJKLMNO"[..], &[][..]));
        assert_eq!(buf.max_payload_size(), 16);
        assert_accounting(&buf);
    }

    #[test]
    fn test_fixed_rejects_oversized_put() {
        let mut buf = ContiguousRingBuffer::create(4).unwrap();

        let err = buf.put(b"0123456789").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientSpace);
        assert_eq!(buf.used_size(), 0);
        assert_eq!(buf.max_payload_size(), 4);

        buf.put(b"abc").unwrap();
        assert!(buf.put(b"de").is_err());
        assert_eq!(buf.peek(3), Some(&b"abc"[..]));
        assert_accounting(&buf);
    }

    #[test]
    fn test_fixed_fills_exactly() {
        let mut buf = ContiguousRingBuffer::create(8).unwrap();
        buf.put(b"12345678").unwrap();
        assert_eq!(buf.unused_size(), 0);
        assert!(buf.put(b"9").is_err());

        buf.skip(3);
        buf.put(b"abc").unwrap();
        let mut out = [0u8; 8];
        assert_eq!(buf.get(&mut out).unwrap(), 8);
        assert_eq!(&out, b"45678abc");
    }

    #[test]
    fn test_growable_put() {
        let mut buf = ContiguousRingBuffer::with_config(BufferConfig::growable(4)).unwrap();

        assert_eq!(buf.put(b"0123456789").unwrap(), 10);
        assert!(buf.max_payload_size() >= 10);
        assert_eq!(buf.used_size(), 10);
        assert_accounting(&buf);

        let mut out = [0u8; 10];
        assert_eq!(buf.get(&mut out).unwrap(), 10);
        assert_eq!(&out, b"0123456789");
    }

    #[test]
    fn test_growth_preserves_wrapped_order() {
        let mut buf = ContiguousRingBuffer::with_config(BufferConfig::growable(8)).unwrap();
        buf.put(b"abcdef").unwrap();
        buf.skip(4);
        buf.put(b"ghij").unwrap();
        assert_eq!(buf.as_slices(), (&b"ef"[..], &b"ghij"[..]));

        buf.put(b"klmnop").unwrap();
        assert_eq!(buf.max_payload_size(), 16);
        assert_eq!(buf.as_slices(), (&b"efghijklmnop"[..], &[][..]));
        assert_accounting(&buf);
    }

    #[test]
    fn test_growth_ceiling() {
        let config = BufferConfig::growable(4).with_max_capacity(8);
        let mut buf = ContiguousRingBuffer::with_config(config).unwrap();

        buf.put(b"123456").unwrap();
        assert_eq!(buf.max_payload_size(), 8);

        let err = buf.put(b"7890").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientSpace);
        assert_eq!(buf.used_size(), 6);
        assert_eq!(buf.peek(6), Some(&b"123456"[..]));
        assert_accounting(&buf);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buf = ContiguousRingBuffer::create(32).unwrap();
        buf.put(b"Test data").unwrap();

        let used = buf.used_size();
        let first = buf.peek(4).map(|v| {
            let mut copy = [0u8; 4];
            copy.copy_from_slice(v);
            copy
        });
        assert_eq!(first, Some(*b"Test"));
        assert_eq!(buf.peek(4), Some(&b"Test"[..]));
        assert_eq!(buf.used_size(), used);
        assert_eq!(buf.peek(0), Some(&[][..]));
        assert_eq!(buf.peek(10), None);
    }

    #[test]
    fn test_get_old_is_all_or_nothing() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();
        buf.put(b"abcdef").unwrap();

        assert_eq!(buf.get_old(7), None);
        assert_eq!(buf.used_size(), 6);

        assert_eq!(buf.get_old(4), Some(&b"abcd"[..]));
        assert_eq!(buf.used_size(), 2);

        assert_eq!(buf.get_old(2), Some(&b"ef"[..]));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_skip_crosses_regions() {
        let mut buf = ContiguousRingBuffer::create(8).unwrap();
        buf.put(b"abcdef").unwrap();
        buf.skip(4);
        buf.put(b"ghij").unwrap();

        assert_eq!(buf.skip(3), 3);
        assert_eq!(buf.as_slices(), (&b"hij"[..], &[][..]));
        assert_eq!(buf.skip(10), 3);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drain_in_chunks() {
        let mut buf = ContiguousRingBuffer::create(16).unwrap();
        buf.put(b"0123456789").unwrap();

        let mut out = [0u8; 4];
        let sizes: heapless::Vec<usize, 8> =
            core::iter::from_fn(|| buf.get(&mut out).ok()).collect();
        assert_eq!(&sizes[..], &[4, 4, 2]);
    }

    #[test]
    fn test_clear() {
        let mut buf = ContiguousRingBuffer::create(8).unwrap();
        buf.put(b"abcdef").unwrap();
        buf.skip(4);
        buf.put(b"ghij").unwrap();

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.unused_size(), 8);

        buf.put(b"12345678").unwrap();
        assert_eq!(buf.peek(8), Some(&b"12345678"[..]));
    }

    #[test]
    fn test_accounting_over_sequence() {
        let mut buf = ContiguousRingBuffer::with_config(BufferConfig::growable(8)).unwrap();
        let mut out = [0u8; 5];

        for round in 0..20u8 {
            let record = [round; 3];
            buf.put(&record).unwrap();
            assert_accounting(&buf);
            if round % 3 == 0 {
                buf.get(&mut out).unwrap();
                assert_accounting(&buf);
            }
            let _ = buf.peek(2);
            assert_accounting(&buf);
        }
    }

    #[test]
    fn test_buffer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ContiguousRingBuffer>();
    }
}
