//! # XBuffer - Byte Staging Buffers
//!
//! XBuffer is a `no_std` + `alloc` library that decouples a data producer
//! (a network or media receiver) from a data consumer (a forwarder) without
//! per-byte synchronization. It provides two independent buffers:
//!
//! - **ContiguousRingBuffer**: a bip buffer. Readable data lives in at most two
//!   regions of one allocation and every view handed out is contiguous.
//!   Optionally grows when a put does not fit.
//! - **FixedRingQueue**: a kfifo. Fixed power-of-two capacity, all-or-nothing
//!   puts, partial gets, no contiguity guarantee.
//!
//! ## Layout
//!
//! ```text
//!  ContiguousRingBuffer (wrapped)
//!  ┌──────────┬───────────┬──────────────────────┬──────┐
//!  │ region B │   free    │       region A       │ dead │
//!  └──────────┴───────────┴──────────────────────┴──────┘
//!  0          b_end       a.start                a.end   capacity
//!
//!  FixedRingQueue
//!  ┌─────────┬─────────────────────┬─────────┐
//!  │  data   │        free         │  data   │
//!  └─────────┴─────────────────────┴─────────┘
//!            write_pos & mask      read_pos & mask
//! ```
//!
//! Neither buffer locks. Exactly one producer and one consumer are expected,
//! with the caller providing the handoff between them (for example a channel
//! into the task that owns the buffer).
//!
//! ## Example
//!
//! ```rust
//! use xbuffer::{BufferConfig, ContiguousRingBuffer, FixedRingQueue};
//!
//! let mut bip = ContiguousRingBuffer::with_config(BufferConfig::growable(16)).unwrap();
//! bip.put(b"Hello, World!").unwrap();
//! assert_eq!(bip.peek(5), Some(&b"Hello"[..]));
//!
//! let mut out = [0u8; 32];
//! let n = bip.get(&mut out).unwrap();
//! assert_eq!(&out[..n], b"Hello, World!");
//!
//! let mut fifo = FixedRingQueue::alloc(8).unwrap();
//! fifo.put(b"abc").unwrap();
//! assert_eq!(fifo.len(), 3);
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod buffer;
pub mod config;
pub mod error;
#[cfg(feature = "std")]
pub mod io;

// Re-export commonly used types
pub use buffer::{ContiguousRingBuffer, FixedRingQueue};
pub use config::{BufferConfig, GrowthPolicy};
pub use error::{Error, ErrorKind, Result};

/// Default capacity of a [`BufferConfig`].
pub const DEFAULT_CAPACITY: usize = 64 * 1024;
