//! Thread-safe FIFO queues, and a producer/consumer buffer built on them.
//!
//! - [`SafeQueue`] is an unbounded queue that may be shared between threads.
//! - [`LimitedSafeQueue`] is the same, but refuses values past a fixed capacity.
//! - [`Buffer`] sits between two channels, soaking up whatever producers send while consumers
//!   fall behind.

#[macro_use]
extern crate tracing;

pub extern crate crossbeam_channel;

mod queue;
mod buffer;
mod util;

pub mod error;

pub use crate::{
    queue::{
        SafeQueue,
        LimitedSafeQueue,
        ConcurrentQueue,
        SnapshotIter,
    },
    buffer::{
        Buffer,
        BufferConfig,
        BufferState,
    },
};
