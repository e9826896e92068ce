// producer/consumer adapter between two channels, with an unbounded queue in between.

mod config;
mod worker;

pub use self::config::BufferConfig;

use self::worker::{Shared, run_inbound, run_outbound};
use crate::{
    error::InvalidParameterError,
    util::{AtomicTake, ExitOnDrop},
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::{
    fmt::{self, Formatter, Debug},
    io,
    sync::{Arc, Mutex},
    thread,
};


/// Lifecycle stage of a [`Buffer`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BufferState {
    /// Constructed, workers not started
    Idle,
    /// Workers started and at least one still running
    Running,
    /// Closed, every queued value forwarded or discarded, outbound channel closed, workers exited
    Drained,
}

/// Producer/consumer hand-off between two channels
///
/// Producers send values into the [receive channel](Self::receive_channel). Once
/// [started](Self::start), an inbound worker thread moves each value into an internal unbounded
/// [`SafeQueue`](crate::SafeQueue), and an outbound worker thread forwards them, in the order
/// they arrived, into the [send channel](Self::send_channel) that consumers receive from.
///
/// Backpressure from a full send channel stalls only the outbound worker. The inbound side keeps
/// accepting values into the internal queue.
///
/// [Closing](Self::close) the buffer (or dropping it) closes the inbound side: values producers
/// already sent are still taken, after which further sends fail as disconnected. Everything queued
/// is then forwarded, the send channel closes, and the workers exit. There is no other way to
/// stop the workers, and no timeouts.
pub struct Buffer<T> {
    shared: Arc<Shared<T>>,
    // worker endpoints. taken by the first call to start.
    workers: AtomicTake<Workers<T>>,
    // producer-facing endpoints. none once closed.
    handles: Mutex<Option<Handles<T>>>,
    // consumer-facing endpoint, cloned out to consumers.
    outbound: Receiver<T>,
    thread_name: String,
}

// endpoints owned by the workers once started.
struct Workers<T> {
    inbound: Receiver<T>,
    close: Receiver<()>,
    outbound: Sender<T>,
}

// endpoints whose dropping closes the buffer.
struct Handles<T> {
    inbound: Sender<T>,
    // never sent on. dropping it disconnects the close channel, which signals the inbound worker.
    _close: Sender<()>,
}

impl<T> Buffer<T> {
    /// Construct an idle buffer whose inbound and outbound channels both have capacity `size`
    ///
    /// Errors if `size` is negative (or otherwise doesn't fit a `usize`).
    pub fn new<S>(size: S) -> Result<Self, InvalidParameterError>
    where
        S: TryInto<usize>,
    {
        let size = size.try_into()
            .map_err(|_| InvalidParameterError::new("buffer size", "must be non-negative"))?;
        Ok(Buffer::with_config(BufferConfig::new().with_capacity(size)))
    }

    /// Construct an idle buffer from a full configuration
    pub fn with_config(config: BufferConfig) -> Self {
        let (inbound_send, inbound_recv) = bounded(config.inbound_capacity);
        let (outbound_send, outbound_recv) = bounded(config.outbound_capacity);
        let (close_send, close_recv) = bounded(0);
        Buffer {
            shared: Arc::new(Shared::new()),
            workers: AtomicTake::some(Workers {
                inbound: inbound_recv,
                close: close_recv,
                outbound: outbound_send,
            }),
            handles: Mutex::new(Some(Handles { inbound: inbound_send, _close: close_send })),
            outbound: outbound_recv,
            thread_name: config.thread_name,
        }
    }

    /// Channel endpoint consumers receive forwarded values from
    ///
    /// Receiving fails as disconnected once the buffer has closed and drained everything.
    pub fn send_channel(&self) -> Receiver<T> {
        self.outbound.clone()
    }

    /// Channel endpoint producers send values into, or `None` once the buffer is closed
    pub fn receive_channel(&self) -> Option<Sender<T>> {
        self.handles.lock().unwrap().as_ref().map(|handles| handles.inbound.clone())
    }

    /// Drop every value in the internal queue, returning how many were dropped
    ///
    /// Values already handed to the outbound channel (or still in the inbound channel) are not
    /// affected.
    pub fn clean_buffer(&self) -> usize {
        let cleaned = self.shared.queue.clear().unwrap_or(0);
        debug!(cleaned, "cleaned buffer");
        cleaned
    }

    /// Number of values in the internal queue
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Close the inbound side of the buffer
    ///
    /// This does not wait for anything to drain; see [`wait`](Self::wait). Calling this more than
    /// once does nothing.
    pub fn close(&self) {
        if self.handles.lock().unwrap().take().is_some() {
            debug!("closing buffer");
        }
    }

    /// Whether the inbound worker has stopped accepting values
    ///
    /// This becomes true some time after [`close`](Self::close) is called on a started buffer.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Current lifecycle stage
    pub fn state(&self) -> BufferState {
        if self.workers.is_some() {
            BufferState::Idle
        } else if *self.shared.live.borrow() == 0 && self.shared.is_closed() {
            BufferState::Drained
        } else {
            BufferState::Running
        }
    }

    /// Wait until both workers have exited
    ///
    /// Returns immediately if the buffer was never started.
    pub async fn wait_async(&self) {
        let mut live = self.shared.live.subscribe();
        // can't fail, the sender lives as long as self
        let _ = live.wait_for(|&live| live == 0).await;
    }

    /// Block until both workers have exited
    ///
    /// Returns immediately if the buffer was never started.
    pub fn wait(&self) {
        futures::executor::block_on(self.wait_async());
    }
}

impl<T: Send + 'static> Buffer<T> {
    /// Launch the inbound and outbound workers
    ///
    /// Only the first call does anything. Errors if a worker thread could not be spawned, in
    /// which case the buffer closes and drains whatever it can.
    pub fn start(&self) -> io::Result<()> {
        let Some(Workers { inbound, close, outbound }) = self.workers.take() else {
            debug!("buffer already started");
            return Ok(());
        };
        self.shared.live.send_replace(2);

        // each guard runs when its worker exits for any reason, or when its thread never spawns.
        // the inbound worker exiting is what closes the buffer.
        let inbound_guard = {
            let shared = Arc::clone(&self.shared);
            ExitOnDrop::new(move || {
                shared.mark_closed();
                shared.worker_exited();
            })
        };
        let outbound_guard = {
            let shared = Arc::clone(&self.shared);
            ExitOnDrop::new(move || shared.worker_exited())
        };

        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name(format!("{}-outbound", self.thread_name))
            .spawn(move || {
                let _guard = outbound_guard;
                run_outbound(&shared, outbound);
            })
            .inspect_err(|e| error!(%e, "failed to spawn outbound worker"))?;

        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name(format!("{}-inbound", self.thread_name))
            .spawn(move || {
                let _guard = inbound_guard;
                run_inbound(&shared, inbound, close);
            })
            .inspect_err(|e| error!(%e, "failed to spawn inbound worker"))?;

        debug!(thread_name = %self.thread_name, "buffer started");
        Ok(())
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> Debug for Buffer<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("state", &self.state())
            .field("queued", &self.queued())
            .finish_non_exhaustive()
    }
}
