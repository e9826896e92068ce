// background workers of a buffer, and the state they share with the buffer handle.
//
// the inbound worker moves values from the inbound channel into the queue. the outbound worker
// moves values from the queue into the outbound channel. they meet at the queue, and the outbound
// worker parks on a condition variable while the queue is empty.
//
// lock discipline: the condvar mutex is never held while a queue lock is taken. the outbound
// worker decides whether to park by reading the queue's lock-free element count, and dequeues only
// after releasing the condvar mutex.

use crate::queue::SafeQueue;
use crossbeam_channel::{select, Receiver, Sender};
use std::sync::{Condvar, Mutex};
use tokio::sync::watch;


// state shared between a buffer and its workers.
pub(super) struct Shared<T> {
    // values received but not yet forwarded.
    pub(super) queue: SafeQueue<T>,
    // becomes true once the inbound worker will never enqueue again. never becomes false again.
    closed: Mutex<bool>,
    // notified after every enqueue by the inbound worker, and when closed is set.
    not_empty_or_closed: Condvar,
    // number of workers that have not exited yet.
    pub(super) live: watch::Sender<usize>,
}

impl<T> Shared<T> {
    pub(super) fn new() -> Self {
        let (live, _) = watch::channel(0);
        Shared {
            queue: SafeQueue::new(),
            closed: Mutex::new(false),
            not_empty_or_closed: Condvar::new(),
            live,
        }
    }

    // enqueue and wake the outbound worker.
    //
    // notifying while holding the mutex is what prevents a lost wakeup: the outbound worker checks
    // emptiness under the same mutex, so it either sees this value or is already parked.
    fn push(&self, value: T) {
        self.queue.enqueue(value);
        let _closed = self.closed.lock().unwrap();
        self.not_empty_or_closed.notify_one();
    }

    // set the closed flag and wake the outbound worker.
    pub(super) fn mark_closed(&self) {
        let mut closed = self.closed.lock().unwrap();
        *closed = true;
        self.not_empty_or_closed.notify_all();
    }

    pub(super) fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    // record that a worker has exited.
    pub(super) fn worker_exited(&self) {
        self.live.send_modify(|live| *live -= 1);
    }
}


// inbound worker body. returns once the inbound side is closed, after taking every value that was
// already sent before the close.
pub(super) fn run_inbound<T>(shared: &Shared<T>, inbound: Receiver<T>, close: Receiver<()>) {
    debug!("inbound worker started");
    loop {
        select! {
            recv(inbound) -> msg => match msg {
                Ok(value) => {
                    shared.push(value);
                    trace!("queued item");
                }
                Err(_) => {
                    debug!("every inbound sender dropped");
                    break;
                }
            },
            // nothing is ever sent on the close channel, it only disconnects
            recv(close) -> _ => {
                let mut late = 0;
                for value in inbound.try_iter() {
                    shared.push(value);
                    late += 1;
                }
                debug!(late, "buffer closed");
                break;
            }
        }
    }
}

// outbound worker body. returns once the buffer is closed and the queue is drained. the outbound
// sender is dropped on return, which closes the outbound channel.
pub(super) fn run_outbound<T>(shared: &Shared<T>, outbound: Sender<T>) {
    debug!("outbound worker started");
    let mut outbound = Some(outbound);
    loop {
        let closed = shared.closed.lock().unwrap();
        let closed = shared.not_empty_or_closed
            .wait_while(closed, |closed| !*closed && shared.queue.is_empty())
            .unwrap();
        let done = *closed && shared.queue.is_empty();
        drop(closed);
        if done {
            break;
        }

        // may come up empty if the buffer was cleaned in the meantime
        if let Ok(value) = shared.queue.dequeue() {
            forward(&mut outbound, value);
        }
    }

    // nothing can be enqueued anymore, so an empty queue means nothing is left
    while let Ok(value) = shared.queue.dequeue() {
        forward(&mut outbound, value);
    }
    debug!("outbound worker drained");
}

// send a value on the outbound channel, blocking while the channel is full. once every receiver is
// gone, discard values instead, so the queue keeps draining.
fn forward<T>(outbound: &mut Option<Sender<T>>, value: T) {
    let Some(sender) = outbound.as_ref() else { return };
    match sender.send(value) {
        Ok(()) => trace!("forwarded item"),
        Err(_) => {
            debug!("every outbound receiver dropped, discarding remaining items");
            *outbound = None;
        }
    }
}
