// implementation of the thread-safe queues.
//
// the organization of these modules is as such:
//
//      node<-----core: This is where all the unsafety lives. It presents a linked chain of nodes
//                 ^    with split front/back locking, which is fully safe and sound to use from
//                 |    any number of threads, but knows nothing about capacity policy.
//                 |
//                 |--safe: Unbounded queue wrapping core. Re-exported publicly.
//                 |
//                 \--limited: Bounded queue wrapping core. Re-exported publicly.
//
//      snapshot: The restartable iterator both public queues hand out.
//
// the ConcurrentQueue trait below is the contract both public queues share, so that code which
// doesn't care about bounds can be written once.

mod node;
mod core;
mod snapshot;
mod safe;
mod limited;

pub use self::{
    safe::SafeQueue,
    limited::LimitedSafeQueue,
    snapshot::SnapshotIter,
};

use crate::error::{EmptyError, FullError};


/// Operations shared by [`SafeQueue`] and [`LimitedSafeQueue`]
pub trait ConcurrentQueue<T>: Send + Sync {
    /// Push a value to the back, unless the queue is bounded and full
    ///
    /// Always succeeds for unbounded queues.
    fn try_enqueue(&self, value: T) -> Result<(), FullError<T>>;

    /// Pop the value at the front
    fn dequeue(&self) -> Result<T, EmptyError>;

    /// Number of queued values
    fn len(&self) -> usize;

    /// Whether no values are queued
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued values, if bounded
    fn capacity(&self) -> Option<usize>;

    /// Drop all queued values, returning how many were dropped, or erroring if there were none
    fn clear(&self) -> Result<usize, EmptyError>;

    /// Remove all queued values at once and return them front to back
    fn drain(&self) -> Vec<T>;
}

impl<T: Send> ConcurrentQueue<T> for SafeQueue<T> {
    fn try_enqueue(&self, value: T) -> Result<(), FullError<T>> {
        self.enqueue(value);
        Ok(())
    }

    fn dequeue(&self) -> Result<T, EmptyError> {
        SafeQueue::dequeue(self)
    }

    fn len(&self) -> usize {
        SafeQueue::len(self)
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn clear(&self) -> Result<usize, EmptyError> {
        SafeQueue::clear(self)
    }

    fn drain(&self) -> Vec<T> {
        SafeQueue::drain(self)
    }
}

impl<T: Send> ConcurrentQueue<T> for LimitedSafeQueue<T> {
    fn try_enqueue(&self, value: T) -> Result<(), FullError<T>> {
        self.enqueue(value)
    }

    fn dequeue(&self) -> Result<T, EmptyError> {
        LimitedSafeQueue::dequeue(self)
    }

    fn len(&self) -> usize {
        LimitedSafeQueue::len(self)
    }

    fn capacity(&self) -> Option<usize> {
        Some(LimitedSafeQueue::capacity(self))
    }

    fn clear(&self) -> Result<usize, EmptyError> {
        LimitedSafeQueue::clear(self)
    }

    fn drain(&self) -> Vec<T> {
        LimitedSafeQueue::drain(self)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::Arc,
        thread,
    };

    fn assert_send_sync<Q: Send + Sync>() {}

    #[test]
    fn queues_are_send_and_sync() {
        assert_send_sync::<SafeQueue<Box<u8>>>();
        assert_send_sync::<LimitedSafeQueue<Box<u8>>>();
        // a value that may be moved between threads but not shared is enough
        assert_send_sync::<SafeQueue<std::cell::Cell<u8>>>();
    }

    fn fifo_then_empty(queue: &dyn ConcurrentQueue<u32>) {
        for i in 0..10 {
            queue.try_enqueue(i).unwrap();
        }
        assert_eq!(queue.len(), 10);
        for i in 0..10 {
            assert_eq!(queue.dequeue(), Ok(i));
        }
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), Err(EmptyError));
        assert_eq!(queue.clear(), Err(EmptyError));
    }

    #[test]
    fn fifo_through_trait() {
        fifo_then_empty(&SafeQueue::new());
        fifo_then_empty(&LimitedSafeQueue::new(10));
    }

    #[test]
    fn capacity_through_trait() {
        let queues: Vec<Box<dyn ConcurrentQueue<u32>>> = vec![
            Box::new(SafeQueue::new()),
            Box::new(LimitedSafeQueue::new(4)),
        ];
        for queue in queues {
            let accepted = (0..8).filter(|&i| queue.try_enqueue(i).is_ok()).count();
            assert_eq!(Some(accepted), queue.capacity().or(Some(8)));
            assert_eq!(queue.len(), accepted);
            assert_eq!(queue.drain().len(), accepted);
        }
    }

    fn hand_off<Q>(queue: Arc<Q>)
    where
        Q: ConcurrentQueue<usize> + 'static,
    {
        const N: usize = 20_000;

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut i = 0;
                while i < N {
                    match queue.try_enqueue(i) {
                        Ok(()) => i += 1,
                        Err(_) => thread::yield_now(),
                    }
                }
            })
        };
        let mut expect = 0;
        while expect < N {
            match queue.dequeue() {
                Ok(i) => {
                    assert_eq!(i, expect);
                    expect += 1;
                }
                Err(EmptyError) => thread::yield_now(),
            }
        }
        producer.join().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn single_producer_single_consumer_hand_off() {
        hand_off(Arc::new(SafeQueue::new()));
        hand_off(Arc::new(LimitedSafeQueue::new(8)));
    }
}
