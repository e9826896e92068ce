// bounded thread-safe queue.

use super::{
    core::Chain,
    snapshot::SnapshotIter,
};
use crate::error::{EmptyError, FullError, InvalidParameterError};
use std::fmt::{self, Formatter, Debug};


/// Bounded FIFO queue which may be shared between threads
///
/// Behaves like [`SafeQueue`](crate::SafeQueue), except that enqueueing fails with [`FullError`]
/// once the queue holds `capacity` values. A failed enqueue leaves the queue unchanged and hands
/// the value back. The capacity check is made under the same lock that serializes every enqueue,
/// so concurrent enqueues can never push the queue over capacity.
pub struct LimitedSafeQueue<T> {
    chain: Chain<T>,
    capacity: usize,
}

impl<T> LimitedSafeQueue<T> {
    /// Construct empty with the given capacity
    ///
    /// A capacity of 0 is accepted, and produces a queue that is always full.
    pub fn new(capacity: usize) -> Self {
        LimitedSafeQueue { chain: Chain::new(), capacity }
    }

    /// Construct with the given capacity, holding the given values, first value at the front
    ///
    /// Errors if there are more values than fit.
    pub fn from_values<I>(capacity: usize, values: I) -> Result<Self, InvalidParameterError>
    where
        I: IntoIterator<Item = T>,
    {
        let queue = LimitedSafeQueue::new(capacity);
        for value in values {
            if queue.enqueue(value).is_err() {
                return Err(InvalidParameterError::new(
                    "initial values",
                    format!("more values than capacity {}", capacity),
                ));
            }
        }
        Ok(queue)
    }

    /// Push a value to the back, unless the queue is full
    pub fn enqueue(&self, value: T) -> Result<(), FullError<T>> {
        self.chain.push(value, Some(self.capacity)).map_err(|value| FullError { value })
    }

    /// Pop the value at the front
    pub fn dequeue(&self) -> Result<T, EmptyError> {
        self.chain.pop().ok_or(EmptyError)
    }

    /// Clone the value at the front without removing it
    pub fn peek(&self) -> Result<T, EmptyError>
    where
        T: Clone,
    {
        self.chain.peek().ok_or(EmptyError)
    }

    /// Number of queued values
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether no values are queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued values
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether enqueueing would currently fail
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Number of values that could currently be enqueued
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Drop all queued values
    ///
    /// Returns how many values were dropped, or errors if there were none.
    pub fn clear(&self) -> Result<usize, EmptyError> {
        match self.chain.clear() {
            0 => Err(EmptyError),
            n => {
                trace!(count = n, capacity = self.capacity, "cleared limited queue");
                Ok(n)
            }
        }
    }

    /// Remove all queued values at once and return them front to back
    pub fn drain(&self) -> Vec<T> {
        self.chain.drain()
    }

    /// Clone all queued values into a vector, front to back
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.chain.to_vec()
    }

    /// Iterate over a snapshot of the currently queued values
    ///
    /// See [`SnapshotIter`].
    pub fn iter(&self) -> SnapshotIter<T>
    where
        T: Clone,
    {
        SnapshotIter::new(self.to_vec())
    }
}

impl<T: Clone> Clone for LimitedSafeQueue<T> {
    fn clone(&self) -> Self {
        let cloned = LimitedSafeQueue::new(self.capacity);
        for value in self.to_vec() {
            // the snapshot can't exceed the shared capacity
            let _ = cloned.enqueue(value);
        }
        cloned
    }
}

impl<T: Debug> Debug for LimitedSafeQueue<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("LimitedSafeQueue")
            .field("capacity", &self.capacity)
            .field("elems", &self.chain)
            .finish()
    }
}

impl<'a, T: Clone> IntoIterator for &'a LimitedSafeQueue<T> {
    type Item = T;
    type IntoIter = SnapshotIter<T>;

    fn into_iter(self) -> SnapshotIter<T> {
        self.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering::Relaxed},
            Arc, Barrier,
        },
        thread,
    };

    #[test]
    fn rejects_at_capacity() {
        let queue = LimitedSafeQueue::new(3);
        for i in 0..3 {
            assert!(queue.enqueue(i).is_ok());
        }
        assert!(queue.is_full());
        assert_eq!(queue.remaining(), 0);
        let e = queue.enqueue(3).unwrap_err();
        assert_eq!(e.into_inner(), 3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.to_vec(), vec![0, 1, 2]);

        assert_eq!(queue.dequeue(), Ok(0));
        assert!(!queue.is_full());
        assert!(queue.enqueue(3).is_ok());
        assert_eq!(queue.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_capacity_is_always_full() {
        let queue = LimitedSafeQueue::new(0);
        assert!(queue.is_full());
        assert!(queue.enqueue(()).is_err());
        assert_eq!(queue.dequeue(), Err(EmptyError));
    }

    #[test]
    fn from_values_checks_capacity() {
        let queue = LimitedSafeQueue::from_values(3, vec!['a', 'b']).unwrap();
        assert_eq!(queue.capacity(), 3);
        assert_eq!(queue.peek(), Ok('a'));
        assert_eq!(queue.remaining(), 1);

        let e = LimitedSafeQueue::from_values(1, vec!['a', 'b']).unwrap_err();
        assert_eq!(e.name, "initial values");
    }

    #[test]
    fn empty_after_clear() {
        let queue = LimitedSafeQueue::from_values(10, 0..10).unwrap();
        assert_eq!(queue.clear(), Ok(10));
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), Err(EmptyError));
        assert_eq!(queue.clear(), Err(EmptyError));
        assert_eq!(queue.remaining(), 10);
    }

    #[test]
    fn clone_is_independent_and_keeps_capacity() {
        let q1 = LimitedSafeQueue::from_values(4, vec![1, 2, 3]).unwrap();
        let q2 = q1.clone();
        assert_eq!(q2.capacity(), 4);
        q2.enqueue(4).unwrap();
        assert!(q2.enqueue(5).is_err());
        q2.dequeue().unwrap();
        assert_eq!(q1.len(), 3);
        assert_eq!(q1.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn debug_shows_capacity_and_elems() {
        let queue = LimitedSafeQueue::from_values(2, ["a"]).unwrap();
        assert_eq!(
            format!("{:?}", queue),
            r#"LimitedSafeQueue { capacity: 2, elems: ["a"] }"#,
        );
    }

    #[test]
    fn racing_enqueues_never_overshoot() {
        const THREADS: usize = 8;
        const CAPACITY: usize = 100;

        let queue = Arc::new(LimitedSafeQueue::new(CAPACITY));
        let accepted = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));
        let joins = (0..THREADS)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let accepted = Arc::clone(&accepted);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..1_000 {
                        if queue.enqueue(i).is_ok() {
                            accepted.fetch_add(1, Relaxed);
                        }
                        assert!(queue.len() <= CAPACITY);
                    }
                })
            })
            .collect::<Vec<_>>();
        for join in joins {
            join.join().unwrap();
        }
        assert_eq!(accepted.load(Relaxed), CAPACITY);
        assert_eq!(queue.len(), CAPACITY);
    }

    #[test]
    fn racing_producers_and_consumers_stay_within_capacity() {
        const CAPACITY: usize = 16;

        let queue = Arc::new(LimitedSafeQueue::new(CAPACITY));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut i = 0;
                while i < 10_000 {
                    match queue.enqueue(i) {
                        Ok(()) => i += 1,
                        Err(_) => thread::yield_now(),
                    }
                    assert!(queue.len() <= CAPACITY);
                }
            })
        };
        let mut expect = 0;
        while expect < 10_000 {
            if let Ok(value) = queue.dequeue() {
                assert_eq!(value, expect);
                expect += 1;
            }
        }
        producer.join().unwrap();
        assert!(queue.is_empty());
    }
}
