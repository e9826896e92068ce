// unbounded thread-safe queue.

use super::{
    core::Chain,
    snapshot::SnapshotIter,
};
use crate::error::EmptyError;
use std::fmt::{self, Formatter, Debug};


/// Unbounded FIFO queue which may be shared between threads
///
/// Enqueue and dequeue are guarded by separate locks, so a producer and a consumer only contend
/// with each other when they are racing their own kind. Operations on an empty queue report
/// [`EmptyError`] rather than blocking or panicking.
///
/// Ordering between enqueues (or dequeues) that race from different threads is whichever order
/// they acquire the lock in. No fairness is promised.
pub struct SafeQueue<T> {
    chain: Chain<T>,
}

impl<T> SafeQueue<T> {
    /// Construct empty
    pub fn new() -> Self {
        SafeQueue { chain: Chain::new() }
    }

    /// Construct holding the given values, first value at the front
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let queue = SafeQueue::new();
        for value in values {
            queue.enqueue(value);
        }
        queue
    }

    /// Push a value to the back
    pub fn enqueue(&self, value: T) {
        if self.chain.push(value, None).is_err() {
            unreachable!("unbounded push rejected");
        }
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

    /// Drop all queued values
    ///
    /// Returns how many values were dropped, or errors if there were none.
    pub fn clear(&self) -> Result<usize, EmptyError> {
        match self.chain.clear() {
            0 => Err(EmptyError),
            n => {
                trace!(count = n, "cleared queue");
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

impl<T> Default for SafeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SafeQueue<T> {
    fn clone(&self) -> Self {
        SafeQueue::from_values(self.to_vec())
    }
}

impl<T: Debug> Debug for SafeQueue<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.chain, f)
    }
}

impl<T> FromIterator<T> for SafeQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SafeQueue::from_values(iter)
    }
}

impl<T> Extend<T> for SafeQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.enqueue(value);
        }
    }
}

impl<'a, T: Clone> IntoIterator for &'a SafeQueue<T> {
    type Item = T;
    type IntoIter = SnapshotIter<T>;

    fn into_iter(self) -> SnapshotIter<T> {
        self.iter()
    }
}
