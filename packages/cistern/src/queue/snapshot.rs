// iterator over a point-in-time copy of a queue.

use std::{
    fmt::{self, Formatter, Debug},
    iter::FusedIterator,
    sync::Arc,
};


/// Restartable iterator over the elements a queue held when the iterator was created
///
/// The snapshot is private: mutating the queue afterwards does not affect it, and it is not
/// itself shared with any other thread. Elements are cloned out of the snapshot one at a time as
/// the iterator advances. Cloning the iterator creates an independent cursor over the same
/// snapshot.
pub struct SnapshotIter<T> {
    elems: Arc<[T]>,
    // index of the next element to yield.
    next: usize,
}

impl<T> SnapshotIter<T> {
    pub(crate) fn new(elems: Vec<T>) -> Self {
        SnapshotIter { elems: elems.into(), next: 0 }
    }

    /// Restart iteration from the front of the snapshot
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// All elements of the snapshot, front to back, regardless of how far iteration has advanced
    pub fn as_slice(&self) -> &[T] {
        &self.elems
    }
}

impl<T: Clone> Iterator for SnapshotIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let elem = self.elems.get(self.next)?.clone();
        self.next += 1;
        Some(elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.elems.len() - self.next;
        (n, Some(n))
    }
}

impl<T: Clone> ExactSizeIterator for SnapshotIter<T> {}

impl<T: Clone> FusedIterator for SnapshotIter<T> {}

impl<T> Clone for SnapshotIter<T> {
    fn clone(&self) -> Self {
        SnapshotIter { elems: Arc::clone(&self.elems), next: self.next }
    }
}

impl<T: Debug> Debug for SnapshotIter<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(&self.elems[self.next..]).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_restarts() {
        let mut iter = SnapshotIter::new(vec![1, 2, 3]);
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.by_ref().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(iter.next(), None);
        iter.rewind();
        assert_eq!(iter.collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn clones_are_independent_cursors() {
        let mut a = SnapshotIter::new(vec!["x", "y"]);
        a.next();
        let mut b = a.clone();
        assert_eq!(b.next(), Some("y"));
        assert_eq!(a.as_slice(), &["x", "y"]);
        assert_eq!(a.next(), Some("y"));
    }
}
