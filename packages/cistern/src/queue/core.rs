// two-lock linked chain. the public queue types are thin wrappers around this.

use super::node::Node;
use std::{
    fmt::{self, Formatter, Debug},
    marker::PhantomData,
    ptr::NonNull,
    sync::{
        atomic::{
            Ordering::{Acquire, AcqRel},
            AtomicUsize,
        },
        Mutex,
    },
};


// linked chain of nodes with split locking.
//
// the chain always begins with a valueless sentinel node. the element at the front of the queue is
// the sentinel's successor, so the queue is empty iff the sentinel has no successor. this lets
// enqueue touch only the back and dequeue touch only the front, even at the empty/non-empty
// boundary.
//
// locking discipline:
//
// - push holds only the back lock.
// - pop and peek hold only the front lock.
// - operations that need a stable view of the whole chain take the front lock, then the back
//   lock. nothing ever takes them in the other order.
pub(crate) struct Chain<T> {
    // front lock. guards the pointer to the sentinel, and the values of all linked nodes.
    front: Mutex<NonNull<Node<T>>>,
    // back lock. guards the pointer to the last linked node (the sentinel iff empty).
    back: Mutex<NonNull<Node<T>>>,
    // element count. incremented under the back lock before a node is linked, decremented under
    // the front lock after a node is detached. thus it never underflows, it is never less than the
    // number of linked elements, and it is exact whenever no push or pop is mid-flight.
    len: AtomicUsize,
    // the chain owns its nodes and their values.
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> Chain<T> {
    // construct empty chain.
    pub(crate) fn new() -> Self {
        let sentinel = Node::alloc(None);
        Chain {
            front: Mutex::new(sentinel),
            back: Mutex::new(sentinel),
            len: AtomicUsize::new(0),
            _owns: PhantomData,
        }
    }

    // current element count.
    pub(crate) fn len(&self) -> usize {
        self.len.load(Acquire)
    }

    // link value to the back. if a bound is given and the chain already holds that many elements,
    // return the value back instead. the check and the increment happen under the back lock, which
    // serializes every increment, so racing pushes cannot overshoot the bound.
    pub(crate) fn push(&self, value: T, bound: Option<usize>) -> Result<(), T> {
        let mut back = self.back.lock().unwrap();
        if bound.is_some_and(|n| self.len.load(Acquire) >= n) {
            return Err(value);
        }
        let node = Node::alloc(Some(value));
        self.len.fetch_add(1, AcqRel);
        // safety: we hold the back lock, and *back is the last linked node, so it has no successor
        unsafe { Node::link(*back, node); }
        *back = node;
        Ok(())
    }

    // detach the front element and return its value.
    pub(crate) fn pop(&self) -> Option<T> {
        let mut front = self.front.lock().unwrap();
        let sentinel = *front;
        unsafe {
            // safety: we hold the front lock
            let next = Node::next(sentinel)?;
            let value = Node::take_value(next);
            debug_assert!(value.is_some(), "linked node past the sentinel without a value");

            // next becomes the new sentinel
            *front = next;
            self.len.fetch_sub(1, AcqRel);
            drop(front);

            // safety: the old sentinel is unreachable now. the back lock holder can't be pointing
            // at it, because it had a successor, and pushes never revisit a node once they link
            // past it.
            Node::free(sentinel);
            value
        }
    }

    // clone the front element.
    pub(crate) fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        let front = self.front.lock().unwrap();
        unsafe {
            // safety: we hold the front lock until we're done with the reference
            let next = Node::next(*front)?;
            Node::value(next).cloned()
        }
    }

    // visit every element front to back while holding both locks, so that the elements visited
    // are exactly those present at one instant.
    pub(crate) fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let front = self.front.lock().unwrap();
        let back = self.back.lock().unwrap();
        let mut curr = *front;
        unsafe {
            // safety: we hold both locks, so the chain between them is frozen
            while curr != *back {
                let Some(next) = Node::next(curr) else { break };
                if let Some(value) = Node::value(next) {
                    f(value);
                }
                curr = next;
            }
        }
    }

    // clone all elements front to back, at one instant.
    pub(crate) fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut elems = Vec::with_capacity(self.len());
        self.for_each(|value| elems.push(value.clone()));
        elems
    }

    // detach every element and return them front to back.
    pub(crate) fn drain(&self) -> Vec<T> {
        let Some(first) = self.detach_all() else { return Vec::new() };
        let mut elems = Vec::new();
        let mut next = Some(first);
        unsafe {
            // safety: the detached chain is only reachable from here
            while let Some(curr) = next {
                next = Node::next(curr);
                elems.extend(Node::take_value(curr));
                Node::free(curr);
            }
        }
        elems
    }

    // drop every element. returns how many were dropped.
    pub(crate) fn clear(&self) -> usize {
        let first = self.detach_all();
        // safety: the detached chain is only reachable from here
        unsafe { Node::free_chain(first) }
    }

    // cut all nodes after the sentinel off the chain and return the first of them. values are
    // dropped or taken by the caller after the locks are released.
    fn detach_all(&self) -> Option<NonNull<Node<T>>> {
        let front = self.front.lock().unwrap();
        let mut back = self.back.lock().unwrap();
        unsafe {
            // safety: we hold both locks
            let first = Node::next(*front)?;
            let mut n = 0;
            let mut curr = Some(first);
            while let Some(node) = curr {
                n += 1;
                curr = Node::next(node);
            }
            Node::unlink_next(*front);
            *back = *front;
            // no push or pop is mid-flight while we hold both locks
            debug_assert_eq!(self.len.load(Acquire), n);
            self.len.fetch_sub(n, AcqRel);
            Some(first)
        }
    }
}

impl<T: Debug> Debug for Chain<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut f = f.debug_list();
        self.for_each(|value| {
            f.entry(value);
        });
        f.finish()
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let sentinel = *self.front.get_mut().unwrap_or_else(|e| e.into_inner());
        // safety: we have exclusive access, and the chain is never touched again
        unsafe { Node::free_chain(Some(sentinel)); }
    }
}

// safety: values are moved in and out of the chain on whatever thread calls push and pop, and are
// only ever borrowed by one thread at a time (under the front lock).
unsafe impl<T: Send> Send for Chain<T> {}
unsafe impl<T: Send> Sync for Chain<T> {}
