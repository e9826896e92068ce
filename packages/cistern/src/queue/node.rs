// linked cells of a queue.

use std::{
    cell::UnsafeCell,
    ptr::{self, NonNull},
    sync::atomic::{
        Ordering::{Acquire, Release},
        AtomicPtr,
    },
};


// heap allocation for a node.
//
// - value is some iff the node holds a queued element. the sentinel at the front of a chain
//   holds none, and an element's node becomes the sentinel once its value is taken.
// - value may only be accessed by whoever holds the front lock of the chain the node is linked
//   into, or by the enqueuer before the node is linked.
// - next may be written by the holder of the back lock (when the node is the back) and read by
//   the holder of the front lock concurrently, hence atomic.
pub(crate) struct Node<T> {
    value: UnsafeCell<Option<T>>,
    next: AtomicPtr<Node<T>>,
}

impl<T> Node<T> {
    // heap-allocate an unlinked node.
    pub(crate) fn alloc(value: Option<T>) -> NonNull<Node<T>> {
        let node = Box::new(Node {
            value: UnsafeCell::new(value),
            next: AtomicPtr::new(ptr::null_mut()),
        });
        // safety: Box::into_raw never returns null
        unsafe { NonNull::new_unchecked(Box::into_raw(node)) }
    }

    // deallocate a node, dropping its value if it still has one.
    //
    // UB if:
    //
    // - the node was not created by `alloc` or was already freed.
    // - any other pointer to it is dereferenced afterwards.
    pub(crate) unsafe fn free(node: NonNull<Node<T>>) {
        drop(Box::from_raw(node.as_ptr()));
    }

    // deallocate every node of a detached chain, front to back. returns how many of them held a
    // value.
    //
    // UB if the chain is still reachable from a queue, or under the same conditions as `free`.
    pub(crate) unsafe fn free_chain(first: Option<NonNull<Node<T>>>) -> usize {
        let mut freed = 0;
        let mut next = first;
        while let Some(curr) = next {
            next = Node::next(curr);
            if (*curr.as_ptr()).value.get_mut().is_some() {
                freed += 1;
            }
            Node::free(curr);
        }
        freed
    }

    // load the node after this one, if linked.
    pub(crate) unsafe fn next(node: NonNull<Node<T>>) -> Option<NonNull<Node<T>>> {
        NonNull::new((*node.as_ptr()).next.load(Acquire))
    }

    // link `next` after `node`. publishes `next`'s value to whoever later loads it.
    //
    // UB if `node` already has a successor, or if the caller doesn't hold the back lock.
    pub(crate) unsafe fn link(node: NonNull<Node<T>>, next: NonNull<Node<T>>) {
        debug_assert!(Node::next(node).is_none(), "UB");
        (*node.as_ptr()).next.store(next.as_ptr(), Release);
    }

    // cut the chain after `node`.
    //
    // UB if the caller doesn't hold both the front lock and the back lock.
    pub(crate) unsafe fn unlink_next(node: NonNull<Node<T>>) {
        (*node.as_ptr()).next.store(ptr::null_mut(), Release);
    }

    // take the node's value, turning it into a valueless node.
    //
    // UB if the caller doesn't hold the front lock.
    pub(crate) unsafe fn take_value(node: NonNull<Node<T>>) -> Option<T> {
        (*(*node.as_ptr()).value.get()).take()
    }

    // borrow the node's value.
    //
    // UB if the caller doesn't hold the front lock for all of 'a.
    pub(crate) unsafe fn value<'a>(node: NonNull<Node<T>>) -> Option<&'a T> {
        (*(*node.as_ptr()).value.get()).as_ref()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn free_chain_drops_values() {
        let elem = Arc::new(());
        unsafe {
            let sentinel = Node::alloc(None);
            let mut back = sentinel;
            for _ in 0..5 {
                let node = Node::alloc(Some(Arc::clone(&elem)));
                Node::link(back, node);
                back = node;
            }
            assert_eq!(Arc::strong_count(&elem), 6);
            assert_eq!(Node::free_chain(Some(sentinel)), 5);
        }
        assert_eq!(Arc::strong_count(&elem), 1);
    }

    #[test]
    fn take_value_leaves_valueless_node() {
        unsafe {
            let node = Node::alloc(Some(7));
            assert_eq!(Node::value(node), Some(&7));
            assert_eq!(Node::take_value(node), Some(7));
            assert_eq!(Node::value(node), None);
            assert_eq!(Node::take_value(node), None);
            Node::free(node);
        }
    }
}
