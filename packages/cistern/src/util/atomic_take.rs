//! Take-once cell.

use std::{
    mem::MaybeUninit,
    sync::atomic::{
        Ordering::{Acquire, AcqRel},
        AtomicBool,
    },
};

/// Like an atomic `Option<T>` whose value can be `take`n once.
///
/// Exactly one caller of `take` ever receives the value, no matter how many threads race for it.
pub(crate) struct AtomicTake<T> {
    // val is initialized if is_some is true. the thread that transitions it from true to false
    // claims the right to read it and take ownership of it.
    is_some: AtomicBool,
    val: MaybeUninit<T>,
}

impl<T> AtomicTake<T> {
    /// Construct with a value.
    pub(crate) const fn some(val: T) -> Self {
        AtomicTake {
            is_some: AtomicBool::new(true),
            val: MaybeUninit::new(val),
        }
    }

    /// Try to atomically take the value.
    pub(crate) fn take(&self) -> Option<T> {
        if self.is_some.swap(false, AcqRel) {
            Some(unsafe { self.val.as_ptr().read() })
        } else {
            None
        }
    }

    /// Whether the value has not been taken yet.
    pub(crate) fn is_some(&self) -> bool {
        self.is_some.load(Acquire)
    }
}

impl<T> Drop for AtomicTake<T> {
    fn drop(&mut self) {
        // make sure the value gets dropped if not yet taken
        drop(self.take());
    }
}

// safety: no reference to the value is ever handed out, it can only be moved out, by one thread.
unsafe impl<T: Send> Sync for AtomicTake<T> {}


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
    fn only_one_taker_wins() {
        const THREADS: usize = 8;

        let cell = Arc::new(AtomicTake::some(String::from("once")));
        let winners = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));
        let joins = (0..THREADS)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let winners = Arc::clone(&winners);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if let Some(val) = cell.take() {
                        assert_eq!(val, "once");
                        winners.fetch_add(1, Relaxed);
                    }
                })
            })
            .collect::<Vec<_>>();
        for join in joins {
            join.join().unwrap();
        }
        assert_eq!(winners.load(Relaxed), 1);
        assert!(!cell.is_some());
    }

    #[test]
    fn untaken_value_is_dropped() {
        let val = Arc::new(());
        drop(AtomicTake::some(Arc::clone(&val)));
        assert_eq!(Arc::strong_count(&val), 1);
    }
}
