//! Drop guard.

/// Runs a closure when dropped, including when dropped by unwinding or by never being run.
///
/// Moving one of these into a closure handed to another thread ties the callback to whatever
/// happens to that closure: it runs when the thread finishes, when it panics, or when spawning
/// the thread fails and the closure is dropped unrun.
pub(crate) struct ExitOnDrop<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> ExitOnDrop<F> {
    /// Wrap a callback.
    pub(crate) fn new(f: F) -> Self {
        ExitOnDrop(Some(f))
    }
}

impl<F: FnOnce()> Drop for ExitOnDrop<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}
