//! Multi-writer error collector shared by parallel tasks.

use parking_lot::Mutex;

/// Unordered, lossless collector of errors raised by concurrent tasks.
///
/// `append` may be called from any number of threads. `drain` consumes the
/// sink, so it can only run once the caller's barrier has released every
/// borrow held by the writers.
#[derive(Debug)]
pub struct ErrorSink<E> {
    errors: Mutex<Vec<E>>,
}

impl<E> Default for ErrorSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ErrorSink<E> {
    /// Empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Record one error.
    pub fn append(&self, err: E) {
        self.errors.lock().push(err);
    }

    /// Record a batch of errors under a single lock acquisition.
    pub fn extend(&self, errs: impl IntoIterator<Item = E>) {
        self.errors.lock().extend(errs);
    }

    /// Number of errors recorded so far.
    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Take every recorded error.
    pub fn drain(self) -> Vec<E> {
        self.errors.into_inner()
    }
}
