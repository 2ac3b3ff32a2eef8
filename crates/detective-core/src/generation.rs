//! # Request Generations
//!
//! Guards async fetches against stale responses.
//!
//! Each fetch takes a [`Generation`] ticket from its [`RequestTracker`]
//! before it starts. When the response arrives it is handed back together
//! with the ticket; only the newest ticket's response is applied. Responses
//! of superseded fetches are dropped.
//!
//! The tracker also carries the loading flag and the last error of its
//! resource, so callers can render "loading" and "failed" states without
//! the error ever escaping as a panic.

/// Sequence number of one async request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Loading flag, last error and generation counter for one resource.
#[derive(Debug)]
pub struct RequestTracker<E> {
    latest: u64,
    in_flight: bool,
    last_error: Option<E>,
}

impl<E> Default for RequestTracker<E> {
    fn default() -> Self {
        Self {
            latest: 0,
            in_flight: false,
            last_error: None,
        }
    }
}

impl<E> RequestTracker<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any earlier outstanding request becomes stale.
    pub fn begin(&mut self) -> Generation {
        self.latest = self.latest.saturating_add(1);
        self.in_flight = true;
        self.last_error = None;
        Generation(self.latest)
    }

    /// Whether `generation` is the newest request.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    /// Whether the newest request is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Finish a request.
    ///
    /// Returns the value only when `generation` is current and the request
    /// succeeded. A current failure is recorded as the last error; a stale
    /// result is dropped without touching the tracker.
    pub fn complete<T>(&mut self, generation: Generation, result: Result<T, E>) -> Option<T> {
        if !self.is_current(generation) {
            tracing::debug!(
                stale = generation.0,
                latest = self.latest,
                "discarding stale response"
            );
            return None;
        }

        self.in_flight = false;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    /// Make every outstanding request stale and drop the loading flag.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.saturating_add(1);
        self.in_flight = false;
    }

    /// Last error of the newest request, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<E> {
        self.last_error.take()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
