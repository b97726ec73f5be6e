//! Testing utilities.
//!
//! Helpers for asserting on middleware order and handler invocation without
//! a network transport.
//!
//! - [`Journal`]: a shared, ordered list of labels
//! - [`RecordingMiddleware`]: records `label>` on the way in and `<label` on
//!   the way out
//! - [`recording_handler`]: a handler that records its label and answers
//!   with it
//!
//! ```rust
//! use trellis_core::Method;
//! use trellis_std::{Router, testing::{Journal, RecordingMiddleware, recording_handler}};
//!
//! # async fn demo() -> Result<(), trellis_core::RouteError> {
//! let journal = Journal::new();
//! let mut router = Router::new();
//! router.use_middleware(RecordingMiddleware::new("outer", &journal));
//! router.get("/", recording_handler("h", &journal))?;
//!
//! router.call(Method::GET, "/").await;
//! assert_eq!(journal.entries(), ["outer>", "h", "<outer"]);
//! # Ok(())
//! # }
//! # futures::executor::block_on(demo()).unwrap();
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

/// A shared, append-only record of what ran, in order.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    /// Snapshot of the entries recorded so far.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Middleware that records entering and leaving into a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    label: String,
    journal: Journal,
}

impl RecordingMiddleware {
    /// Record under `label` into `journal`.
    pub fn new(label: impl Into<String>, journal: &Journal) -> Self {
        Self {
            label: label.into(),
            journal: journal.clone(),
        }
    }
}

impl Middleware for RecordingMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(Recording {
            label: self.label.clone(),
            journal: self.journal.clone(),
            next,
        })
    }
}

struct Recording {
    label: String,
    journal: Journal,
    next: BoxHandler,
}

impl Handler for Recording {
    async fn call(&self, ctx: Context) -> Response {
        self.journal.record(format!("{}>", self.label));
        let response = self.next.call(ctx).await;
        self.journal.record(format!("<{}", self.label));
        response
    }
}

/// A handler that records `label` and responds with it as the body.
pub fn recording_handler(label: impl Into<String>, journal: &Journal) -> BoxHandler {
    let label = label.into();
    let journal = journal.clone();
    BoxHandler::new(move |_ctx: Context| {
        let label = label.clone();
        let journal = journal.clone();
        async move {
            journal.record(label.clone());
            label
        }
    })
}
