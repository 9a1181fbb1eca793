//! Deadline and cancellation propagation
//!
//! Every public entry point of the pipeline takes a [`FetchContext`]. Network and
//! disk operations run under [`FetchContext::run`], which aborts them as soon as
//! the deadline passes or the caller cancels, surfacing [`FetchError::Timeout`] or
//! [`FetchError::Cancelled`] rather than an HTTP error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::{FetchError, FetchResult};

/// Caller-supplied deadline and cancellation token
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl FetchContext {
    /// A context with no deadline that is never cancelled unless asked to
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Token observed by operations running under this context
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every operation running under this context (and its clones)
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `operation` until it completes, the deadline passes or the context is cancelled
    ///
    /// `url` names the resource in the resulting timeout/cancellation error.
    pub async fn run<T, F>(&self, url: &str, operation: F) -> FetchResult<T>
    where
        F: Future<Output = FetchResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled { url: url.to_string() }),
            _ = deadline => Err(FetchError::Timeout { url: url.to_string() }),
            result = operation => result,
        }
    }
}
