//! Retry policy: what to do with a failed handler attempt.
//!
//! Transient failures re-enter the pending pool with no delay and no
//! backoff; they are reclaimed like any other pending job. Permanent
//! failures go terminal immediately. A cancellation observed mid-flight is
//! neither: the terminal status is already on the record and must not be
//! touched.

use crate::error::WorkerError;

/// Dispatcher action after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Leave the record alone (cancelled underneath the handler).
    Ignore,
    /// Terminal failure, no further attempts.
    FailTerminal,
    /// Requeue through the store's retry bookkeeping.
    Requeue,
}

/// Classify a handler failure.
pub fn classify(error: &WorkerError) -> RetryAction {
    match error {
        WorkerError::Cancelled => RetryAction::Ignore,
        e if e.is_permanent() => RetryAction::FailTerminal,
        _ => RetryAction::Requeue,
    }
}
