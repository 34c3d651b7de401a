//! Bounded retry strategy shared by the execution and card steps.

use std::ops::RangeInclusive;
use std::time::Duration;

/// What happens once every attempt has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    /// Stop without telling the user anything further.
    AbortSilently,
    /// Tell the user the whole step failed.
    ReportFailure,
}

/// An explicit, testable retry strategy: attempt budget, backoff, and what
/// to do on exhaustion.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub terminal: TerminalAction,
}

impl RetryPolicy {
    /// Submission of generated code: three tries, then give up silently.
    pub fn execution() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
            terminal: TerminalAction::AbortSilently,
        }
    }

    /// Card generation: three tries, then report the failure.
    pub fn card() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
            terminal: TerminalAction::ReportFailure,
        }
    }

    /// Drop all delays; attempt counting is unchanged.
    pub fn without_backoff(mut self) -> Self {
        self.backoff = Duration::ZERO;
        self
    }

    /// Attempt numbers, starting at 1.
    pub fn attempts(&self) -> RangeInclusive<u32> {
        1..=self.max_attempts
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Linear backoff: the n-th failed attempt waits n base intervals.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}
