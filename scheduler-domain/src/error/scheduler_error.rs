// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use thiserror::Error;

/// Domain-specific errors for the task scheduler.
///
/// Each variant maps to one of the three error categories in `spec.md` §7:
/// Admission, Runtime (per task), or Systemic.
#[derive(Error, Debug, Clone)]
pub enum SchedulerError {
    /// The priority queue was at capacity when `submit` was called.
    #[error("queue full")]
    QueueFull,

    /// Malformed `submit` input: bad priority, unknown task name, or a
    /// payload shape the named handler cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A task's handler ran and returned an application-level error.
    #[error("handler error: {0}")]
    HandlerError(String),

    /// The worker process or thread died or could not be spawned before the
    /// handler returned; always eligible for retry within budget.
    #[error("worker died: {0}")]
    WorkerDied(String),

    /// `timeout_seconds` elapsed before the task's handler returned.
    #[error("task timed out after {0}s")]
    Timeout(u64),

    /// The task was cancelled, either by the caller or by shutdown.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// The audit sink could not be reached; non-fatal, logged only.
    #[error("audit sink unavailable: {0}")]
    AuditSinkUnavailable(String),

    /// The worker pool failed to start; aborts `SchedulerHandle::start`.
    #[error("worker pool start failed: {0}")]
    WorkerPoolStartFailed(String),

    /// No task record exists for the given id.
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl SchedulerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Runtime errors subject to retry within the task's `max_retries`
    /// budget. Worker-died and handler errors both retry (`spec.md` §9
    /// leaves this undistinguished for the four reference task kinds);
    /// timeouts retry too since the dispatcher cancels and resubmits.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HandlerError(_) | Self::WorkerDied(_) | Self::Timeout(_))
    }

    /// Whether this error category belongs on the task record (Runtime) as
    /// opposed to being surfaced only to the operator (Systemic/Admission).
    pub fn is_task_runtime_error(&self) -> bool {
        matches!(
            self,
            Self::HandlerError(_) | Self::WorkerDied(_) | Self::Timeout(_) | Self::Cancelled(_)
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::QueueFull => "admission",
            Self::InvalidInput(_) => "admission",
            Self::HandlerError(_) => "runtime",
            Self::WorkerDied(_) => "runtime",
            Self::Timeout(_) => "runtime",
            Self::Cancelled(_) => "runtime",
            Self::AuditSinkUnavailable(_) => "systemic",
            Self::WorkerPoolStartFailed(_) => "systemic",
            Self::NotFound(_) => "admission",
            Self::InternalError(_) => "systemic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_died_and_handler_errors_are_retryable() {
        assert!(SchedulerError::WorkerDied("died".into()).is_retryable());
        assert!(SchedulerError::HandlerError("boom".into()).is_retryable());
        assert!(!SchedulerError::QueueFull.is_retryable());
    }

    #[test]
    fn categories_match_the_admission_runtime_systemic_taxonomy() {
        assert_eq!(SchedulerError::QueueFull.category(), "admission");
        assert_eq!(SchedulerError::Timeout(30).category(), "runtime");
        assert_eq!(SchedulerError::AuditSinkUnavailable("x".into()).category(), "systemic");
    }
}
