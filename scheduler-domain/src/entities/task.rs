// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Entity
//!
//! The in-memory record of one submitted unit of work: identity, payload,
//! scheduling parameters, and the lifecycle timestamps and terminal result
//! or error that accumulate as the dispatcher drives it to completion.
//!
//! ## Invariants (`spec.md` §3.1)
//!
//! - A task transitions monotonically through `pending -> running ->
//!   (completed | failed | cancelled)`, with optional detours `failed ->
//!   retrying -> running` while `retry_count < max_retries`.
//! - Exactly one terminal transition is observable; after a terminal state
//!   the record is immutable except for audit-sink replication.
//! - `result` is populated iff the terminal status is `completed`;
//!   `error_message` iff the terminal status is `failed` or `cancelled` for
//!   a reason other than user cancellation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Payload, Priority, TaskId, TaskStatus};
use crate::SchedulerError;

/// Identifies which executor ran a task: an OS process (CPU-bound) or an OS
/// thread (I/O-bound), matching `spec.md` §3.2's classification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    Process,
    Thread,
}

impl std::fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorKind::Process => write!(f, "process"),
            ExecutorKind::Thread => write!(f, "thread"),
        }
    }
}

/// A unit of work submitted to the scheduler.
///
/// Field semantics follow `spec.md` §3.1 exactly. Transitions are validated
/// by [`Task::transition_to`]; nothing outside this module mutates `status`
/// directly, matching the dispatcher-is-sole-writer design in `spec.md` §5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub payload: Payload,
    pub priority: Priority,
    pub max_retries: u32,
    pub timeout_seconds: u64,
    pub retry_count: u32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Payload>,
    pub error_message: Option<String>,
    pub worker_id: Option<String>,
    pub executor_kind: Option<ExecutorKind>,
    pub processing_time_ms: Option<f64>,
}

impl Task {
    /// Builds a new `pending` task with no lifecycle history yet.
    pub fn new(
        name: impl Into<String>,
        payload: Payload,
        priority: Priority,
        max_retries: u32,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            payload,
            priority,
            max_retries,
            timeout_seconds,
            retry_count: 0,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error_message: None,
            worker_id: None,
            executor_kind: None,
            processing_time_ms: None,
        }
    }

    /// Validates and applies a status transition. Rejects any edge not in
    /// the graph from `spec.md` §3.1 so a caller bug can't silently corrupt
    /// a terminal record.
    pub fn transition_to(&mut self, next: TaskStatus) -> Result<(), SchedulerError> {
        if !self.status.can_transition_to(next) {
            return Err(SchedulerError::internal(format!(
                "illegal transition {} -> {} for task {}",
                self.status, next, self.id
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_running(&mut self, executor_kind: ExecutorKind) -> Result<(), SchedulerError> {
        self.transition_to(TaskStatus::Running)?;
        self.started_at = Some(Utc::now());
        self.executor_kind = Some(executor_kind);
        Ok(())
    }

    pub fn mark_completed(&mut self, result: Payload, processing_time_ms: f64, worker_id: String) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.result = Some(result);
        self.processing_time_ms = Some(processing_time_ms);
        self.worker_id = Some(worker_id);
    }

    pub fn mark_failed(&mut self, error_message: String) {
        self.status = TaskStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error_message);
    }

    pub fn mark_cancelled(&mut self, reason: String) {
        self.status = TaskStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(reason);
    }

    /// Increments the retry counter and returns to `retrying`, per the
    /// `failed -> retrying -> running` detour.
    pub fn begin_retry(&mut self) -> Result<(), SchedulerError> {
        self.transition_to(TaskStatus::Retrying)?;
        self.retry_count += 1;
        Ok(())
    }

    pub fn retries_remaining(&self) -> bool {
        self.retry_count < self.max_retries
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task() -> Task {
        Task::new("compute", Payload::empty(), Priority::Normal, 2, 30)
    }

    #[test]
    fn starts_pending_with_no_timestamps() {
        let task = new_task();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn completed_task_carries_result_not_error() {
        let mut task = new_task();
        task.mark_running(ExecutorKind::Process).unwrap();
        task.mark_completed(Payload::empty(), 1.5, "worker-1".into());
        assert!(task.is_terminal());
        assert!(task.result.is_some());
        assert!(task.error_message.is_none());
    }

    #[test]
    fn retry_then_run_again_bumps_retry_count() {
        let mut task = new_task();
        task.mark_running(ExecutorKind::Thread).unwrap();
        task.mark_failed("boom".into());
        task.begin_retry().unwrap();
        assert_eq!(task.retry_count, 1);
        task.mark_running(ExecutorKind::Thread).unwrap();
        assert_eq!(task.status, TaskStatus::Running);
    }

    #[test]
    fn rejects_illegal_transition() {
        let mut task = new_task();
        assert!(task.transition_to(TaskStatus::Completed).is_err());
    }
}
