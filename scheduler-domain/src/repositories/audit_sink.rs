// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Audit Sink Repository
//!
//! The contract an external collaborator implements to persist task rows
//! (`spec.md` §6.1). The dispatcher calls this on every terminal transition
//! and MAY call it on `pending -> running` for durability; failures are
//! best-effort and never abort scheduler operation (§7, Systemic errors).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::Task;
use crate::value_objects::TaskId;
use crate::SchedulerError;

/// Persists and retrieves task snapshots. The core calls this trait but
/// does not own the storage technology behind it — see `spec.md` §6.1.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Upserts a task snapshot. Called on every terminal transition.
    async fn upsert(&self, task: &Task) -> Result<(), SchedulerError>;

    /// Looks up a persisted snapshot, used as a fallback when the
    /// in-memory terminal store has evicted the record.
    async fn lookup(&self, id: TaskId) -> Result<Option<Task>, SchedulerError>;

    /// Bulk-deletes terminal records older than the given cutoff, returning
    /// the number of rows removed.
    async fn cleanup(&self, older_than: DateTime<Utc>) -> Result<u64, SchedulerError>;
}

/// A no-op audit sink for callers that don't need persistence (tests, or a
/// host that only wants the in-memory terminal store).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn upsert(&self, _task: &Task) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn lookup(&self, _id: TaskId) -> Result<Option<Task>, SchedulerError> {
        Ok(None)
    }

    async fn cleanup(&self, _older_than: DateTime<Utc>) -> Result<u64, SchedulerError> {
        Ok(0)
    }
}
