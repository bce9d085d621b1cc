// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Submit
//!
//! `spec.md` §4.2. `queue_position` and `estimated_start_time` are carried
//! over from `original_source/challenge-5`'s `get_queue_position` /
//! `estimate_start_time` — the distilled spec dropped them, but they're
//! cheap to compute from the queue's own state and useful to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scheduler_domain::{Payload, Priority, TaskId};

/// Caller-supplied parameters for a new task. Omitted `max_retries` /
/// `timeout_seconds` fall back to `SchedulerConfig` defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub priority: Priority,
    pub max_retries: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub task_id: TaskId,
    /// Zero-indexed position among currently waiting tasks.
    pub queue_position: usize,
    /// Heuristic estimate: `queue_position * 30s / total_workers`, matching
    /// the reference implementation's `avg_time = 30` constant.
    pub estimated_start_time: DateTime<Utc>,
}
