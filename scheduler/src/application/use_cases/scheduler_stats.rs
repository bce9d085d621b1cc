// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler Stats
//!
//! `spec.md` §4.5's derived metrics: throughput, worker utilization, queue
//! utilization, average processing time.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStats {
    pub total_processed: u64,
    pub throughput: f64,
    pub avg_processing_time_ms: f64,
    pub worker_utilization: f64,
    pub queue_utilization: f64,
}
