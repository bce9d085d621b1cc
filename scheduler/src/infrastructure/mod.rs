// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Adapters for concerns the domain depends on abstractly: configuration
//! loading, tracing setup, metrics export, durable task audit, and the
//! hybrid process/thread worker pool that actually runs task handlers.

pub mod audit;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod worker_pool;

pub use audit::SqliteAuditSink;
pub use config::SchedulerConfig;
pub use metrics::MetricsRegistry;
