// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler
//!
//! A distributed task scheduler: bounded priority queue, a hybrid
//! process/thread worker pool, retry and cancellation semantics, metrics,
//! and a durable task audit sink, fronted by a single cooperative
//! dispatcher loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                Presentation Layer                   │
//! │  SchedulerHandle (submit/status/cancel/stats/health) │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │                Application Layer                    │
//! │  PriorityQueue, Dispatcher, use_cases DTOs           │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │               Infrastructure Layer                  │
//! │  config, logging, metrics, audit, worker_pool        │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │              scheduler-domain (Domain)               │
//! │  Task, value objects, SchedulerError, AuditSink,     │
//! │  TaskRegistry                                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scheduler::presentation::SchedulerHandle;
//! use scheduler::infrastructure::config::SchedulerConfig;
//! use scheduler_domain::{default_registry, NullAuditSink};
//!
//! # async fn run() -> Result<(), scheduler_domain::SchedulerError> {
//! let (handle, _metrics) = SchedulerHandle::start(
//!     SchedulerConfig::default(),
//!     Arc::new(default_registry()),
//!     Arc::new(NullAuditSink),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use presentation::SchedulerHandle;
