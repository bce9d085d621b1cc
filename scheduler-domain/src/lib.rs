// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler Domain
//!
//! Pure, reusable domain layer for the distributed task scheduler: the
//! [`Task`] entity, its value objects, the [`SchedulerError`] taxonomy, the
//! [`AuditSink`] repository port, and the task kind registry.
//!
//! This crate depends on nothing that ties it to a particular I/O runtime,
//! storage engine, or process model — those choices live in `scheduler`.
//! The one concession is `async-trait` on [`AuditSink`], since the sink is
//! inherently an I/O port even though the domain doesn't pick its
//! implementation.
//!
//! ## Module Map
//!
//! - [`entities`] — [`Task`], the one object in this domain with identity.
//! - [`value_objects`] — [`TaskId`], [`Priority`], [`TaskStatus`], [`Payload`].
//! - [`error`] — [`SchedulerError`] and its admission/runtime/systemic taxonomy.
//! - [`repositories`] — [`AuditSink`], the persistence port.
//! - [`services`] — the task kind registry ([`TaskRegistry`], [`TaskHandler`]).

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{ExecutorKind, Task};
pub use error::SchedulerError;
pub use repositories::{AuditSink, NullAuditSink};
pub use services::{default_registry, Classification, TaskHandler, TaskRegistry};
pub use value_objects::{GenericId, IdCategory, Payload, Priority, TaskId, TaskStatus};
