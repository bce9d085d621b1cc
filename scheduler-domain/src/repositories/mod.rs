// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Repositories
//!
//! Abstract contracts the domain depends on but does not implement. The
//! scheduler core only needs [`AuditSink`]; its reference sqlite
//! implementation lives in `scheduler::infrastructure::audit`.

pub mod audit_sink;

pub use audit_sink::{AuditSink, NullAuditSink};
