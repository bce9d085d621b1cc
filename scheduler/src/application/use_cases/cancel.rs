// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cancel
//!
//! `spec.md` §4.4. Cancelling a `pending` task removes it from the queue
//! directly; cancelling a `running` task marks it cancelled but cannot
//! interrupt an in-flight handler (`original_source/challenge-5`'s
//! `cancel_task` has the same limitation — it only ever removes from
//! `active_tasks`, it never signals the worker).

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CancelResponse {
    pub was_pending: bool,
}
