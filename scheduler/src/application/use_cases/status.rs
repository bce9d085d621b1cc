// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Status
//!
//! `spec.md` §4.3: returns the full task record. `NotFound` covers both an
//! unknown id and a terminal record evicted past `terminal_retention_seconds`
//! with no audit sink configured to fall back on.

use scheduler_domain::Task;

pub type StatusResponse = Task;
