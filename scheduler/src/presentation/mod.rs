// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation Layer
//!
//! [`SchedulerHandle`] is the one control surface a host (the CLI binary,
//! or an embedding application) talks to. It hides the dispatcher's
//! command-channel plumbing behind plain async methods.

pub mod scheduler_handle;

pub use scheduler_handle::SchedulerHandle;
