// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging
//!
//! Installs the process-wide `tracing` subscriber. Everything below the
//! binary entry point only emits spans and events through `tracing` macros
//! directly; this module owns the one process-wide `try_init()` call.

use tracing_subscriber::EnvFilter;

use scheduler_domain::SchedulerError;

/// Initializes the global tracing subscriber with the given filter
/// directive (e.g. `"info"` or `"scheduler=debug,scheduler_domain=info"`).
///
/// Safe to call once per process; a second call returns an error that
/// callers should treat as non-fatal (tests commonly call this repeatedly).
pub fn init_tracing(directive: &str) -> Result<(), SchedulerError> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| SchedulerError::internal(format!("invalid log filter '{directive}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| SchedulerError::internal(format!("tracing subscriber already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directive() {
        assert!(init_tracing("not a valid directive!!").is_err());
    }
}
