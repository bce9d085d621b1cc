// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler Configuration
//!
//! Layered configuration built on the `config` crate: built-in defaults,
//! then an optional TOML file, then `SCHEDULER_*` environment variables,
//! each layer overriding the previous one.
//!
//! The in-flight bound is `process_workers + thread_workers` (`spec.md` §9's
//! Open Question is resolved as two independent pools, default `W` each, for
//! a default total of `2W` in flight — see `SPEC_FULL.md` §4).

use serde::{Deserialize, Serialize};

use scheduler_domain::SchedulerError;

/// Resolved scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Bounded queue capacity `Q` (`spec.md` §2.1). `submit` rejects with
    /// `QueueFull` once this many tasks are waiting or in flight.
    pub queue_capacity: usize,

    /// OS-process worker count for CPU-bound task kinds.
    pub process_workers: usize,

    /// OS-thread worker count for I/O-bound task kinds.
    pub thread_workers: usize,

    /// Default `max_retries` applied when `submit` omits it.
    pub default_max_retries: u32,

    /// Default `timeout_seconds` applied when `submit` omits it.
    pub default_timeout_seconds: u64,

    /// Path to the sqlite database backing the audit sink. `None` disables
    /// persistence and falls back to `NullAuditSink`.
    pub audit_db_path: Option<String>,

    /// How often the dispatcher prunes terminal records older than
    /// `terminal_retention_seconds` from the in-memory store and, if an
    /// audit sink is configured, from durable storage.
    pub cleanup_interval_seconds: u64,

    /// Terminal records older than this are eligible for cleanup.
    pub terminal_retention_seconds: u64,

    /// Tracing filter directive, e.g. `"info"` or `"scheduler=debug"`.
    pub log_level: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1_000,
            process_workers: 4,
            thread_workers: 4,
            default_max_retries: 3,
            default_timeout_seconds: 30,
            audit_db_path: None,
            cleanup_interval_seconds: 300,
            terminal_retention_seconds: 3_600,
            log_level: "info".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Total worker slots across both executors — the in-flight bound.
    pub fn total_workers(&self) -> usize {
        self.process_workers + self.thread_workers
    }

    /// Loads configuration by layering built-in defaults, an optional TOML
    /// file at `config_path`, and `SCHEDULER_*` environment variables, in
    /// that order of increasing precedence.
    pub fn load(config_path: Option<&str>) -> Result<Self, SchedulerError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default()).map_err(
            |e| SchedulerError::internal(format!("failed to seed config defaults: {e}")),
        )?);

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(config::Environment::with_prefix("SCHEDULER").separator("__"));

        let resolved = builder
            .build()
            .map_err(|e| SchedulerError::internal(format!("failed to build configuration: {e}")))?;

        resolved
            .try_deserialize()
            .map_err(|e| SchedulerError::internal(format!("failed to deserialize configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_2w_in_flight_bound() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.process_workers, cfg.thread_workers);
        assert_eq!(cfg.total_workers(), cfg.process_workers + cfg.thread_workers);
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let cfg = SchedulerConfig::load(None).unwrap();
        assert_eq!(cfg.queue_capacity, 1_000);
    }
}
