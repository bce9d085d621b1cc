// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "task-scheduler")]
#[command(about = concat!("Distributed task scheduler v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the process-worker pool size (CPU-bound tasks)
    #[arg(long)]
    pub process_workers: Option<usize>,

    /// Override the thread-worker pool size (I/O-bound tasks)
    #[arg(long)]
    pub thread_workers: Option<usize>,

    /// SQLite path for the durable task audit sink
    #[arg(long)]
    pub audit_db: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Submit a task to the scheduler and print its id
    Submit {
        /// Registered task kind (e.g. compute, io_operation, data_processing, error_task)
        #[arg(short, long)]
        name: String,

        /// JSON payload passed to the handler
        #[arg(short, long, default_value = "{}")]
        payload: String,

        /// Priority: urgent, high, normal, low
        #[arg(long, default_value = "normal")]
        priority: String,

        /// Maximum retry attempts on failure
        #[arg(long)]
        max_retries: Option<u32>,

        /// Timeout before the task is considered hung
        #[arg(long)]
        timeout_seconds: Option<u64>,
    },

    /// Look up a task's current status by id
    Status {
        /// Task id (ULID)
        task_id: String,
    },

    /// Cancel a pending or running task by id
    Cancel {
        /// Task id (ULID)
        task_id: String,
    },

    /// Print worker pool utilization
    WorkerStats,

    /// Print scheduler throughput and timing statistics
    SchedulerStats,

    /// Print dispatcher and executor health
    Health,

    /// Run the bundled lazy-pipeline demo over stdin lines
    PipelineDemo {
        /// Maximum number of items to draw from the pipeline
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Hidden worker-process entry point
    ///
    /// Invoked by the process executor's self-re-exec; reads one JSON
    /// `WorkerRequest` line from stdin and writes one JSON `WorkerResponse`
    /// line to stdout. Not intended for interactive use.
    #[command(hide = true, name = "__worker-exec")]
    WorkerExec,
}

/// Parse CLI arguments
///
/// # Panics
///
/// Clap exits the process with a usage message if parsing fails.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
