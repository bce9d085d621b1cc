// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse()                 │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::validate()           │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration
///
/// Holds all CLI arguments after security validation. Paths are
/// canonicalized and numeric values are range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub process_workers: Option<usize>,
    pub thread_workers: Option<usize>,
    pub audit_db: Option<PathBuf>,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Submit {
        name: String,
        payload: String,
        priority: String,
        max_retries: Option<u32>,
        timeout_seconds: Option<u64>,
    },
    Status {
        task_id: String,
    },
    Cancel {
        task_id: String,
    },
    WorkerStats,
    SchedulerStats,
    Health,
    PipelineDemo {
        limit: usize,
    },
    WorkerExec,
}

/// Parse and validate CLI arguments.
///
/// 1. Parse CLI with clap
/// 2. Validate all paths with `SecureArgParser`
/// 3. Validate all numeric values
/// 4. Return `ValidatedCli` on success
///
/// # Errors
///
/// Returns `ParseError` if any validation fails.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

/// Applies security validation to parsed CLI arguments.
///
/// # Errors
///
/// Returns `ParseError` if any validation fails.
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    let audit_db = if let Some(ref path) = cli.audit_db {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    if let Some(workers) = cli.process_workers {
        if workers == 0 || workers > 128 {
            return Err(ParseError::InvalidValue {
                arg: "process-workers".to_string(),
                reason: "must be between 1 and 128".to_string(),
            });
        }
    }

    if let Some(workers) = cli.thread_workers {
        if workers == 0 || workers > 1024 {
            return Err(ParseError::InvalidValue {
                arg: "thread-workers".to_string(),
                reason: "must be between 1 and 1024".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Submit {
            name,
            payload,
            priority,
            max_retries,
            timeout_seconds,
        } => {
            SecureArgParser::validate_argument(&name)?;
            SecureArgParser::validate_argument(&payload)?;
            let priority = SecureArgParser::validate_priority(&priority)?;

            if let Some(seconds) = timeout_seconds {
                if seconds == 0 {
                    return Err(ParseError::InvalidValue {
                        arg: "timeout-seconds".to_string(),
                        reason: "must be at least 1".to_string(),
                    });
                }
            }

            ValidatedCommand::Submit {
                name,
                payload,
                priority,
                max_retries,
                timeout_seconds,
            }
        }
        Commands::Status { task_id } => {
            SecureArgParser::validate_argument(&task_id)?;
            ValidatedCommand::Status { task_id }
        }
        Commands::Cancel { task_id } => {
            SecureArgParser::validate_argument(&task_id)?;
            ValidatedCommand::Cancel { task_id }
        }
        Commands::WorkerStats => ValidatedCommand::WorkerStats,
        Commands::SchedulerStats => ValidatedCommand::SchedulerStats,
        Commands::Health => ValidatedCommand::Health,
        Commands::PipelineDemo { limit } => {
            if limit == 0 {
                return Err(ParseError::InvalidValue {
                    arg: "limit".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            ValidatedCommand::PipelineDemo { limit }
        }
        Commands::WorkerExec => ValidatedCommand::WorkerExec,
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        process_workers: cli.process_workers,
        thread_workers: cli.thread_workers,
        audit_db,
    })
}
