// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # `task-scheduler` binary
//!
//! Wires up [`scheduler_bootstrap`]'s CLI parsing to the scheduler crate's
//! [`SchedulerHandle`], and doubles as the hidden `__worker-exec` entry
//! point that [`scheduler::infrastructure::worker_pool::ProcessExecutor`]
//! re-execs for CPU-bound task kinds.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use scheduler::infrastructure::config::SchedulerConfig;
use scheduler::infrastructure::logging::init_tracing;
use scheduler::infrastructure::{MetricsRegistry, SqliteAuditSink};
use scheduler::presentation::SchedulerHandle;
use scheduler_bootstrap::{result_to_exit_code, ValidatedCommand};
use scheduler_domain::{default_registry, AuditSink, NullAuditSink, Payload, Priority, SchedulerError, TaskId};

#[derive(Serialize)]
struct WorkerRequest<'a> {
    name: &'a str,
    payload: &'a Payload,
}

#[derive(Deserialize)]
struct WorkerResponseIn {
    name: String,
    payload: Payload,
}

#[derive(Serialize)]
struct WorkerResponse {
    ok: bool,
    payload: Option<Payload>,
    error: Option<String>,
}

fn main() -> std::process::ExitCode {
    let validated = match scheduler_bootstrap::parse_and_validate() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(64);
        }
    };

    if matches!(validated.command, ValidatedCommand::WorkerExec) {
        return run_worker_exec();
    }

    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    result_to_exit_code(runtime.block_on(run_cli(validated)))
}

/// Reads one `{"name": ..., "payload": ...}` line from stdin, executes it
/// against the reference task registry, and writes one
/// `{"ok": ..., "payload": ..., "error": ...}` line to stdout. This is the
/// child side of `ProcessExecutor::run_in_child`.
fn run_worker_exec() -> std::process::ExitCode {
    let stdin = io::stdin();
    let mut line = String::new();
    if stdin.lock().read_line(&mut line).is_err() || line.trim().is_empty() {
        return std::process::ExitCode::from(74);
    }

    let response = match serde_json::from_str::<WorkerResponseIn>(line.trim()) {
        Ok(request) => {
            let registry = default_registry();
            match registry.execute(&request.name, &request.payload) {
                Ok(payload) => WorkerResponse {
                    ok: true,
                    payload: Some(payload),
                    error: None,
                },
                Err(e) => WorkerResponse {
                    ok: false,
                    payload: None,
                    error: Some(e.to_string()),
                },
            }
        }
        Err(e) => WorkerResponse {
            ok: false,
            payload: None,
            error: Some(format!("malformed worker request: {e}")),
        },
    };

    let mut out = match serde_json::to_string(&response) {
        Ok(s) => s,
        Err(_) => return std::process::ExitCode::from(70),
    };
    out.push('\n');

    let stdout = io::stdout();
    if stdout.lock().write_all(out.as_bytes()).is_err() {
        return std::process::ExitCode::from(74);
    }

    std::process::ExitCode::from(0)
}

async fn run_cli(validated: scheduler_bootstrap::ValidatedCli) -> Result<(), SchedulerError> {
    let mut config = SchedulerConfig::load(validated.config.as_deref().and_then(|p| p.to_str()))?;
    if let Some(workers) = validated.process_workers {
        config.process_workers = workers;
    }
    if let Some(workers) = validated.thread_workers {
        config.thread_workers = workers;
    }
    if let Some(path) = validated.audit_db.as_deref().and_then(|p| p.to_str()) {
        config.audit_db_path = Some(path.to_string());
    }

    let log_level = if validated.verbose { "debug" } else { config.log_level.as_str() };
    init_tracing(log_level)?;

    let audit: Arc<dyn AuditSink> = match config.audit_db_path.as_deref() {
        Some(path) => Arc::new(SqliteAuditSink::connect(path).await?),
        None => Arc::new(NullAuditSink),
    };

    let (handle, metrics) = SchedulerHandle::start(config, Arc::new(default_registry()), audit)?;

    match validated.command {
        ValidatedCommand::Submit {
            name,
            payload,
            priority,
            max_retries,
            timeout_seconds,
        } => {
            let payload = Payload::from_json_str(&payload).map_err(|e| SchedulerError::invalid_input(format!("malformed payload: {e}")))?;
            let priority: Priority = priority.parse().map_err(SchedulerError::invalid_input)?;
            let response = handle
                .submit(scheduler::application::use_cases::SubmitRequest {
                    name,
                    payload,
                    priority,
                    max_retries,
                    timeout_seconds,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response).expect("SubmitResponse always serializes"));
        }
        ValidatedCommand::Status { task_id } => {
            let id: TaskId = task_id.parse()?;
            let status = handle.status(id).await?;
            println!("{}", serde_json::to_string_pretty(&status).expect("Task always serializes"));
        }
        ValidatedCommand::Cancel { task_id } => {
            let id: TaskId = task_id.parse()?;
            let response = handle.cancel(id).await?;
            println!("{}", serde_json::to_string_pretty(&response).expect("CancelResponse always serializes"));
        }
        ValidatedCommand::WorkerStats => {
            let stats = handle.worker_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats).expect("WorkerStats always serializes"));
        }
        ValidatedCommand::SchedulerStats => {
            let stats = handle.scheduler_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats).expect("SchedulerStats always serializes"));
        }
        ValidatedCommand::Health => {
            let health = handle.health().await;
            println!("{}", serde_json::to_string_pretty(&health).expect("HealthStatus always serializes"));
            if !health.is_healthy() {
                handle.shutdown(Duration::from_secs(5)).await;
                return Err(SchedulerError::internal("scheduler reported unhealthy state"));
            }
        }
        ValidatedCommand::PipelineDemo { limit } => {
            run_pipeline_demo(limit);
        }
        ValidatedCommand::WorkerExec => unreachable!("handled before the tokio runtime is started"),
    }

    let _ = metrics.render();
    handle.shutdown(Duration::from_secs(5)).await;
    Ok(())
}

fn run_pipeline_demo(limit: usize) {
    use lazy_pipeline::Pipeline;

    let stdin = io::stdin();
    let lines: Vec<String> = stdin.lock().lines().map_while(Result::ok).collect();

    let results: Vec<String> = Pipeline::from_iter(lines)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_uppercase())
        .take(limit)
        .to_vec();

    for line in results {
        println!("{line}");
    }
}
