// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Executor
//!
//! Runs CPU-bound task kinds in a freshly spawned OS process instead of an
//! OS thread, so a runaway or crashing handler can't take down the
//! scheduler and so CPU-heavy work gets true process-level parallelism
//! instead of contending with the async runtime's worker threads.
//!
//! There is no Rust equivalent of `ProcessPoolExecutor` that reuses warm
//! worker processes across tasks, so this re-execs the current binary with
//! the hidden `__worker-exec` subcommand (see `src/main.rs`) and ships the
//! job as one line of JSON over stdin, reading one line of JSON back from
//! stdout. Concurrency is bounded to `process_workers` by a semaphore
//! rather than a pre-spawned pool, which keeps the process lifecycle
//! simple at the cost of one process-spawn per task.
//!
//! A consequence of the process boundary: only task kinds in
//! [`scheduler_domain::default_registry`] can run here, since a
//! dynamically registered closure can't be serialized to the child. Custom
//! CPU-bound kinds must be registered in a build that also updates
//! `__worker-exec`'s dispatch.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;

use scheduler_domain::{Payload, SchedulerError};

use super::{Job, JobOutcome};

#[derive(Serialize)]
struct WorkerRequest<'a> {
    name: &'a str,
    payload: &'a Payload,
}

#[derive(Deserialize)]
struct WorkerResponse {
    ok: bool,
    payload: Option<Payload>,
    error: Option<String>,
}

pub struct ProcessExecutor {
    permits: Arc<Semaphore>,
    worker_count: usize,
}

impl ProcessExecutor {
    pub fn start(worker_count: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(worker_count.max(1))),
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Spawns a detached tokio task that runs `job` in a child process and
    /// reports the result on `outcome_tx`. Returns immediately; backpressure
    /// comes from the semaphore, not from this call blocking.
    pub fn submit(&self, job: Job, outcome_tx: UnboundedSender<JobOutcome>) {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.expect("semaphore closed");
            let started = Instant::now();
            let worker_id = format!("process-{:?}", std::thread::current().id());
            let outcome = run_in_child(&job).await;
            let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
            let _ = outcome_tx.send(JobOutcome {
                task_id: job.task_id,
                worker_id,
                processing_time_ms,
                outcome,
            });
        });
    }
}

async fn run_in_child(job: &Job) -> Result<Payload, SchedulerError> {
    let exe = std::env::current_exe()
        .map_err(|e| SchedulerError::WorkerDied(format!("cannot resolve current executable: {e}")))?;

    let mut child = Command::new(exe)
        .arg("__worker-exec")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| SchedulerError::WorkerDied(format!("failed to spawn worker process: {e}")))?;

    let request = WorkerRequest {
        name: &job.name,
        payload: &job.payload,
    };
    let mut line = serde_json::to_string(&request)
        .map_err(|e| SchedulerError::WorkerDied(format!("failed to encode worker request: {e}")))?;
    line.push('\n');

    {
        let stdin = child
            .stdin
            .as_mut()
            .ok_or_else(|| SchedulerError::WorkerDied("worker process has no stdin".to_string()))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SchedulerError::WorkerDied(format!("failed to write to worker stdin: {e}")))?;
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SchedulerError::WorkerDied("worker process has no stdout".to_string()))?;
    let mut reader = BufReader::new(stdout);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| SchedulerError::WorkerDied(format!("failed to read worker stdout: {e}")))?;

    let status = child
        .wait()
        .await
        .map_err(|e| SchedulerError::WorkerDied(format!("failed to wait on worker process: {e}")))?;

    if response_line.trim().is_empty() {
        return Err(SchedulerError::WorkerDied(format!(
            "worker process exited with {status} before reporting a result"
        )));
    }

    let response: WorkerResponse = serde_json::from_str(response_line.trim())
        .map_err(|e| SchedulerError::WorkerDied(format!("malformed worker response: {e}")))?;

    if response.ok {
        Ok(response.payload.unwrap_or_else(Payload::empty))
    } else {
        Err(SchedulerError::HandlerError(
            response.error.unwrap_or_else(|| "worker reported failure with no message".to_string()),
        ))
    }
}
