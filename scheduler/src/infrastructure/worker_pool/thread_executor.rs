// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Thread Executor
//!
//! A fixed-size pool of OS threads for I/O-or-other task kinds, built on
//! `crossbeam-channel` (already part of the teacher's stack) rather than
//! `tokio::task::spawn_blocking`, since a hand-rolled pool gives an exact,
//! observable bound on concurrent handler invocations matching `thread_workers`.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{bounded, Sender};
use tokio::sync::mpsc::UnboundedSender;

use scheduler_domain::TaskRegistry;

use super::{Job, JobOutcome};

pub struct ThreadExecutor {
    job_tx: Sender<Job>,
    worker_count: usize,
}

impl ThreadExecutor {
    /// Spawns `worker_count` OS threads, each pulling jobs off a shared
    /// bounded channel and running the registered handler synchronously.
    pub fn start(worker_count: usize, registry: Arc<TaskRegistry>, outcome_tx: UnboundedSender<JobOutcome>) -> Self {
        let (job_tx, job_rx) = bounded::<Job>(worker_count.max(1) * 4);

        for index in 0..worker_count {
            let job_rx = job_rx.clone();
            let registry = Arc::clone(&registry);
            let outcome_tx = outcome_tx.clone();
            let worker_id = format!("thread-{index}");

            std::thread::Builder::new()
                .name(worker_id.clone())
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let started = Instant::now();
                        let outcome = registry.execute(&job.name, &job.payload);
                        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
                        let _ = outcome_tx.send(JobOutcome {
                            task_id: job.task_id,
                            worker_id: worker_id.clone(),
                            processing_time_ms,
                            outcome,
                        });
                    }
                })
                .expect("failed to spawn thread-executor worker");
        }

        Self { job_tx, worker_count }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Enqueues a job. Never blocks the async dispatcher for long: the
    /// channel is generously bounded relative to `worker_count` and a full
    /// channel here indicates a dispatcher bug (submitting past its own
    /// in-flight accounting), not ordinary backpressure.
    pub fn submit(&self, job: Job) -> Result<(), scheduler_domain::SchedulerError> {
        self.job_tx
            .try_send(job)
            .map_err(|e| scheduler_domain::SchedulerError::WorkerDied(format!("thread executor channel: {e}")))
    }
}
