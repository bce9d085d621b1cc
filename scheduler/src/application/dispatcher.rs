// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dispatcher
//!
//! The scheduler's single cooperative loop (`spec.md` §5, §9): one
//! `tokio::task` owns the priority queue and all task bookkeeping
//! exclusively, so nothing here needs a lock. Callers reach it only
//! through [`Command`]s sent over an mpsc channel and answered on a
//! `oneshot` — the familiar Tokio actor pattern. Real parallelism comes
//! from the two executors the loop dispatches onto, not from the loop
//! itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Instant};

use scheduler_domain::{AuditSink, Classification, ExecutorKind, SchedulerError, Task, TaskId, TaskRegistry, TaskStatus};

use crate::application::priority_queue::PriorityQueue;
use crate::application::use_cases::{
    CancelResponse, HealthStatus, SchedulerStats, StatusResponse, SubmitRequest, SubmitResponse, WorkerStats,
};
use crate::infrastructure::config::SchedulerConfig;
use crate::infrastructure::metrics::MetricsRegistry;
use crate::infrastructure::worker_pool::{Job, JobOutcome, ProcessExecutor, ThreadExecutor};

/// Heuristic seconds-per-task used for `estimated_start_time`, matching
/// `original_source/challenge-5`'s `avg_time = 30` constant.
const AVG_TASK_SECONDS: f64 = 30.0;

pub enum Command {
    Submit {
        request: SubmitRequest,
        resp: oneshot::Sender<Result<SubmitResponse, SchedulerError>>,
    },
    Status {
        id: TaskId,
        resp: oneshot::Sender<Result<StatusResponse, SchedulerError>>,
    },
    Cancel {
        id: TaskId,
        resp: oneshot::Sender<Result<CancelResponse, SchedulerError>>,
    },
    WorkerStats {
        resp: oneshot::Sender<WorkerStats>,
    },
    SchedulerStats {
        resp: oneshot::Sender<SchedulerStats>,
    },
    Health {
        resp: oneshot::Sender<HealthStatus>,
    },
    Shutdown {
        grace: Duration,
        resp: oneshot::Sender<()>,
    },
}

struct RunningTask {
    task: Task,
    classification: Classification,
    deadline: Instant,
}

/// Owns all scheduler state. Construct with [`Dispatcher::spawn`], which
/// returns a command channel and the loop's `JoinHandle`.
pub struct Dispatcher {
    config: SchedulerConfig,
    registry: Arc<TaskRegistry>,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<MetricsRegistry>,
    thread_executor: ThreadExecutor,
    process_executor: ProcessExecutor,

    queue: PriorityQueue,
    running: HashMap<TaskId, RunningTask>,
    terminal: HashMap<TaskId, Task>,
    thread_in_flight: usize,
    process_in_flight: usize,
    total_processed: u64,
    total_failed: u64,
    shutting_down: bool,
}

impl Dispatcher {
    /// Spawns the dispatcher loop as one tokio task and returns a handle to
    /// talk to it.
    pub fn spawn(
        config: SchedulerConfig,
        registry: Arc<TaskRegistry>,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<MetricsRegistry>,
    ) -> (mpsc::Sender<Command>, tokio::task::JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(1024);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<JobOutcome>();

        let thread_executor = ThreadExecutor::start(config.thread_workers, Arc::clone(&registry), outcome_tx.clone());
        let process_executor = ProcessExecutor::start(config.process_workers);

        let queue_capacity = config.queue_capacity;
        let dispatcher = Dispatcher {
            config,
            registry,
            audit,
            metrics,
            thread_executor,
            process_executor,
            queue: PriorityQueue::new(queue_capacity),
            running: HashMap::new(),
            terminal: HashMap::new(),
            thread_in_flight: 0,
            process_in_flight: 0,
            total_processed: 0,
            total_failed: 0,
            shutting_down: false,
        };

        let handle = tokio::spawn(dispatcher.run(command_rx, outcome_rx, outcome_tx));
        (command_tx, handle)
    }

    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<Command>,
        mut outcome_rx: mpsc::UnboundedReceiver<JobOutcome>,
        outcome_tx: mpsc::UnboundedSender<JobOutcome>,
    ) {
        let mut timeout_sweep = interval(Duration::from_millis(500));
        let mut cleanup_sweep = interval(Duration::from_secs(self.config.cleanup_interval_seconds.max(1)));

        loop {
            tokio::select! {
                Some(command) = command_rx.recv() => {
                    if let Command::Shutdown { grace, resp } = command {
                        self.shutdown(grace, &mut outcome_rx).await;
                        let _ = resp.send(());
                        return;
                    }
                    self.handle_command(command, outcome_tx.clone());
                }
                Some(outcome) = outcome_rx.recv() => {
                    self.handle_outcome(outcome, outcome_tx.clone());
                }
                _ = timeout_sweep.tick() => {
                    self.sweep_timeouts();
                }
                _ = cleanup_sweep.tick() => {
                    self.sweep_terminal_retention().await;
                }
                else => break,
            }

            self.fill_idle_workers(outcome_tx.clone());
        }
    }

    fn handle_command(&mut self, command: Command, outcome_tx: mpsc::UnboundedSender<JobOutcome>) {
        match command {
            Command::Submit { request, resp } => {
                let result = self.submit(request);
                let _ = resp.send(result);
            }
            Command::Status { id, resp } => {
                let result = self.status(id);
                let _ = resp.send(result);
            }
            Command::Cancel { id, resp } => {
                let result = self.cancel(id);
                let _ = resp.send(result);
            }
            Command::WorkerStats { resp } => {
                let _ = resp.send(self.worker_stats());
            }
            Command::SchedulerStats { resp } => {
                let _ = resp.send(self.scheduler_stats());
            }
            Command::Health { resp } => {
                let _ = resp.send(self.health());
            }
            Command::Shutdown { .. } => unreachable!("handled by caller before dispatch"),
        }
        self.fill_idle_workers(outcome_tx);
    }

    fn submit(&mut self, request: SubmitRequest) -> Result<SubmitResponse, SchedulerError> {
        if self.shutting_down {
            return Err(SchedulerError::invalid_input("scheduler is shutting down"));
        }
        if !self.registry.contains(&request.name) {
            return Err(SchedulerError::invalid_input(format!("unknown task kind: {}", request.name)));
        }

        let max_retries = request.max_retries.unwrap_or(self.config.default_max_retries);
        let timeout_seconds = request.timeout_seconds.unwrap_or(self.config.default_timeout_seconds);
        let task = Task::new(request.name, request.payload, request.priority, max_retries, timeout_seconds);
        let task_id = task.id;

        self.queue.push(task)?;
        self.metrics.tasks_submitted.inc();
        self.metrics.queue_size.set(self.queue.len() as i64);

        let queue_position = self.queue.position_of(task_id).unwrap_or(0);
        let total_workers = self.config.total_workers().max(1);
        let estimated_delay_secs = (queue_position as f64 * AVG_TASK_SECONDS) / total_workers as f64;

        Ok(SubmitResponse {
            task_id,
            queue_position,
            estimated_start_time: chrono::Utc::now() + chrono::Duration::seconds(estimated_delay_secs as i64),
        })
    }

    fn status(&self, id: TaskId) -> Result<StatusResponse, SchedulerError> {
        if let Some(running) = self.running.get(&id) {
            return Ok(running.task.clone());
        }
        if let Some(task) = self.terminal.get(&id) {
            return Ok(task.clone());
        }
        Err(SchedulerError::NotFound(id.to_string()))
    }

    fn cancel(&mut self, id: TaskId) -> Result<CancelResponse, SchedulerError> {
        if let Some(mut task) = self.queue.remove(id) {
            task.transition_to(TaskStatus::Cancelled)?;
            task.mark_cancelled("cancelled before running".to_string());
            self.metrics.tasks_cancelled.inc();
            self.metrics.queue_size.set(self.queue.len() as i64);
            self.terminal.insert(id, task);
            return Ok(CancelResponse { was_pending: true });
        }

        if let Some(running) = self.running.get_mut(&id) {
            running.task.mark_cancelled("cancelled while running".to_string());
            self.metrics.tasks_cancelled.inc();
            return Ok(CancelResponse { was_pending: false });
        }

        Err(SchedulerError::NotFound(id.to_string()))
    }

    fn worker_stats(&self) -> WorkerStats {
        let total_workers = self.config.total_workers();
        let active = self.running.len().min(total_workers);
        WorkerStats {
            total_workers,
            active_workers: active,
            idle_workers: total_workers.saturating_sub(active),
            queue_size: self.queue.len(),
            completed_tasks: self.total_processed,
            failed_tasks: self.total_failed,
        }
    }

    fn scheduler_stats(&self) -> SchedulerStats {
        SchedulerStats {
            total_processed: self.total_processed,
            throughput: self.metrics.throughput(),
            avg_processing_time_ms: self.metrics.average_processing_time_ms(),
            worker_utilization: self.metrics.worker_utilization(self.config.total_workers()),
            queue_utilization: self.metrics.queue_utilization(self.config.queue_capacity),
        }
    }

    fn health(&self) -> HealthStatus {
        HealthStatus {
            running: !self.shutting_down,
            thread_executor_alive: self.thread_executor.worker_count() > 0,
            process_executor_alive: self.process_executor.worker_count() > 0,
        }
    }

    /// Pulls waiting tasks off the queue onto whichever executor their
    /// kind routes to. Called after every event so dispatch latency is
    /// bounded by one loop iteration rather than a polling interval.
    ///
    /// Unlike a fixed-size pool with a hard admission gate, this mirrors
    /// the reference `ThreadPoolExecutor`/`ProcessPoolExecutor` behavior:
    /// every waiting task is handed to its executor immediately, and the
    /// executor's own bounded channel (thread) or semaphore (process)
    /// provides the real concurrency limit. If an executor's channel is
    /// momentarily full, the task goes back on the queue and draining
    /// stops for this tick.
    fn fill_idle_workers(&mut self, outcome_tx: mpsc::UnboundedSender<JobOutcome>) {
        if self.shutting_down {
            return;
        }
        while let Some(task) = self.queue.pop() {
            let classification = self.registry.classify(&task.name).unwrap_or(Classification::IoOrOther);
            let job = Job {
                task_id: task.id,
                name: task.name.clone(),
                payload: task.payload.clone(),
            };

            if classification == Classification::IoOrOther {
                if let Err(_e) = self.thread_executor.submit(job) {
                    // Channel momentarily full; put the task back (still
                    // pending) and try again on the next event.
                    let _ = self.queue.push(task);
                    break;
                }
                self.thread_in_flight += 1;
            } else {
                self.process_in_flight += 1;
                self.process_executor.submit(job, outcome_tx.clone());
            }

            let executor_kind = match classification {
                Classification::CpuBound => ExecutorKind::Process,
                Classification::IoOrOther => ExecutorKind::Thread,
            };
            let mut task = task;
            let _ = task.mark_running(executor_kind);
            let deadline = Instant::now() + Duration::from_secs(task.timeout_seconds.max(1));

            self.metrics.active_workers.set((self.thread_in_flight + self.process_in_flight) as i64);
            self.metrics.queue_size.set(self.queue.len() as i64);
            self.running.insert(task.id, RunningTask { task, classification, deadline });
        }
    }

    fn handle_outcome(&mut self, outcome: JobOutcome, outcome_tx: mpsc::UnboundedSender<JobOutcome>) {
        let Some(running) = self.running.remove(&outcome.task_id) else {
            return;
        };
        match running.classification {
            Classification::CpuBound => self.process_in_flight = self.process_in_flight.saturating_sub(1),
            Classification::IoOrOther => self.thread_in_flight = self.thread_in_flight.saturating_sub(1),
        }
        self.metrics.active_workers.set((self.thread_in_flight + self.process_in_flight) as i64);

        let mut task = running.task;
        if task.is_terminal() {
            // Cancelled while running; outcome arrived after the fact.
            self.finish_task(task);
            return;
        }

        match outcome.outcome {
            Ok(payload) => {
                task.mark_completed(payload, outcome.processing_time_ms, outcome.worker_id);
                self.metrics.total_processing_time_ms.add(outcome.processing_time_ms);
                self.finish_task(task);
            }
            Err(err) if err.is_retryable() && task.retries_remaining() => {
                self.metrics.tasks_retried.inc();
                task.mark_failed(err.to_string());
                let _ = task.begin_retry();
                if self.queue.len() < self.queue.capacity() {
                    let _ = self.queue.push(task);
                } else {
                    task.mark_failed("retry queue is full".to_string());
                    self.finish_task(task);
                }
                self.fill_idle_workers(outcome_tx);
            }
            Err(err) => {
                task.mark_failed(err.to_string());
                self.finish_task(task);
            }
        }
    }

    fn finish_task(&mut self, task: Task) {
        match task.status {
            TaskStatus::Completed => {
                self.total_processed += 1;
                self.metrics.tasks_completed.inc();
            }
            TaskStatus::Failed => {
                self.total_failed += 1;
                self.metrics.tasks_failed.inc();
            }
            _ => {}
        }
        let audit = Arc::clone(&self.audit);
        let snapshot = task.clone();
        tokio::spawn(async move {
            if let Err(e) = audit.upsert(&snapshot).await {
                tracing::warn!(task_id = %snapshot.id, error = %e, "audit sink upsert failed");
            }
        });
        self.terminal.insert(task.id, task);
    }

    fn sweep_timeouts(&mut self) {
        let now = Instant::now();
        let overdue: Vec<TaskId> = self
            .running
            .iter()
            .filter(|(_, r)| now >= r.deadline)
            .map(|(id, _)| *id)
            .collect();

        for id in overdue {
            if let Some(mut running) = self.running.remove(&id) {
                match running.classification {
                    Classification::CpuBound => self.process_in_flight = self.process_in_flight.saturating_sub(1),
                    Classification::IoOrOther => self.thread_in_flight = self.thread_in_flight.saturating_sub(1),
                }
                let timeout_err = SchedulerError::Timeout(running.task.timeout_seconds);
                if timeout_err.is_retryable() && running.task.retries_remaining() {
                    self.metrics.tasks_retried.inc();
                    running.task.mark_failed(timeout_err.to_string());
                    let _ = running.task.begin_retry();
                    if self.queue.len() < self.queue.capacity() {
                        let _ = self.queue.push(running.task);
                    } else {
                        running.task.mark_failed("retry queue is full".to_string());
                        self.finish_task(running.task);
                    }
                } else {
                    running.task.mark_failed(timeout_err.to_string());
                    self.finish_task(running.task);
                }
            }
        }
    }

    async fn sweep_terminal_retention(&mut self) {
        let cutoff = chrono::Utc::now() - chrono::Duration::seconds(self.config.terminal_retention_seconds as i64);
        self.terminal.retain(|_, task| task.completed_at.map(|c| c > cutoff).unwrap_or(true));
        if let Err(e) = self.audit.cleanup(cutoff).await {
            tracing::warn!(error = %e, "audit sink cleanup failed");
        }
    }

    async fn shutdown(&mut self, grace: Duration, outcome_rx: &mut mpsc::UnboundedReceiver<JobOutcome>) {
        self.shutting_down = true;
        let deadline = tokio::time::Instant::now() + grace;

        while !self.running.is_empty() && tokio::time::Instant::now() < deadline {
            tokio::select! {
                Some(outcome) = outcome_rx.recv() => {
                    let outcome_tx_noop = {
                        let (tx, _rx) = mpsc::unbounded_channel();
                        tx
                    };
                    self.handle_outcome(outcome, outcome_tx_noop);
                }
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            }
        }

        for (id, running) in self.running.drain() {
            let mut task = running.task;
            task.mark_failed("scheduler shut down before task completed".to_string());
            self.terminal.insert(id, task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler_domain::{default_registry, NullAuditSink, Payload, Priority};

    fn test_config() -> SchedulerConfig {
        let mut cfg = SchedulerConfig::default();
        cfg.queue_capacity = 10;
        cfg.process_workers = 1;
        cfg.thread_workers = 1;
        cfg
    }

    #[tokio::test]
    async fn submit_then_status_reports_the_task() {
        let registry = Arc::new(default_registry());
        let audit: Arc<dyn AuditSink> = Arc::new(NullAuditSink);
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let (tx, _handle) = Dispatcher::spawn(test_config(), registry, audit, metrics);

        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(Command::Submit {
            request: SubmitRequest {
                name: "data_processing".to_string(),
                payload: Payload::from_value(serde_json::json!({"data": [1, 2]})),
                priority: Priority::Normal,
                max_retries: Some(0),
                timeout_seconds: Some(5),
            },
            resp: resp_tx,
        })
        .await
        .unwrap();
        let submitted = resp_rx.await.unwrap().unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let (status_tx, status_rx) = oneshot::channel();
        tx.send(Command::Status { id: submitted.task_id, resp: status_tx }).await.unwrap();
        let task = status_rx.await.unwrap().unwrap();
        assert_eq!(task.id, submitted.task_id);
    }

    #[tokio::test]
    async fn unknown_task_kind_is_rejected_at_submit() {
        let registry = Arc::new(default_registry());
        let audit: Arc<dyn AuditSink> = Arc::new(NullAuditSink);
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let (tx, _handle) = Dispatcher::spawn(test_config(), registry, audit, metrics);

        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send(Command::Submit {
            request: SubmitRequest {
                name: "does_not_exist".to_string(),
                payload: Payload::empty(),
                priority: Priority::Normal,
                max_retries: None,
                timeout_seconds: None,
            },
            resp: resp_tx,
        })
        .await
        .unwrap();
        assert!(resp_rx.await.unwrap().is_err());
    }
}
