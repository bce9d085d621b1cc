// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Scheduler Handle
//!
//! The facade in front of the dispatcher loop (`spec.md` §4). Every method
//! sends a [`Command`](crate::application::dispatcher::Command) and awaits
//! its reply; cloning a handle is cheap (it's just the sender).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use scheduler_domain::{AuditSink, SchedulerError, TaskId, TaskRegistry};

use crate::application::dispatcher::{Command, Dispatcher};
use crate::application::use_cases::{
    CancelResponse, HealthStatus, SchedulerStats, StatusResponse, SubmitRequest, SubmitResponse, WorkerStats,
};
use crate::infrastructure::config::SchedulerConfig;
use crate::infrastructure::metrics::MetricsRegistry;

#[derive(Clone)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    /// Starts the dispatcher loop and returns a handle plus its metrics
    /// registry (callers typically want the registry to serve `/metrics`
    /// on their own HTTP surface, which this crate does not provide).
    pub fn start(
        config: SchedulerConfig,
        registry: Arc<TaskRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<(Self, Arc<MetricsRegistry>), SchedulerError> {
        let metrics = Arc::new(MetricsRegistry::new()?);
        let (command_tx, _join) = Dispatcher::spawn(config, registry, audit, Arc::clone(&metrics));
        Ok((Self { command_tx }, metrics))
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, SchedulerError> {
        self.call(|resp| Command::Submit { request, resp }).await
    }

    pub async fn status(&self, id: TaskId) -> Result<StatusResponse, SchedulerError> {
        self.call(|resp| Command::Status { id, resp }).await
    }

    pub async fn cancel(&self, id: TaskId) -> Result<CancelResponse, SchedulerError> {
        self.call(|resp| Command::Cancel { id, resp }).await
    }

    pub async fn worker_stats(&self) -> WorkerStats {
        self.call_infallible(|resp| Command::WorkerStats { resp }).await
    }

    pub async fn scheduler_stats(&self) -> SchedulerStats {
        self.call_infallible(|resp| Command::SchedulerStats { resp }).await
    }

    pub async fn health(&self) -> HealthStatus {
        self.call_infallible(|resp| Command::Health { resp }).await
    }

    /// Stops accepting new submissions and waits up to `grace` for running
    /// tasks to reach a terminal state before returning.
    pub async fn shutdown(&self, grace: Duration) {
        let (resp_tx, resp_rx) = oneshot::channel();
        if self.command_tx.send(Command::Shutdown { grace, resp: resp_tx }).await.is_ok() {
            let _ = resp_rx.await;
        }
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T, SchedulerError>>) -> Command) -> Result<T, SchedulerError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.command_tx
            .send(build(resp_tx))
            .await
            .map_err(|_| SchedulerError::internal("dispatcher loop is not running"))?;
        resp_rx.await.map_err(|_| SchedulerError::internal("dispatcher dropped the response channel"))?
    }

    async fn call_infallible<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> T {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.command_tx.send(build(resp_tx)).await.expect("dispatcher loop is not running");
        resp_rx.await.expect("dispatcher dropped the response channel")
    }
}
