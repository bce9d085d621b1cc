// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics
//!
//! `prometheus` counters and gauges tracking the derived metrics in
//! `spec.md` §4.5 (throughput, worker utilization, queue utilization,
//! average processing time). No HTTP endpoint is served here — that's a
//! Non-goal — [`MetricsRegistry::render`] hands a host process the
//! Prometheus text exposition format to serve however it likes.

use std::time::Instant;

use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};

use scheduler_domain::SchedulerError;

/// Process-wide metric instruments for one scheduler instance.
pub struct MetricsRegistry {
    registry: Registry,
    started_at: Instant,
    pub tasks_submitted: IntCounter,
    pub tasks_completed: IntCounter,
    pub tasks_failed: IntCounter,
    pub tasks_cancelled: IntCounter,
    pub tasks_retried: IntCounter,
    pub queue_size: IntGauge,
    pub active_workers: IntGauge,
    pub total_processing_time_ms: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, SchedulerError> {
        let registry = Registry::new();

        let tasks_submitted = IntCounter::new("scheduler_tasks_submitted_total", "Tasks accepted by submit")
            .map_err(metric_err)?;
        let tasks_completed = IntCounter::new("scheduler_tasks_completed_total", "Tasks that reached completed")
            .map_err(metric_err)?;
        let tasks_failed =
            IntCounter::new("scheduler_tasks_failed_total", "Tasks that reached failed").map_err(metric_err)?;
        let tasks_cancelled =
            IntCounter::new("scheduler_tasks_cancelled_total", "Tasks that reached cancelled").map_err(metric_err)?;
        let tasks_retried =
            IntCounter::new("scheduler_tasks_retried_total", "Retry attempts started").map_err(metric_err)?;
        let queue_size =
            IntGauge::new("scheduler_queue_size", "Tasks currently waiting or in flight").map_err(metric_err)?;
        let active_workers =
            IntGauge::new("scheduler_active_workers", "Workers currently running a task").map_err(metric_err)?;
        let total_processing_time_ms = Gauge::new(
            "scheduler_total_processing_time_ms",
            "Sum of processing_time_ms across completed tasks",
        )
        .map_err(metric_err)?;

        for metric in [
            Box::new(tasks_submitted.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(tasks_completed.clone()),
            Box::new(tasks_failed.clone()),
            Box::new(tasks_cancelled.clone()),
            Box::new(tasks_retried.clone()),
            Box::new(queue_size.clone()),
            Box::new(active_workers.clone()),
            Box::new(total_processing_time_ms.clone()),
        ] {
            registry.register(metric).map_err(metric_err)?;
        }

        Ok(Self {
            registry,
            started_at: Instant::now(),
            tasks_submitted,
            tasks_completed,
            tasks_failed,
            tasks_cancelled,
            tasks_retried,
            queue_size,
            active_workers,
            total_processing_time_ms,
        })
    }

    /// Throughput in completed tasks per second of wall-clock uptime.
    pub fn throughput(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.tasks_completed.get() as f64 / elapsed
    }

    /// Average processing time across completed tasks, in milliseconds.
    pub fn average_processing_time_ms(&self) -> f64 {
        let completed = self.tasks_completed.get();
        if completed == 0 {
            return 0.0;
        }
        self.total_processing_time_ms.get() / completed as f64
    }

    /// Worker utilization as `active / total_workers`, `spec.md` §4.5.
    pub fn worker_utilization(&self, total_workers: usize) -> f64 {
        if total_workers == 0 {
            return 0.0;
        }
        self.active_workers.get() as f64 / total_workers as f64
    }

    /// Queue utilization as `size / capacity`, `spec.md` §4.5.
    pub fn queue_utilization(&self, queue_capacity: usize) -> f64 {
        if queue_capacity == 0 {
            return 0.0;
        }
        self.queue_size.get() as f64 / queue_capacity as f64
    }

    /// Renders all registered metrics in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, SchedulerError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| SchedulerError::internal(format!("failed to encode metrics: {e}")))?;
        String::from_utf8(buffer).map_err(|e| SchedulerError::internal(format!("non-utf8 metrics output: {e}")))
    }
}

fn metric_err(e: prometheus::Error) -> SchedulerError {
    SchedulerError::internal(format!("failed to register metric: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_is_zero_with_no_completions() {
        let metrics = MetricsRegistry::new().unwrap();
        assert_eq!(metrics.throughput(), 0.0);
    }

    #[test]
    fn render_includes_registered_metric_names() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.tasks_submitted.inc();
        let text = metrics.render().unwrap();
        assert!(text.contains("scheduler_tasks_submitted_total"));
    }
}
