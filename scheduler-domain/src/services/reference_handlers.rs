// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Reference Task Handlers
//!
//! The four task kinds the scheduler ships out of the box
//! (`spec.md` §4.1), matching `compute`/`io_operation`/`data_processing`/
//! `error_task` in the original implementation exactly: same default
//! parameter values, same success/failure shapes.
//!
//! `compute` is the one CPU-bound kind; the other three run on the thread
//! executor.

use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::value_objects::Payload;
use crate::SchedulerError;

use super::task_handler::{Classification, TaskRegistry};

/// Sums `i * i` for `i` in `0..iterations`. CPU-bound by construction —
/// this is the kind the spec's worked example uses to justify a process
/// executor instead of a green-thread pool.
pub fn compute(payload: &Payload) -> Result<Payload, SchedulerError> {
    let iterations = payload.get_u64("iterations", 1_000_000);
    let result: u64 = (0..iterations).map(|i| i.wrapping_mul(i)).fold(0u64, |acc, sq| acc.wrapping_add(sq));
    Ok(Payload::from_value(json!({
        "result": result,
        "iterations": iterations,
    })))
}

/// Blocks the calling thread for `duration` seconds (default `1.0`),
/// simulating blocking I/O. Must run on the thread executor, never the
/// process executor, or it would tie up a whole OS process for a sleep.
pub fn io_operation(payload: &Payload) -> Result<Payload, SchedulerError> {
    let duration = payload.get_f64("duration", 1.0);
    thread::sleep(Duration::from_secs_f64(duration.max(0.0)));
    Ok(Payload::from_value(json!({
        "slept_for": duration,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// Doubles numeric entries and uppercases everything else, matching the
/// reference transform exactly. Rejects a non-array `data` field.
pub fn data_processing(payload: &Payload) -> Result<Payload, SchedulerError> {
    let items = payload
        .get_array("data")
        .ok_or_else(|| SchedulerError::HandlerError("Data must be a list".to_string()))?;

    let processed: Vec<serde_json::Value> = items
        .iter()
        .map(|item| match item {
            serde_json::Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    json!(f * 2.0)
                } else {
                    json!(item.to_string().to_uppercase())
                }
            }
            other => json!(other.to_string().trim_matches('"').to_uppercase()),
        })
        .collect();

    Ok(Payload::from_value(json!({
        "original_count": items.len(),
        "processed_data": processed,
    })))
}

/// Always fails, for exercising retry and failure-reporting paths.
pub fn error_task(_payload: &Payload) -> Result<Payload, SchedulerError> {
    Err(SchedulerError::HandlerError("Intentional task failure for testing".to_string()))
}

/// Builds the registry pre-populated with the four reference kinds. Hosts
/// that want additional kinds clone this and call
/// [`TaskRegistry::register`] for their own names.
pub fn default_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register("compute", Classification::CpuBound, std::sync::Arc::new(compute));
    registry.register("io_operation", Classification::IoOrOther, std::sync::Arc::new(io_operation));
    registry.register("data_processing", Classification::IoOrOther, std::sync::Arc::new(data_processing));
    registry.register("error_task", Classification::IoOrOther, std::sync::Arc::new(error_task));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_sums_squares_with_default_iterations() {
        let result = compute(&Payload::from_value(json!({"iterations": 5}))).unwrap();
        assert_eq!(result.get_u64("result", 0), 0 + 1 + 4 + 9 + 16);
    }

    #[test]
    fn data_processing_doubles_numbers_and_uppercases_strings() {
        let result = data_processing(&Payload::from_value(json!({"data": [1, "hi", 2.5]}))).unwrap();
        let processed = result.as_value().get("processed_data").unwrap().as_array().unwrap().clone();
        assert_eq!(processed[0], json!(2.0));
        assert_eq!(processed[1], json!("HI"));
        assert_eq!(processed[2], json!(5.0));
    }

    #[test]
    fn data_processing_rejects_non_list_data() {
        let err = data_processing(&Payload::from_value(json!({"data": "not a list"}))).unwrap_err();
        assert!(matches!(err, SchedulerError::HandlerError(msg) if msg == "Data must be a list"));
    }

    #[test]
    fn error_task_always_fails_with_the_reference_message() {
        let err = error_task(&Payload::empty()).unwrap_err();
        assert!(matches!(err, SchedulerError::HandlerError(msg) if msg == "Intentional task failure for testing"));
    }

    #[test]
    fn default_registry_classifies_compute_as_cpu_bound() {
        let registry = default_registry();
        assert_eq!(registry.classify("compute"), Some(Classification::CpuBound));
        assert_eq!(registry.classify("io_operation"), Some(Classification::IoOrOther));
    }
}
