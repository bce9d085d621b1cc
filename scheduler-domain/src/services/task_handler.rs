// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Handler & Registry
//!
//! The task kind registry maps `name -> (handler, classification)`
//! (`spec.md` §4.1). Handlers are synchronous, pure functions of a
//! [`Payload`] — the worker pool is responsible for running them on the
//! right executor (OS process or OS thread) and for timing them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value_objects::Payload;
use crate::SchedulerError;

/// Routing decision for a task kind: which executor runs it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Classification {
    CpuBound,
    IoOrOther,
}

/// A registered task kind's business logic. Implementations must be pure
/// functions of their input — no interior state, no I/O beyond what the
/// payload and return value describe — since CPU-bound handlers run in a
/// freshly spawned OS process with no shared memory.
pub trait TaskHandler: Send + Sync {
    fn execute(&self, payload: &Payload) -> Result<Payload, SchedulerError>;
}

impl<F> TaskHandler for F
where
    F: Fn(&Payload) -> Result<Payload, SchedulerError> + Send + Sync,
{
    fn execute(&self, payload: &Payload) -> Result<Payload, SchedulerError> {
        self(payload)
    }
}

/// The fixed-but-extensible mapping from task `name` to handler and
/// classification (`spec.md` §4.1). A kind not in the registry fails a
/// task with `unknown task kind`.
#[derive(Clone)]
pub struct TaskRegistry {
    entries: HashMap<String, (Arc<dyn TaskHandler>, Classification)>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, classification: Classification, handler: Arc<dyn TaskHandler>) {
        self.entries.insert(name.into(), (handler, classification));
    }

    pub fn classify(&self, name: &str) -> Option<Classification> {
        self.entries.get(name).map(|(_, c)| *c)
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.entries.get(name).map(|(h, _)| h.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Executes the named handler, returning the `unknown task kind` error
    /// from `spec.md` §4.1 for anything not registered.
    pub fn execute(&self, name: &str, payload: &Payload) -> Result<Payload, SchedulerError> {
        match self.entries.get(name) {
            Some((handler, _)) => handler.execute(payload),
            None => Err(SchedulerError::HandlerError(format!("unknown task kind: {name}"))),
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unregistered_kind_fails_with_unknown_task_kind() {
        let registry = TaskRegistry::new();
        let err = registry.execute("nonexistent", &Payload::empty()).unwrap_err();
        assert!(matches!(err, SchedulerError::HandlerError(msg) if msg.contains("unknown task kind")));
    }

    #[test]
    fn registered_closure_handler_runs() {
        let mut registry = TaskRegistry::new();
        registry.register(
            "double",
            Classification::IoOrOther,
            Arc::new(|p: &Payload| {
                let n = p.get_u64("n", 0);
                Ok(Payload::from_value(json!({ "doubled": n * 2 })))
            }),
        );
        let result = registry.execute("double", &Payload::from_value(json!({"n": 21}))).unwrap();
        assert_eq!(result.get_u64("doubled", 0), 42);
        assert_eq!(registry.classify("double"), Some(Classification::IoOrOther));
    }
}
