// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Identifier Value Object
//!
//! Opaque, time-ordered identifier for a [`crate::entities::Task`], unique
//! within the scheduler's lifetime.

use super::generic_id::{GenericId, IdCategory};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TaskMarker;

impl IdCategory for TaskMarker {
    fn category_name() -> &'static str {
        "task"
    }
}

/// Unique task identifier. See [`GenericId`] for the backing representation.
pub type TaskId = GenericId<TaskMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_are_unique_and_ordered_by_creation() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        assert!(a.timestamp_ms() <= b.timestamp_ms());
    }

    #[test]
    fn round_trips_through_display_and_from_str() {
        let id = TaskId::new();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
