// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::any::Any;

use thiserror::Error;

/// Errors raised by the pipeline algebra.
///
/// Variants split along the same two categories the reference taxonomy
/// uses: construction-time argument checks, and evaluation-time failures
/// surfaced when a terminal operation drives the pipeline.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// A chainable constructor (`batch`, `page`, ...) was called with an
    /// argument outside its valid domain, e.g. a zero batch size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A reducing terminal (`reduce`, `min`, `max`, `first`, `last`) was
    /// asked to fold an empty sequence with no default supplied.
    #[error("empty reduction")]
    EmptyReduction,

    /// A user-supplied closure (`map`, `filter`, a predicate, ...) panicked
    /// while the pipeline was being driven. The evaluation stops and no
    /// partial result is returned, matching the reference "raised while
    /// iterating" behavior.
    #[error("handler panicked: {0}")]
    HandlerPanic(String),
}

impl PipelineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "construction",
            Self::EmptyReduction | Self::HandlerPanic(_) => "evaluation",
        }
    }

    /// Construction errors are caller mistakes; evaluation errors may be
    /// transient if the underlying source is retried by the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), "evaluation")
    }
}

/// Runs `f`, converting a panic raised inside it into
/// [`PipelineError::HandlerPanic`] instead of unwinding through the
/// terminal operation's caller.
pub(crate) fn catch_unwind<R>(f: impl FnOnce() -> R + std::panic::UnwindSafe) -> Result<R, PipelineError> {
    std::panic::catch_unwind(f).map_err(|payload| PipelineError::HandlerPanic(panic_message(payload)))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_construction_evaluation_split() {
        assert_eq!(PipelineError::invalid_argument("bad").category(), "construction");
        assert_eq!(PipelineError::EmptyReduction.category(), "evaluation");
        assert!(!PipelineError::invalid_argument("bad").is_recoverable());
        assert!(PipelineError::EmptyReduction.is_recoverable());
    }

    #[test]
    fn catch_unwind_converts_panics() {
        let result: Result<i32, PipelineError> = catch_unwind(|| panic!("boom"));
        assert!(matches!(result, Err(PipelineError::HandlerPanic(ref m)) if m == "boom"));
    }

    #[test]
    fn catch_unwind_passes_through_success() {
        let result = catch_unwind(|| 1 + 1);
        assert_eq!(result.unwrap(), 2);
    }
}
