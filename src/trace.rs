//! Per-field execution tracing

use std::{
    sync::Mutex,
    time::Duration,
};

use crate::error::PathSegment;

/// Observer notified after every field resolve
///
/// The executor calls this on its own thread, once per field, after the
/// field's value completed (including its whole sub-tree). Implementations
/// must be cheap; the call sits on the hot path.
pub trait Tracer: Send + Sync {
    /// `path` is the response path of the field, `duration` the wall time
    /// spent resolving and completing it.
    fn field_resolved(&self, path: &[PathSegment], duration: Duration);
}

/// How [`CountingTracer`] folds repeated paths into entries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Aggregation {
    /// A new entry whenever the path differs from the previous call. The
    /// trace keeps execution order, repeated runs of one field collapse.
    #[default]
    ConsecutiveRuns,
    /// One entry per distinct path over the whole request.
    UniquePaths,
}

/// One aggregated trace entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldTrace {
    /// Response path of the field, without list indices.
    pub path: Vec<PathSegment>,
    /// How many resolves were folded into this entry.
    pub count: usize,
    /// Total wall time across those resolves.
    pub total: Duration,
}

struct CounterState {
    entries: Vec<FieldTrace>,
    // Reused between calls to keep the hot path allocation-free.
    scratch: Vec<Vec<PathSegment>>,
}

/// A [`Tracer`] that aggregates resolve counts and durations per field path
///
/// List indices are stripped before aggregation, so every element of a list
/// field folds into the same entry.
pub struct CountingTracer {
    aggregation: Aggregation,
    state: Mutex<CounterState>,
}

impl Default for CountingTracer {
    fn default() -> Self {
        Self::new(Aggregation::default())
    }
}

impl CountingTracer {
    /// A tracer with the given aggregation mode.
    pub fn new(aggregation: Aggregation) -> Self {
        Self {
            aggregation,
            state: Mutex::new(CounterState {
                entries: vec![],
                scratch: vec![],
            }),
        }
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<FieldTrace> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut state.entries)
    }

    /// Discards everything recorded so far.
    pub fn reset(&self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries = std::mem::take(&mut state.entries);
        for mut entry in entries {
            entry.path.clear();
            state.scratch.push(entry.path);
        }
    }
}

impl Tracer for CountingTracer {
    fn field_resolved(&self, path: &[PathSegment], duration: Duration) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let existing = match self.aggregation {
            Aggregation::ConsecutiveRuns => state
                .entries
                .last_mut()
                .filter(|e| stripped_eq(&e.path, path)),
            Aggregation::UniquePaths => state
                .entries
                .iter_mut()
                .find(|e| stripped_eq(&e.path, path)),
        };

        if let Some(entry) = existing {
            entry.count += 1;
            entry.total += duration;
            return;
        }

        let mut stripped = state.scratch.pop().unwrap_or_default();
        stripped.extend(
            path.iter()
                .filter(|s| matches!(s, PathSegment::Field(_)))
                .cloned(),
        );
        state.entries.push(FieldTrace {
            path: stripped,
            count: 1,
            total: duration,
        });
    }
}

/// Compares a stripped path against a raw one, skipping its indices.
fn stripped_eq(stripped: &[PathSegment], raw: &[PathSegment]) -> bool {
    let mut fields = raw.iter().filter(|s| matches!(s, PathSegment::Field(_)));
    for segment in stripped {
        if fields.next() != Some(segment) {
            return false;
        }
    }
    fields.next().is_none()
}
