//! End-to-end tests running full requests through the public entry points.

mod executor;
mod introspection;
mod variables;
