//! Binary-local orchestration.
//!
//! `entry` wires configuration, the worker, the application, the pipeline,
//! and the shell together; `startup` holds banner and logging helpers.

pub(crate) mod entry;
pub(crate) mod startup;
