//! # Devloop Devfile Engine
//!
//! File: cli/src/devfile/mod.rs
//!
//! ## Overview
//!
//! Everything between a devfile on disk and commands running in containers:
//!
//! - `model`: the immutable, id-normalized devfile snapshot
//! - `loader`: YAML ingestion into that snapshot
//! - `validate`: group, exec, apply and composite validation
//! - `resolve`: picking the command for each lifecycle group
//! - `executor`: the `CommandExecutor` boundary to the outside world
//! - `runnable`: the executable command tree
//! - `lifecycle`: the push cycle, devfile events and one-off execution
//!
//! The flow for a push is `loader` -> `validate` -> `resolve` -> `runnable` ->
//! `lifecycle`, with every side effect going through a `CommandExecutor`.
//!
pub mod executor;
pub mod lifecycle;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod runnable;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;
