//! # Devloop Docker Module Interface
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! Everything Devloop does with the Docker daemon goes through this module,
//! on top of the `bollard` client.
//!
//! ## Architecture
//!
//! - **`connect`**: daemon connection.
//! - **`state`**: read-only container queries (inspect, running, current id).
//! - **`interaction`**: `docker exec` with output routed to the host, to JSON
//!   events, or into a buffer.
//! - **`operations`**: image builds for `image` components.
//! - **`executor`**: `DockerExecutor`, the `CommandExecutor` that ties the
//!   above to the devfile engine.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::docker;
//!
//! let id = docker::running_container_id("shop-runtime").await?;
//! let executor = docker::DockerExecutor::new("shop", config, components, devfile_dir, format);
//! ```
//!

/// Connection to the local Docker daemon.
pub mod connect;
/// `CommandExecutor` backed by Docker containers.
pub mod executor;
/// Command execution inside running containers.
pub mod interaction;
/// Image builds.
pub mod operations;
/// Container state queries.
pub mod state;

pub use executor::DockerExecutor;
pub use state::running_container_id;
