//! # Devloop Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared collaborators of the devfile engine and the command handlers:
//!
//! - **`archive`**: gzipped tarballs used as Docker build contexts.
//! - **`docker`**: the `bollard`-based Docker layer and the `DockerExecutor`.
//! - **`ui`**: human and JSON output.
//!
//! The engine itself (`devfile`) never imports from here except through the
//! `CommandExecutor` trait, which `docker::DockerExecutor` implements.
//!

/// Build-context archives.
pub mod archive;
/// Docker daemon access and the Docker-backed command executor.
pub mod docker;
/// Terminal and machine-readable output.
pub mod ui;
