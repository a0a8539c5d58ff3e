//! # Devloop Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure that the command handlers
//! and the devfile engine build on.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `state`: The push state file that links one `push` to the next
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DevloopError, Result}; // For error handling
//! use crate::core::state; // For reading and recording push state
//! ```
//!
pub mod config;
pub mod error;
pub mod state;
