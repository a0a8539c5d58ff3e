//! # Devloop Archive Utilities (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Archive helpers. Currently a single submodule, `tar`, which packs a
//! directory into the gzipped tarball Docker expects as a build context when
//! an image component is applied.
//!
pub mod tar;
