//! # Devloop TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Builds the gzipped tarball sent to the Docker daemon as the build context of
//! an image component (`apply` commands).
//!
//! ## Architecture
//!
//! - Uses the `tar` crate for the archive and `flate2` for Gzip compression.
//! - Entries are stored relative to the context directory.
//! - Top-level entries named in `excluded` (for example `.git` or the Devloop
//!   state directory) are left out. Nested paths are not filtered; a
//!   `.dockerignore` in the context is still honoured by the daemon.
//!
//! ```rust
//! let bytes = tar::create_context_tar(Path::new("."), &[".git", ".devloop"])?;
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Creates a gzipped TAR archive of `context_path` in memory.
///
/// ## Arguments
///
/// * `context_path` - The directory to archive. Must exist.
/// * `excluded` - Names of top-level entries to leave out.
///
/// ## Errors
///
/// Returns an `Err` if the directory cannot be read, an entry cannot be
/// added, or the archive cannot be finalized.
pub fn create_context_tar(context_path: &Path, excluded: &[&str]) -> Result<Vec<u8>> {
    let mut tar_gz_bytes = Vec::new();
    let enc = flate2::write::GzEncoder::new(&mut tar_gz_bytes, flate2::Compression::default());
    let mut tar_builder = tar::Builder::new(enc);

    let entries = fs::read_dir(context_path).with_context(|| {
        format!(
            "Failed to read build context directory '{}'",
            context_path.display()
        )
    })?;
    for entry in entries {
        let entry = entry.with_context(|| {
            format!("Failed to list entry in '{}'", context_path.display())
        })?;
        let name = entry.file_name();
        if excluded.iter().any(|x| name.to_str() == Some(*x)) {
            debug!("Leaving '{}' out of the build context", name.to_string_lossy());
            continue;
        }
        let path = entry.path();
        let added = if path.is_dir() {
            tar_builder.append_dir_all(&name, &path)
        } else {
            tar_builder.append_path_with_name(&path, &name)
        };
        added.with_context(|| {
            format!("Failed to add '{}' to the tar archive", path.display())
        })?;
    }

    let encoder = tar_builder
        .into_inner()
        .context("Failed to finalize tar archive structure")?;
    encoder
        .finish()
        .context("Failed to finish gzip compression stream")?;

    Ok(tar_gz_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::HashSet;
    use tar::Archive;
    use tempfile::tempdir;

    fn entry_names(data: &[u8]) -> Result<HashSet<String>> {
        let mut archive = Archive::new(GzDecoder::new(data));
        let mut names = HashSet::new();
        for entry in archive.entries()? {
            let entry = entry?;
            names.insert(entry.path()?.to_string_lossy().replace('\\', "/"));
        }
        Ok(names)
    }

    #[test]
    fn test_create_context_tar_with_exclusions() -> Result<()> {
        let temp_dir = tempdir()?;
        let dir_path = temp_dir.path();
        fs::write(dir_path.join("Dockerfile"), "FROM alpine")?;
        fs::create_dir(dir_path.join("src"))?;
        fs::write(dir_path.join("src/main.js"), "console.log(1)")?;
        fs::create_dir(dir_path.join(".devloop"))?;
        fs::write(dir_path.join(".devloop/state.toml"), "debug = false")?;

        let names = entry_names(&create_context_tar(dir_path, &[".devloop"])?)?;
        assert!(names.contains("Dockerfile"));
        assert!(names.contains("src/main.js"));
        assert!(!names.iter().any(|n| n.starts_with(".devloop")));
        Ok(())
    }

    #[test]
    fn test_missing_context_dir_is_error() {
        let temp_dir = tempdir().unwrap();
        assert!(create_context_tar(&temp_dir.path().join("nope"), &[]).is_err());
    }
}
