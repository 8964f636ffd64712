//! Resource synchronization into per-user storage.
//!
//! # For AI Agents
//!
//! - **Wipe-and-replace**: the target root is destroyed and rebuilt whole;
//!   no delta or merge exists, so no stale file survives a version bump
//! - **Version-gated**: the activation controller only calls `install` when
//!   the installed-version marker differs or the target root is absent
//! - **Not cancellable**: a started synchronization runs to completion

use crate::core::assets::Bundle;
use crate::core::error::AlmanacError;
use std::fs;
use std::path::Path;

/// True iff synchronization must run for this activation.
///
/// Policy: `installed != current OR target root absent`.
pub fn needs_sync(installed: Option<&str>, current: &str, target_root: &Path) -> bool {
    installed != Some(current) || !target_root.exists()
}

/// Materialize `bundle` under `target_root`.
///
/// If `target_root` exists it is removed recursively first. Any copy failure
/// aborts with an error; committing the installed-version marker is the
/// caller's job and must not happen on failure.
pub fn install(bundle: &Bundle, target_root: &Path) -> Result<(), AlmanacError> {
    if target_root.exists() {
        fs::remove_dir_all(target_root).map_err(AlmanacError::IoError)?;
    }
    fs::create_dir_all(target_root).map_err(AlmanacError::IoError)?;
    bundle.write_entries(target_root)
}
