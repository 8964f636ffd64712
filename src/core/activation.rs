//! Activation controller - the extension entry point.
//!
//! # For AI Agents
//!
//! - **State machine**: `NotInstalled -> Installing -> Installed(v)`;
//!   `Installing` is entered at most once per activation, and only when the
//!   installed-version marker mismatches or the target root is absent
//! - **Atomic version commit**: the marker is written only after a fully
//!   successful synchronization, never for a partially-applied bundle
//! - **Fail-fast**: a synchronizer failure aborts activation; no capability
//!   or command is registered and the process stays inert
//!
//! The host lifecycle is modeled as `start(config, host, store) -> handle`
//! and `handle.stop()`, with every host facility injected as a trait object.

use crate::capabilities::{CapabilityInput, CapabilityRegistry, InvocationEnvelope};
use crate::core::assets::{BUNDLE_VERSION, Bundle};
use crate::core::error::AlmanacError;
use crate::core::host::HostContext;
use crate::core::stats_cli;
use crate::core::store::StateStore;
use crate::core::sync;
use crate::core::telemetry::UsageReporter;
use crate::core::time;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store key holding the version of the last fully synchronized bundle.
pub const INSTALLED_VERSION_KEY: &str = "installedVersion";

/// Directory under the storage root that holds the materialized bundle.
pub fn resources_root(storage_root: &Path) -> PathBuf {
    storage_root.join("resources")
}

pub struct ActivationConfig {
    /// Per-user storage area owned by this extension.
    pub storage_root: PathBuf,
    /// On-disk bundle tree overriding the embedded bundle, if any.
    pub bundle_root: Option<PathBuf>,
    /// From configuration `telemetry.enabled`; gates usage logging only.
    pub telemetry_enabled: bool,
}

/// What activation did, for the host's status surface.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    pub synced: bool,
    pub version: String,
    pub capabilities: usize,
}

/// Live extension instance returned by [`start`].
pub struct ExtensionHandle {
    registry: CapabilityRegistry,
    reporter: UsageReporter,
    host: Arc<dyn HostContext>,
    report: ActivationReport,
}

impl std::fmt::Debug for ExtensionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHandle")
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

/// Activate the extension: synchronize resources if the version gate demands
/// it, then register the capability set bound to a shared usage reporter.
pub fn start(
    config: &ActivationConfig,
    host: Arc<dyn HostContext>,
    store: Arc<dyn StateStore>,
) -> Result<ExtensionHandle, AlmanacError> {
    let target_root = resources_root(&config.storage_root);
    let installed = store.get(INSTALLED_VERSION_KEY)?;

    let mut synced = false;
    if sync::needs_sync(installed.as_deref(), BUNDLE_VERSION, &target_root) {
        let bundle = match &config.bundle_root {
            Some(dir) => Bundle::from_dir(dir)
                .map_err(|e| AlmanacError::ActivationError(e.to_string()))?,
            None => Bundle::embedded(),
        };
        sync::install(&bundle, &target_root)
            .map_err(|e| AlmanacError::ActivationError(format!("resource sync failed: {}", e)))?;
        store.set(INSTALLED_VERSION_KEY, BUNDLE_VERSION)?;
        synced = true;
    }

    let reporter = UsageReporter::new(Arc::clone(&store), config.telemetry_enabled);
    let registry = CapabilityRegistry::standard(&config.storage_root);
    let report = ActivationReport {
        synced,
        version: BUNDLE_VERSION.to_string(),
        capabilities: registry.len(),
    };

    Ok(ExtensionHandle {
        registry,
        reporter,
        host,
        report,
    })
}

impl ExtensionHandle {
    pub fn report(&self) -> &ActivationReport {
        &self.report
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn reporter(&self) -> &UsageReporter {
        &self.reporter
    }

    /// Invoke a capability under the uniform wrapper. Never fails; the
    /// envelope carries the outcome.
    pub fn invoke(&self, name: &str, input: &CapabilityInput) -> InvocationEnvelope {
        self.registry
            .invoke(name, input, self.host.as_ref(), &self.reporter)
    }

    /// The `showUsageStatistics` command: rendered summary of the stats
    /// table, sorted by total invocations descending.
    pub fn show_usage_statistics(&self) -> String {
        stats_cli::render_usage_statistics(&self.reporter.get_stats(), time::now_epoch_secs())
    }

    /// The `resetUsageStatistics` command. Prompts through the host; returns
    /// whether the table was actually cleared.
    pub fn reset_usage_statistics(&self) -> Result<bool, AlmanacError> {
        if !self
            .host
            .confirm("Reset all capability usage statistics?")
        {
            return Ok(false);
        }
        self.reporter.reset_stats()?;
        Ok(true)
    }

    /// Deactivate. Nothing to flush today; present for lifecycle symmetry
    /// with `start`.
    pub fn stop(self) {}
}
