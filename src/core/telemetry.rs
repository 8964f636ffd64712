//! Local usage analytics for capability invocations.
//!
//! The reporter keeps one aggregate record per capability inside a single
//! table under the `toolStats` key. Every invocation, success or failure,
//! produces exactly one record update. Record invariant:
//! `total == success + failures`.
//!
//! `log_usage` is a read-modify-write of the whole table against the state
//! store, with no transactional isolation. Writers overlapping on a shared
//! store can lose an increment; telemetry here is advisory, not billing-grade.

use crate::core::error::AlmanacError;
use crate::core::store::StateStore;
use crate::core::time;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Store key holding the serialized stats table.
pub const TOOL_STATS_KEY: &str = "toolStats";

/// Per-capability aggregate. Timestamps are unix-epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatRecord {
    pub total: u64,
    pub success: u64,
    pub failures: u64,
    pub first_used: u64,
    pub last_used: u64,
}

pub type ToolStatsTable = BTreeMap<String, ToolStatRecord>;

/// Records per-capability invocation counts and outcomes into the store.
///
/// Injected into the registry at activation time; never a module-level
/// singleton, so the registry stays testable in isolation.
pub struct UsageReporter {
    store: Arc<dyn StateStore>,
    enabled: bool,
}

impl UsageReporter {
    /// The `enabled` flag is read once at construction from configuration;
    /// when disabled, `log_usage` is a no-op and writes nothing.
    pub fn new(store: Arc<dyn StateStore>, enabled: bool) -> Self {
        UsageReporter { store, enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Record one invocation outcome.
    ///
    /// Fire-and-forget: failures inside the reporter itself are swallowed and
    /// surfaced on the diagnostic channel only. They must never fail the
    /// invoking capability.
    pub fn log_usage(&self, name: &str, success: bool, metadata: &JsonValue) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.record(name, success) {
            eprintln!(
                "{} telemetry write for '{}' failed: {} (metadata: {})",
                "almanac:".bright_black(),
                name,
                e,
                metadata
            );
        }
    }

    fn record(&self, name: &str, success: bool) -> Result<(), AlmanacError> {
        let mut table = self.read_table()?;
        let now = time::now_epoch_secs();
        let record = table.entry(name.to_string()).or_insert(ToolStatRecord {
            total: 0,
            success: 0,
            failures: 0,
            first_used: now,
            last_used: now,
        });
        record.total += 1;
        if success {
            record.success += 1;
        } else {
            record.failures += 1;
        }
        record.last_used = now;
        self.write_table(&table)
    }

    /// Current stats table. A missing or unreadable table reads as empty;
    /// stats are advisory and never block a caller.
    pub fn get_stats(&self) -> ToolStatsTable {
        self.read_table().unwrap_or_default()
    }

    /// Clear the table to an empty map. Idempotent.
    pub fn reset_stats(&self) -> Result<(), AlmanacError> {
        self.write_table(&ToolStatsTable::new())
    }

    fn read_table(&self) -> Result<ToolStatsTable, AlmanacError> {
        match self.store.get(TOOL_STATS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(ToolStatsTable::new()),
        }
    }

    fn write_table(&self, table: &ToolStatsTable) -> Result<(), AlmanacError> {
        let raw = serde_json::to_string(table)
            .map_err(|e| AlmanacError::ValidationError(format!("stats serialization: {}", e)))?;
        self.store.set(TOOL_STATS_KEY, &raw)
    }
}
