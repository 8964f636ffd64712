//! Capability registry and uniform invocation wrapper.
//!
//! Every capability exposed to the host assistant goes through the same
//! wrapper: context validation, error containment, and one telemetry update
//! per invocation. No error ever crosses the invocation boundary; failures
//! come back as failure-shaped envelopes with the true outcome preserved
//! only in telemetry.
//!
//! Adding a capability: implement [`Capability`] and append one entry to
//! [`CapabilityRegistry::standard`].

pub mod brief;
pub mod catalog;
pub mod outline;
pub mod summary;

use crate::core::error::AlmanacError;
use crate::core::host::HostContext;
use crate::core::telemetry::UsageReporter;
use crate::core::time;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::path::Path;
use std::time::Instant;

/// Free-form invocation input from the host.
///
/// The host's invocation contract also carries a cancellation signal; it is
/// a placeholder today and intentionally not modeled here.
#[derive(Debug, Clone, Default)]
pub struct CapabilityInput {
    pub args: JsonValue,
}

/// A capability body's successful result: the text payload plus
/// capability-specific telemetry metadata.
#[derive(Debug, Clone)]
pub struct CapabilityOutcome {
    pub text: String,
    pub metadata: JsonValue,
}

impl CapabilityOutcome {
    pub fn new(text: impl Into<String>, metadata: JsonValue) -> Self {
        CapabilityOutcome {
            text: text.into(),
            metadata,
        }
    }
}

/// A named, host-invocable function returning a text result.
pub trait Capability: Send + Sync {
    /// Unique machine name, used for dispatch and telemetry keys.
    fn name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// The capability body. May fail; the registry wrapper contains every
    /// failure, so implementations are free to use `?` throughout.
    fn invoke(
        &self,
        input: &CapabilityInput,
        host: &dyn HostContext,
    ) -> Result<CapabilityOutcome, AlmanacError>;
}

/// Result envelope returned for every invocation, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    pub envelope_version: String,
    pub ts: String,
    pub event_id: String,
    pub capability: String,
    /// `ok` or `failed`.
    pub status: String,
    /// The single text payload.
    pub text: String,
}

impl InvocationEnvelope {
    fn new(capability: &str, status: &str, text: String) -> Self {
        InvocationEnvelope {
            envelope_version: "1.0.0".to_string(),
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            capability: capability.to_string(),
            status: status.to_string(),
            text,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// The closed set of capabilities registered at activation.
///
/// Registered once, immutable for the process lifetime.
pub struct CapabilityRegistry {
    entries: Vec<Box<dyn Capability>>,
}

impl CapabilityRegistry {
    /// All shipped capabilities. `storage_root` is the per-user storage area
    /// some capabilities inspect.
    pub fn standard(storage_root: &Path) -> Self {
        CapabilityRegistry {
            entries: vec![
                Box::new(outline::DocumentOutline),
                Box::new(summary::WorkspaceSummary::new(storage_root.to_path_buf())),
                Box::new(catalog::ResourceCatalog),
                Box::new(brief::AgentBrief),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.entries
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Capability> {
        self.entries.iter().map(|c| c.as_ref())
    }

    /// Invoke `name` under the uniform wrapper contract:
    ///
    /// 1. capture a start instant;
    /// 2. run the body; missing ambient context becomes a controlled failure
    ///    envelope with a named telemetry reason (`no_editor`/`no_workspace`);
    /// 3. any other body error becomes a failure envelope carrying the error
    ///    message, reported with reason `error`;
    /// 4. on success, report metadata plus `elapsed_ms` and wrap the text.
    ///
    /// Exactly one telemetry update per invocation of a registered
    /// capability; the wrapper itself never fails.
    pub fn invoke(
        &self,
        name: &str,
        input: &CapabilityInput,
        host: &dyn HostContext,
        reporter: &UsageReporter,
    ) -> InvocationEnvelope {
        let Some(capability) = self.get(name) else {
            // Only registered names reach telemetry; unknown names would
            // pollute the stats table with arbitrary keys.
            return InvocationEnvelope::new(
                name,
                "failed",
                format!("Unknown capability: {}", name),
            );
        };

        let started = Instant::now();
        match capability.invoke(input, host) {
            Ok(outcome) => {
                let mut metadata = outcome.metadata;
                if let Some(map) = metadata.as_object_mut() {
                    map.insert(
                        "elapsed_ms".to_string(),
                        json!(started.elapsed().as_millis() as u64),
                    );
                }
                reporter.log_usage(name, true, &metadata);
                InvocationEnvelope::new(name, "ok", outcome.text)
            }
            Err(AlmanacError::MissingContext(kind)) => {
                reporter.log_usage(name, false, &json!({ "reason": kind.reason() }));
                InvocationEnvelope::new(name, "failed", kind.user_text().to_string())
            }
            Err(e) => {
                let message = e.to_string();
                reporter.log_usage(name, false, &json!({ "reason": "error", "message": message }));
                InvocationEnvelope::new(name, "failed", message)
            }
        }
    }
}
