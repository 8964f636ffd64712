//! `resource_catalog` - listing of every bundled document with content hashes.

use crate::capabilities::{Capability, CapabilityInput, CapabilityOutcome};
use crate::core::assets::Bundle;
use crate::core::error::AlmanacError;
use crate::core::host::HostContext;
use crate::core::output;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Shortened sha256 hex prefix shown per document.
const HASH_PREFIX_LEN: usize = 12;
const TITLE_MAX_CHARS: usize = 60;

pub struct ResourceCatalog;

impl Capability for ResourceCatalog {
    fn name(&self) -> &'static str {
        "resource_catalog"
    }

    fn display_name(&self) -> &'static str {
        "Resource Catalog"
    }

    fn description(&self) -> &'static str {
        "List every bundled advisory document with its category and content hash"
    }

    fn invoke(
        &self,
        _input: &CapabilityInput,
        _host: &dyn HostContext,
    ) -> Result<CapabilityOutcome, AlmanacError> {
        let bundle = Bundle::embedded();
        let categories = bundle.categories();

        let mut text = String::from("Bundled advisory documents\n");
        for category in &categories {
            text.push_str(&format!("\n## {}\n", category));
            for entry in bundle.entries().iter().filter(|e| e.category() == *category) {
                let hash = content_hash(&entry.contents);
                text.push_str(&format!(
                    "- {}  {}  {}\n",
                    entry.path,
                    hash,
                    output::compact_line(title_of(&entry.contents), TITLE_MAX_CHARS)
                ));
            }
        }

        let metadata = json!({
            "documents": bundle.entries().len(),
            "categories": categories.len(),
        });
        Ok(CapabilityOutcome::new(text, metadata))
    }
}

fn title_of(contents: &str) -> &str {
    contents
        .lines()
        .find(|l| l.starts_with("# "))
        .map(|l| l.trim_start_matches("# ").trim())
        .unwrap_or("Untitled")
}

fn content_hash(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..HASH_PREFIX_LEN].to_string()
}
