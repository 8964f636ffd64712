//! `workspace_summary` - workspace manifest plus materialized resources.

use crate::capabilities::{Capability, CapabilityInput, CapabilityOutcome};
use crate::core::activation;
use crate::core::assets;
use crate::core::error::{AlmanacError, ContextKind};
use crate::core::host::HostContext;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional per-workspace manifest, read from `almanac.toml` in the
/// workspace root.
#[derive(Debug, Default, Deserialize)]
struct WorkspaceManifest {
    #[serde(default)]
    project: ManifestProject,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestProject {
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

pub struct WorkspaceSummary {
    storage_root: PathBuf,
}

impl WorkspaceSummary {
    pub fn new(storage_root: PathBuf) -> Self {
        WorkspaceSummary { storage_root }
    }
}

impl Capability for WorkspaceSummary {
    fn name(&self) -> &'static str {
        "workspace_summary"
    }

    fn display_name(&self) -> &'static str {
        "Workspace Summary"
    }

    fn description(&self) -> &'static str {
        "Summarize the open workspace and the advisory resources installed for it"
    }

    fn invoke(
        &self,
        _input: &CapabilityInput,
        host: &dyn HostContext,
    ) -> Result<CapabilityOutcome, AlmanacError> {
        let root = host
            .workspace_root()
            .ok_or(AlmanacError::MissingContext(ContextKind::Workspace))?;

        let manifest = read_manifest(&root)?;
        let workspace_name = manifest
            .project
            .name
            .clone()
            .or_else(|| {
                root.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "workspace".to_string());

        let mut text = format!("Workspace: {}\n", workspace_name);
        if !manifest.project.tags.is_empty() {
            text.push_str(&format!("Tags: {}\n", manifest.project.tags.join(", ")));
        }

        let resources_root = activation::resources_root(&self.storage_root);
        let mut total = 0usize;
        let mut present = 0usize;
        text.push_str("\nInstalled advisory resources:\n");
        for category in assets::CATEGORIES {
            let count = count_documents(&resources_root.join(category));
            if count > 0 {
                present += 1;
                total += count;
                text.push_str(&format!("- {}: {} document(s)\n", category, count));
            }
        }
        if total == 0 {
            text.push_str("- none (bundle not yet synchronized)\n");
        }

        let metadata = json!({
            "documents": total,
            "categories": present,
            "has_manifest": root.join(MANIFEST_NAME).exists(),
        });
        Ok(CapabilityOutcome::new(text, metadata))
    }
}

const MANIFEST_NAME: &str = "almanac.toml";

fn read_manifest(root: &Path) -> Result<WorkspaceManifest, AlmanacError> {
    let path = root.join(MANIFEST_NAME);
    if !path.exists() {
        return Ok(WorkspaceManifest::default());
    }
    let raw = fs::read_to_string(&path).map_err(AlmanacError::IoError)?;
    toml::from_str(&raw).map_err(|e| AlmanacError::MalformedInput {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn count_documents(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .count()
}
