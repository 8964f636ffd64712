//! `agent_brief` - onboarding brief composed from the bundled instructions.

use crate::capabilities::{Capability, CapabilityInput, CapabilityOutcome};
use crate::core::assets::{self, Bundle};
use crate::core::error::{AlmanacError, ContextKind};
use crate::core::host::HostContext;
use crate::core::output;
use serde_json::json;

const EXCERPT_MAX_CHARS: usize = 120;

pub struct AgentBrief;

impl Capability for AgentBrief {
    fn name(&self) -> &'static str {
        "agent_brief"
    }

    fn display_name(&self) -> &'static str {
        "Agent Brief"
    }

    fn description(&self) -> &'static str {
        "Compose an agent onboarding brief for the open workspace from the bundled instructions"
    }

    fn invoke(
        &self,
        _input: &CapabilityInput,
        host: &dyn HostContext,
    ) -> Result<CapabilityOutcome, AlmanacError> {
        let root = host
            .workspace_root()
            .ok_or(AlmanacError::MissingContext(ContextKind::Workspace))?;
        let workspace_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string());

        let template = assets::get_bundled_doc("templates/AGENTS.md").ok_or_else(|| {
            AlmanacError::NotFound("bundled template templates/AGENTS.md".to_string())
        })?;
        let mut text = template.replace("{{workspace}}", &workspace_name);

        let bundle = Bundle::embedded();
        let instructions: Vec<_> = bundle
            .entries()
            .iter()
            .filter(|e| e.category() == "instructions")
            .collect();

        text.push_str("\n## Standing instructions in this bundle\n\n");
        for entry in &instructions {
            let body = entry
                .contents
                .lines()
                .skip_while(|l| l.starts_with('#') || l.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            text.push_str(&format!(
                "- {}: {}\n",
                entry.path,
                output::compact_line(&body, EXCERPT_MAX_CHARS)
            ));
        }

        let metadata = json!({
            "workspace": workspace_name,
            "instructions": instructions.len(),
        });
        Ok(CapabilityOutcome::new(text, metadata))
    }
}
