use almanac::capabilities::CapabilityInput;
use almanac::core::activation::{self, ActivationConfig, ExtensionHandle};
use almanac::core::host::{ActiveDocument, CliHost, HostContext};
use almanac::core::store::{MemoryStateStore, StateStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn start_with_host(
    storage_root: &Path,
    host: Arc<dyn HostContext>,
    telemetry_enabled: bool,
) -> ExtensionHandle {
    let config = ActivationConfig {
        storage_root: storage_root.to_path_buf(),
        bundle_root: None,
        telemetry_enabled,
    };
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    activation::start(&config, host, store).expect("activation")
}

fn host_with(doc: Option<PathBuf>, workspace: Option<PathBuf>) -> Arc<CliHost> {
    Arc::new(CliHost {
        doc,
        workspace,
        assume_yes: true,
    })
}

#[test]
fn missing_editor_is_a_controlled_failure() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), true);

    let envelope = handle.invoke("document_outline", &CapabilityInput::default());
    assert_eq!(envelope.status, "failed");
    assert_eq!(envelope.text, "No active editor found");
    assert_eq!(envelope.envelope_version, "1.0.0");
    assert!(envelope.ts.ends_with('Z'));
    assert!(!envelope.event_id.is_empty());

    let stats = handle.reporter().get_stats();
    let record = &stats["document_outline"];
    assert_eq!(record.total, 1);
    assert_eq!(record.success, 0);
    assert_eq!(record.failures, 1);
}

#[test]
fn missing_workspace_is_a_controlled_failure() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), true);

    for name in ["workspace_summary", "agent_brief"] {
        let envelope = handle.invoke(name, &CapabilityInput::default());
        assert_eq!(envelope.status, "failed");
        assert_eq!(envelope.text, "No workspace folder open");
    }
}

#[test]
fn document_outline_reports_structure() {
    let tmp = tempdir().expect("tempdir");
    let doc = tmp.path().join("guide.md");
    fs::write(
        &doc,
        "# Guide\n\n```sh\n# comment, not a heading\n```\n\n## Usage\n",
    )
    .expect("write doc");
    let handle = start_with_host(tmp.path(), host_with(Some(doc), None), true);

    let envelope = handle.invoke("document_outline", &CapabilityInput::default());
    assert!(envelope.is_ok());
    assert!(envelope.text.contains("Outline of"));
    assert!(envelope.text.contains("Guide (line 1)"));
    assert!(envelope.text.contains("  Usage (line 7)"));
    assert!(!envelope.text.contains("comment, not a heading"));

    let stats = handle.reporter().get_stats();
    assert_eq!(stats["document_outline"].success, 1);
}

#[test]
fn workspace_summary_lists_installed_categories() {
    let tmp = tempdir().expect("tempdir");
    let workspace = tmp.path().join("proj");
    fs::create_dir_all(&workspace).expect("mkdir");
    fs::write(
        workspace.join("almanac.toml"),
        "[project]\nname = \"demo\"\ntags = [\"rust\"]\n",
    )
    .expect("write manifest");

    let handle = start_with_host(tmp.path(), host_with(None, Some(workspace)), true);
    let envelope = handle.invoke("workspace_summary", &CapabilityInput::default());
    assert!(envelope.is_ok());
    assert!(envelope.text.contains("Workspace: demo"));
    assert!(envelope.text.contains("Tags: rust"));
    assert!(envelope.text.contains("agents: 2 document(s)"));
    assert!(envelope.text.contains("instructions: 3 document(s)"));
}

#[test]
fn malformed_manifest_fails_with_offending_path() {
    let tmp = tempdir().expect("tempdir");
    let workspace = tmp.path().join("proj");
    fs::create_dir_all(&workspace).expect("mkdir");
    fs::write(workspace.join("almanac.toml"), "[project\nname =").expect("write manifest");

    let handle = start_with_host(tmp.path(), host_with(None, Some(workspace)), true);
    let envelope = handle.invoke("workspace_summary", &CapabilityInput::default());
    assert_eq!(envelope.status, "failed");
    assert!(envelope.text.contains("almanac.toml"));

    let stats = handle.reporter().get_stats();
    assert_eq!(stats["workspace_summary"].failures, 1);
}

#[test]
fn resource_catalog_needs_no_ambient_context() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), true);

    let envelope = handle.invoke("resource_catalog", &CapabilityInput::default());
    assert!(envelope.is_ok());
    assert!(envelope.text.contains("## agents"));
    assert!(envelope.text.contains("agents/reviewer.md"));
    assert!(envelope.text.contains("Reviewer"));
}

#[test]
fn agent_brief_names_the_workspace() {
    let tmp = tempdir().expect("tempdir");
    let workspace = tmp.path().join("shiny-app");
    fs::create_dir_all(&workspace).expect("mkdir");

    let handle = start_with_host(tmp.path(), host_with(None, Some(workspace)), true);
    let envelope = handle.invoke("agent_brief", &CapabilityInput::default());
    assert!(envelope.is_ok());
    assert!(envelope.text.contains("shiny-app"));
    assert!(envelope.text.contains("Standing instructions in this bundle"));
    assert!(envelope.text.contains("instructions/SAFETY.md"));
}

#[test]
fn unknown_capability_fails_without_polluting_stats() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), true);

    let envelope = handle.invoke("no_such_tool", &CapabilityInput::default());
    assert_eq!(envelope.status, "failed");
    assert!(envelope.text.contains("Unknown capability"));
    assert!(handle.reporter().get_stats().is_empty());
}

#[test]
fn every_invocation_updates_exactly_one_record() {
    let tmp = tempdir().expect("tempdir");
    let doc = tmp.path().join("doc.md");
    fs::write(&doc, "# Doc\n").expect("write doc");
    let handle = start_with_host(tmp.path(), host_with(Some(doc), None), true);

    handle.invoke("document_outline", &CapabilityInput::default());
    handle.invoke("document_outline", &CapabilityInput::default());
    handle.invoke("resource_catalog", &CapabilityInput::default());
    handle.invoke("workspace_summary", &CapabilityInput::default()); // fails: no workspace

    let stats = handle.reporter().get_stats();
    assert_eq!(stats["document_outline"].total, 2);
    assert_eq!(stats["resource_catalog"].total, 1);
    assert_eq!(stats["workspace_summary"].total, 1);
    assert_eq!(stats["workspace_summary"].failures, 1);
    for record in stats.values() {
        assert_eq!(record.total, record.success + record.failures);
    }
}

#[test]
fn disabled_telemetry_leaves_stats_empty() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), false);

    handle.invoke("resource_catalog", &CapabilityInput::default());
    handle.invoke("document_outline", &CapabilityInput::default());
    assert!(handle.reporter().get_stats().is_empty());
    assert!(
        handle
            .show_usage_statistics()
            .contains("No usage statistics recorded yet")
    );
}

#[test]
fn usage_statistics_render_from_live_invocations() {
    let tmp = tempdir().expect("tempdir");
    let handle = start_with_host(tmp.path(), host_with(None, None), true);

    handle.invoke("resource_catalog", &CapabilityInput::default());
    handle.invoke("resource_catalog", &CapabilityInput::default());
    handle.invoke("document_outline", &CapabilityInput::default()); // fails: no editor

    let rendered = handle.show_usage_statistics();
    assert!(rendered.contains("resource_catalog"));
    assert!(rendered.contains("document_outline"));
    // Busiest capability first.
    assert!(rendered.find("resource_catalog").unwrap() < rendered.find("document_outline").unwrap());
}

/// Host that always declines confirmation prompts.
struct DecliningHost;

impl HostContext for DecliningHost {
    fn active_document(&self) -> Option<ActiveDocument> {
        None
    }

    fn workspace_root(&self) -> Option<PathBuf> {
        None
    }

    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

#[test]
fn reset_respects_confirmation() {
    let tmp = tempdir().expect("tempdir");

    let declining = start_with_host(tmp.path(), Arc::new(DecliningHost), true);
    declining.invoke("resource_catalog", &CapabilityInput::default());
    assert!(!declining.reset_usage_statistics().expect("reset declined"));
    assert_eq!(declining.reporter().get_stats().len(), 1);

    let storage = tmp.path().join("second");
    let confirming = start_with_host(&storage, host_with(None, None), true);
    confirming.invoke("resource_catalog", &CapabilityInput::default());
    assert!(confirming.reset_usage_statistics().expect("reset confirmed"));
    assert!(confirming.reporter().get_stats().is_empty());
}
