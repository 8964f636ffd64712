use almanac::core::activation::{self, ActivationConfig, INSTALLED_VERSION_KEY};
use almanac::core::assets::{BUNDLE_VERSION, Bundle};
use almanac::core::config;
use almanac::core::error::AlmanacError;
use almanac::core::host::{CliHost, HostContext};
use almanac::core::store::{MemoryStateStore, SqliteStateStore, StateStore};
use almanac::core::sync;
use almanac::core::telemetry::UsageReporter;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn cli_host() -> Arc<CliHost> {
    Arc::new(CliHost {
        doc: None,
        workspace: None,
        assume_yes: false,
    })
}

fn activation_config(storage_root: &Path) -> ActivationConfig {
    ActivationConfig {
        storage_root: storage_root.to_path_buf(),
        bundle_root: None,
        telemetry_enabled: true,
    }
}

#[test]
fn sqlite_store_round_trip_and_persistence() {
    let tmp = tempdir().expect("tempdir");
    let store = SqliteStateStore::open(tmp.path()).expect("open store");

    assert!(store.get("missing").expect("get").is_none());
    store.set("k", "v1").expect("set");
    assert_eq!(store.get("k").expect("get").as_deref(), Some("v1"));
    store.set("k", "v2").expect("overwrite");
    assert_eq!(store.get("k").expect("get").as_deref(), Some("v2"));

    // A fresh handle over the same storage root sees the same data.
    let reopened = SqliteStateStore::open(tmp.path()).expect("reopen store");
    assert_eq!(reopened.get("k").expect("get").as_deref(), Some("v2"));

    reopened.remove("k").expect("remove");
    assert!(reopened.get("k").expect("get").is_none());
}

#[test]
fn first_activation_installs_bundle_and_commits_version() {
    let tmp = tempdir().expect("tempdir");
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());

    let handle = activation::start(&activation_config(tmp.path()), cli_host(), Arc::clone(&store))
        .expect("activation");
    assert!(handle.report().synced);
    assert_eq!(handle.report().version, BUNDLE_VERSION);
    assert!(handle.report().capabilities >= 4);

    let resources = activation::resources_root(tmp.path());
    assert!(resources.join("agents/reviewer.md").exists());
    assert!(resources.join("instructions/SAFETY.md").exists());
    assert_eq!(
        store.get(INSTALLED_VERSION_KEY).expect("get").as_deref(),
        Some(BUNDLE_VERSION)
    );
}

#[test]
fn second_activation_with_same_version_skips_sync() {
    let tmp = tempdir().expect("tempdir");
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let config = activation_config(tmp.path());

    activation::start(&config, cli_host(), Arc::clone(&store)).expect("first activation");

    // Wipe-and-replace would destroy this sentinel; a gated second
    // activation must leave it alone.
    let sentinel = activation::resources_root(tmp.path()).join("sentinel.txt");
    fs::write(&sentinel, "still here").expect("write sentinel");

    let handle =
        activation::start(&config, cli_host(), Arc::clone(&store)).expect("second activation");
    assert!(!handle.report().synced);
    assert!(sentinel.exists());
}

#[test]
fn version_bump_fully_replaces_target_root() {
    let tmp = tempdir().expect("tempdir");
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let config = activation_config(tmp.path());

    activation::start(&config, cli_host(), Arc::clone(&store)).expect("first activation");

    // Simulate an older installed bundle with a stale leftover file.
    store.set(INSTALLED_VERSION_KEY, "0.0.1").expect("set");
    let stale = activation::resources_root(tmp.path()).join("agents/obsolete.md");
    fs::write(&stale, "# Obsolete").expect("write stale");

    let handle =
        activation::start(&config, cli_host(), Arc::clone(&store)).expect("re-activation");
    assert!(handle.report().synced);
    assert!(!stale.exists());
    assert!(
        activation::resources_root(tmp.path())
            .join("agents/reviewer.md")
            .exists()
    );
    assert_eq!(
        store.get(INSTALLED_VERSION_KEY).expect("get").as_deref(),
        Some(BUNDLE_VERSION)
    );
}

#[test]
fn failed_sync_aborts_activation_and_preserves_version_marker() {
    let tmp = tempdir().expect("tempdir");
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    store.set(INSTALLED_VERSION_KEY, "0.0.1").expect("set");

    let config = ActivationConfig {
        storage_root: tmp.path().to_path_buf(),
        bundle_root: Some(tmp.path().join("no-such-bundle")),
        telemetry_enabled: true,
    };
    let err = activation::start(&config, cli_host(), Arc::clone(&store))
        .expect_err("activation must fail");
    assert!(matches!(err, AlmanacError::ActivationError(_)));

    // No partial-version commit.
    assert_eq!(
        store.get(INSTALLED_VERSION_KEY).expect("get").as_deref(),
        Some("0.0.1")
    );
}

#[test]
fn on_disk_bundle_round_trips_through_export() {
    let tmp = tempdir().expect("tempdir");
    let export_dir = tmp.path().join("exported");
    let embedded = Bundle::embedded();
    embedded.write_entries(&export_dir).expect("export");

    let reread = Bundle::from_dir(&export_dir).expect("from_dir");
    assert_eq!(reread.entries().len(), embedded.entries().len());
    assert!(
        reread
            .entries()
            .iter()
            .any(|e| e.path == "agents/reviewer.md")
    );
    assert_eq!(reread.categories(), embedded.categories());
}

#[test]
fn sync_install_wipes_previous_tree() {
    let tmp = tempdir().expect("tempdir");
    let target = tmp.path().join("resources");
    fs::create_dir_all(target.join("old")).expect("mkdir");
    fs::write(target.join("old/leftover.md"), "# Old").expect("write");

    sync::install(&Bundle::embedded(), &target).expect("install");
    assert!(!target.join("old").exists());
    assert!(target.join("prompts/commit-message.md").exists());
}

#[test]
fn config_file_controls_telemetry_flag() {
    let tmp = tempdir().expect("tempdir");

    let missing = tmp.path().join("nope.toml");
    let config = config::load_config(Some(&missing)).expect("defaults");
    assert!(config.telemetry.enabled);

    let path = tmp.path().join("almanac.toml");
    fs::write(&path, "[telemetry]\nenabled = false\n").expect("write config");
    let config = config::load_config(Some(&path)).expect("load");
    assert!(!config.telemetry.enabled);

    fs::write(&path, "telemetry = \"yes please\"").expect("write bad config");
    let err = config::load_config(Some(&path)).expect_err("malformed config");
    assert!(matches!(err, AlmanacError::ConfigError(_)));
}

#[test]
fn cli_host_reads_ambient_context_from_disk() {
    let tmp = tempdir().expect("tempdir");
    let doc_path = tmp.path().join("note.md");
    fs::write(&doc_path, "# Note\n").expect("write doc");

    let host = CliHost {
        doc: Some(doc_path.clone()),
        workspace: Some(tmp.path().to_path_buf()),
        assume_yes: true,
    };
    let doc = host.active_document().expect("active document");
    assert_eq!(doc.path, doc_path);
    assert!(doc.contents.starts_with("# Note"));
    assert_eq!(host.workspace_root().as_deref(), Some(tmp.path()));
    assert!(host.confirm("anything"));

    let empty = CliHost {
        doc: None,
        workspace: None,
        assume_yes: false,
    };
    assert!(empty.active_document().is_none());
    assert!(empty.workspace_root().is_none());
}

/// Store whose writes always fail, for exercising the telemetry swallow path.
struct FailingStateStore;

impl StateStore for FailingStateStore {
    fn get(&self, _key: &str) -> Result<Option<String>, AlmanacError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), AlmanacError> {
        Err(AlmanacError::ValidationError("store unavailable".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), AlmanacError> {
        Err(AlmanacError::ValidationError("store unavailable".to_string()))
    }
}

#[test]
fn telemetry_write_failure_is_swallowed() {
    let reporter = UsageReporter::new(Arc::new(FailingStateStore), true);
    // Must not panic or propagate; the capability result is unaffected.
    reporter.log_usage("x", true, &serde_json::json!({}));
    assert!(reporter.get_stats().is_empty());
}
