//! Embedded advisory-document bundle.
//!
//! This module provides compile-time embedded access to the shipped resource
//! tree. All bundle documents (agents, prompts, skills, instructions,
//! templates) are baked into the binary - synchronization materializes them
//! into per-user storage, no external files required at activation time.

use crate::core::error::AlmanacError;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Version of the shipped bundle, from Cargo.toml.
pub const BUNDLE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resource categories, in the order they are rendered.
pub const CATEGORIES: &[&str] = &["agents", "prompts", "skills", "instructions", "templates"];

/// Macro to embed bundle documents at compile time as text.
///
/// Generates:
/// - Public constants for each embedded document
/// - `get_bundled_doc(path)` function for lookup
/// - `list_bundled_docs()` function for discovery
macro_rules! bundled_docs {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../bundle/", $path));
        )*

        pub fn get_bundled_doc(path: &str) -> Option<&'static str> {
            match path {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_bundled_docs() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

bundled_docs! {
    // Personas the assistant can adopt
    "agents/reviewer.md" => BUNDLED_AGENTS_REVIEWER,
    "agents/navigator.md" => BUNDLED_AGENTS_NAVIGATOR,

    // Reusable single-shot prompts
    "prompts/commit-message.md" => BUNDLED_PROMPTS_COMMIT_MESSAGE,
    "prompts/refactor-plan.md" => BUNDLED_PROMPTS_REFACTOR_PLAN,

    // Multi-step skills
    "skills/release-notes.md" => BUNDLED_SKILLS_RELEASE_NOTES,
    "skills/dependency-audit.md" => BUNDLED_SKILLS_DEPENDENCY_AUDIT,

    // Standing instructions, read before acting
    "instructions/ONBOARDING.md" => BUNDLED_INSTRUCTIONS_ONBOARDING,
    "instructions/CONVENTIONS.md" => BUNDLED_INSTRUCTIONS_CONVENTIONS,
    "instructions/SAFETY.md" => BUNDLED_INSTRUCTIONS_SAFETY,

    // Scaffolding templates
    "templates/AGENTS.md" => BUNDLED_TEMPLATES_AGENTS,
    "templates/WORKSPACE.md" => BUNDLED_TEMPLATES_WORKSPACE,
}

/// One document of a resource bundle, addressed by its bundle-relative path.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Forward-slash relative path, e.g. `agents/reviewer.md`.
    pub path: String,
    pub contents: String,
}

impl BundleEntry {
    /// Category is the first path component (`agents`, `prompts`, ...).
    pub fn category(&self) -> &str {
        self.path.split('/').next().unwrap_or("")
    }
}

/// An immutable tree of categorized advisory documents.
///
/// Read-only; never mutated at runtime; the source of truth for
/// synchronization into per-user storage.
#[derive(Debug, Clone)]
pub struct Bundle {
    entries: Vec<BundleEntry>,
}

impl Bundle {
    /// The bundle shipped inside the binary.
    pub fn embedded() -> Self {
        let entries = list_bundled_docs()
            .into_iter()
            .map(|path| BundleEntry {
                path: path.to_string(),
                contents: get_bundled_doc(path)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
        Bundle { entries }
    }

    /// Read a bundle from an on-disk tree. Fails if `root` is missing or
    /// is not a directory.
    pub fn from_dir(root: &Path) -> Result<Self, AlmanacError> {
        if !root.is_dir() {
            return Err(AlmanacError::NotFound(format!(
                "bundle root {}",
                root.display()
            )));
        }
        let mut entries = Vec::new();
        collect_entries(root, root, &mut entries)?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Bundle { entries })
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Categories present in this bundle, in shipped order first.
    pub fn categories(&self) -> Vec<&str> {
        let present: BTreeSet<&str> = self.entries.iter().map(|e| e.category()).collect();
        let mut ordered: Vec<&str> = CATEGORIES
            .iter()
            .copied()
            .filter(|c| present.contains(c))
            .collect();
        for cat in present {
            if !ordered.contains(&cat) {
                ordered.push(cat);
            }
        }
        ordered
    }

    /// Write every entry under `dir`, creating parent directories.
    /// Does not remove anything already present; wipe-and-replace semantics
    /// live in the synchronizer.
    pub fn write_entries(&self, dir: &Path) -> Result<(), AlmanacError> {
        for entry in &self.entries {
            let dest = dir.join(&entry.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(AlmanacError::IoError)?;
            }
            fs::write(&dest, &entry.contents).map_err(AlmanacError::IoError)?;
        }
        Ok(())
    }
}

fn collect_entries(
    root: &Path,
    dir: &Path,
    entries: &mut Vec<BundleEntry>,
) -> Result<(), AlmanacError> {
    for child in fs::read_dir(dir).map_err(AlmanacError::IoError)? {
        let child = child.map_err(AlmanacError::IoError)?;
        let path = child.path();
        if path.is_dir() {
            collect_entries(root, &path, entries)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|_| AlmanacError::ValidationError(format!(
                    "bundle entry {} escapes bundle root",
                    path.display()
                )))?;
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let contents = fs::read_to_string(&path).map_err(AlmanacError::IoError)?;
            entries.push(BundleEntry {
                path: rel,
                contents,
            });
        }
    }
    Ok(())
}
