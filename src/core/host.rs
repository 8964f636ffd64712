//! Host-provided ambient context.
//!
//! Everything the host runtime supplies (active document, workspace root,
//! confirmation prompts) arrives through the `HostContext` trait so the core
//! can be exercised with fakes instead of a real host.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// The document currently focused in the host editor.
#[derive(Debug, Clone)]
pub struct ActiveDocument {
    pub path: PathBuf,
    pub contents: String,
}

/// Ambient abilities granted by the host runtime.
pub trait HostContext: Send + Sync {
    /// The active editor document, if any.
    fn active_document(&self) -> Option<ActiveDocument>;

    /// Root of the currently open workspace, if any.
    fn workspace_root(&self) -> Option<PathBuf>;

    /// Ask the user a yes/no question. Used by destructive commands.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Host context for the CLI surface: document and workspace come from flags,
/// confirmation from stdin unless `--yes` was passed.
pub struct CliHost {
    pub doc: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub assume_yes: bool,
}

impl HostContext for CliHost {
    fn active_document(&self) -> Option<ActiveDocument> {
        let path = self.doc.clone()?;
        let contents = std::fs::read_to_string(&path).ok()?;
        Some(ActiveDocument { path, contents })
    }

    fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace.clone()
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}
