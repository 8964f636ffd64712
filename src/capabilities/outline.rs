//! `document_outline` - heading outline of the active editor document.

use crate::capabilities::{Capability, CapabilityInput, CapabilityOutcome};
use crate::core::error::{AlmanacError, ContextKind};
use crate::core::host::HostContext;
use serde_json::json;
use std::path::Path;

pub struct DocumentOutline;

impl Capability for DocumentOutline {
    fn name(&self) -> &'static str {
        "document_outline"
    }

    fn display_name(&self) -> &'static str {
        "Document Outline"
    }

    fn description(&self) -> &'static str {
        "Render a heading outline of the active document with line numbers"
    }

    fn invoke(
        &self,
        _input: &CapabilityInput,
        host: &dyn HostContext,
    ) -> Result<CapabilityOutcome, AlmanacError> {
        let doc = host
            .active_document()
            .ok_or(AlmanacError::MissingContext(ContextKind::Editor))?;

        let language = detect_language(&doc.path);
        let scan = scan_document(&doc.contents);

        let mut text = format!("Outline of {} ({})\n", doc.path.display(), language);
        if scan.headings.is_empty() {
            text.push_str("\nNo headings found.\n");
        } else {
            text.push('\n');
            for heading in &scan.headings {
                text.push_str(&format!(
                    "{}{} (line {})\n",
                    "  ".repeat(heading.level.saturating_sub(1)),
                    heading.title,
                    heading.line
                ));
            }
        }

        let metadata = json!({
            "language": language,
            "headings": scan.headings.len(),
            "code_blocks": scan.code_blocks,
            "lines": scan.lines,
        });
        Ok(CapabilityOutcome::new(text, metadata))
    }
}

struct Heading {
    level: usize,
    title: String,
    line: usize,
}

struct DocumentScan {
    headings: Vec<Heading>,
    code_blocks: usize,
    lines: usize,
}

/// Collect markdown headings, skipping any inside fenced code blocks.
fn scan_document(contents: &str) -> DocumentScan {
    let mut headings = Vec::new();
    let mut code_blocks = 0usize;
    let mut in_fence = false;
    let mut lines = 0usize;

    for (idx, line) in contents.lines().enumerate() {
        lines += 1;
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            if in_fence {
                in_fence = false;
            } else {
                in_fence = true;
                code_blocks += 1;
            }
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.starts_with('#') {
            let level = trimmed.chars().take_while(|&c| c == '#').count();
            let title = trimmed.trim_start_matches('#').trim();
            if !title.is_empty() {
                headings.push(Heading {
                    level,
                    title: title.to_string(),
                    line: idx + 1,
                });
            }
        }
    }

    DocumentScan {
        headings,
        code_blocks,
        lines,
    }
}

pub(crate) fn detect_language(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md") | Some("markdown") => "markdown",
        Some("rs") => "rust",
        Some("py") => "python",
        Some("ts") => "typescript",
        Some("js") => "javascript",
        Some("toml") => "toml",
        Some("json") => "json",
        Some("yaml") | Some("yml") => "yaml",
        _ => "plaintext",
    }
}
