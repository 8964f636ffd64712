//! Compact output rendering helpers for capability text payloads.
//!
//! Keeps generated text bounded and readable while preserving signal.

/// Collapse newlines/extra whitespace and bound length for display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}
