use crate::PackedBlock;

/// Render blocks as plain text (one block per line)
pub fn render_text(blocks: &[PackedBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.content.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render blocks as a JSON array of `{"content": ...}` objects
pub fn render_json(blocks: &[PackedBlock]) -> String {
    serde_json::to_string_pretty(blocks).unwrap_or_else(|_| "[]".to_string())
}

/// Render the source text and its caption blocks as a Markdown outline
pub fn render_outline(source: &str, blocks: &[PackedBlock], indent: bool) -> String {
    let prefix = if indent { "\t- " } else { "- " };
    let mut lines = vec![format!("- {}", source.trim())];
    lines.extend(blocks.iter().map(|b| format!("{prefix}{}", b.content.trim_end())));
    lines.join("\n")
}
