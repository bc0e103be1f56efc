use std::ops::Range;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use log::{debug, info};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::PackedBlock;
use crate::host::{Block, Host, InsertOptions, Severity, echo_message};

const DEFAULT_INDENT: &str = "\t";

#[derive(Debug, Clone)]
struct OutlineBlock {
    /// Line index of the bullet
    start: usize,
    /// One past the last line of the block and all its descendants
    subtree_end: usize,
    indent: String,
    content: String,
    id: Option<String>,
}

impl OutlineBlock {
    fn matches(&self, id: &str) -> bool {
        if self.id.as_deref() == Some(id) {
            return true;
        }
        id.strip_prefix('L')
            .and_then(|n| n.parse::<usize>().ok())
            .is_some_and(|n| n == self.start + 1)
    }
}

/// A Logseq-style Markdown outline page held in memory.
///
/// Blocks are the list items of the page, nested lists are their children.
/// A block is addressed by its `id::` property or by `L<n>`, the 1-based
/// line its bullet starts on.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    lines: Vec<String>,
    blocks: Vec<OutlineBlock>,
    line_ending: &'static str,
    trailing_newline: bool,
}

impl Outline {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(String::from).collect(),
            blocks: parse_blocks(text),
            line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn block(&self, id: &str) -> Option<Block> {
        self.find(id).map(|b| Block {
            id: b.id.clone().unwrap_or_else(|| format!("L{}", b.start + 1)),
            content: b.content.clone(),
        })
    }

    /// Insert blocks right after the parent's subtree, nested one level deeper
    /// unless `options.sibling` is set
    pub fn insert(&mut self, parent_id: &str, blocks: &[PackedBlock], options: InsertOptions) -> Result<()> {
        let parent = self.find(parent_id).ok_or_else(|| eyre!("no block with id {parent_id}"))?;

        let at = parent.subtree_end;
        let prefix = if options.sibling {
            parent.indent.clone()
        } else {
            format!("{}{}", parent.indent, self.indent_unit())
        };

        let new_lines: Vec<String> = blocks.iter().map(|b| format!("{prefix}- {}", b.content)).collect();
        self.lines.splice(at..at, new_lines);
        debug!("Inserted {} lines at line {}", blocks.len(), at + 1);

        *self = Self::parse(&self.render());
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join(self.line_ending);
        if self.trailing_newline {
            text.push_str(self.line_ending);
        }
        text
    }

    fn find(&self, id: &str) -> Option<&OutlineBlock> {
        self.blocks.iter().find(|b| b.matches(id))
    }

    fn indent_unit(&self) -> String {
        if self.blocks.iter().any(|b| b.indent.contains('\t')) {
            return "\t".to_string();
        }
        self.blocks
            .iter()
            .map(|b| b.indent.len())
            .filter(|&n| n > 0)
            .min()
            .map_or_else(|| DEFAULT_INDENT.to_string(), |n| " ".repeat(n))
    }
}

/// Byte offsets where each line starts
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .filter(|&i| i < text.len() || i == 0)
        .collect()
}

fn line_of(starts: &[usize], offset: usize) -> usize {
    starts.partition_point(|&s| s <= offset).saturating_sub(1)
}

/// Line span of an item, ignoring the trailing blank space pulldown-cmark includes
fn line_span(text: &str, starts: &[usize], range: &Range<usize>) -> Range<usize> {
    let end = range.start + text[range.clone()].trim_end().len();
    line_of(starts, range.start)..line_of(starts, end.saturating_sub(1).max(range.start)) + 1
}

struct OpenItem {
    start: usize,
    /// Offset of the first nested list, where the children begin
    children: Option<usize>,
}

fn parse_blocks(text: &str) -> Vec<OutlineBlock> {
    let starts = line_starts(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut blocks = Vec::new();

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Item) => open.push(OpenItem {
                start: range.start,
                children: None,
            }),
            Event::Start(Tag::List(_)) => {
                if let Some(item) = open.last_mut() {
                    item.children.get_or_insert(range.start);
                }
            }
            Event::End(TagEnd::Item) => {
                let Some(item) = open.pop() else {
                    continue;
                };
                let span = line_span(text, &starts, &(item.start..range.end));
                let end = item
                    .children
                    .map_or(span.end, |offset| line_of(&starts, offset))
                    .max(span.start + 1);
                blocks.push(item_block(&lines, span.start, end, span.end));
            }
            _ => {}
        }
    }

    blocks.sort_by_key(|b| b.start);
    blocks
}

/// Block whose own text spans `start..end`, children excluded
fn item_block(lines: &[&str], start: usize, end: usize, subtree_end: usize) -> OutlineBlock {
    let first = lines.get(start).copied().unwrap_or_default();
    let trimmed = first.trim_start();
    let indent = first[..first.len() - trimmed.len()].to_string();

    // Drop the bullet marker: "-", "*", "+" or "1."
    let marker_len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let mut content = trimmed[marker_len..].trim_start().to_string();
    let mut id = None;

    for line in lines.get(start + 1..end).unwrap_or_default() {
        let line = line.trim_start();
        if let Some(value) = line.strip_prefix("id::") {
            id = Some(value.trim().to_string());
        }
        content.push('\n');
        content.push_str(line);
    }

    let kept = content.trim_end().len();
    content.truncate(kept);

    OutlineBlock {
        start,
        subtree_end,
        indent,
        content,
        id,
    }
}

/// Host editing a Markdown outline file in place
#[derive(Debug)]
pub struct OutlineHost {
    path: PathBuf,
    outline: Outline,
}

impl OutlineHost {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path)
            .await
            .wrap_err_with(|| format!("failed to read page {}", path.display()))?;
        debug!("Loaded outline page {}", path.display());
        Ok(Self {
            outline: Outline::parse(&text),
            path,
        })
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }
}

#[async_trait]
impl Host for OutlineHost {
    async fn get_block(&self, id: &str) -> Result<Option<Block>> {
        Ok(self.outline.block(id))
    }

    async fn insert_blocks(&mut self, parent_id: &str, blocks: &[PackedBlock], options: InsertOptions) -> Result<()> {
        self.outline.insert(parent_id, blocks, options)?;
        tokio::fs::write(&self.path, self.outline.render())
            .await
            .wrap_err_with(|| format!("failed to write page {}", self.path.display()))?;
        info!("Wrote {} blocks to {}", blocks.len(), self.path.display());
        Ok(())
    }

    async fn show_message(&mut self, text: &str, severity: Severity) {
        echo_message(text, severity);
    }
}
