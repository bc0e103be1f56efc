use async_trait::async_trait;
use eyre::{Result, eyre};
use log::{error, info, warn};

use crate::PackedBlock;

/// A block in the host's document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Insert next to the parent instead of nested under it
    pub sibling: bool,
}

/// The document the caption blocks are inserted into
#[async_trait]
pub trait Host: Send + Sync {
    async fn get_block(&self, id: &str) -> Result<Option<Block>>;

    async fn insert_blocks(&mut self, parent_id: &str, blocks: &[PackedBlock], options: InsertOptions) -> Result<()>;

    async fn show_message(&mut self, text: &str, severity: Severity);
}

/// Print a user-facing message to stderr and the log
pub fn echo_message(text: &str, severity: Severity) {
    match severity {
        Severity::Info => {
            info!("{text}");
            eprintln!("{text}");
        }
        Severity::Warning => {
            warn!("{text}");
            eprintln!("\x1b[33mwarning:\x1b[0m {text}");
        }
        Severity::Error => {
            error!("{text}");
            eprintln!("\x1b[31merror:\x1b[0m {text}");
        }
    }
}

/// A single insertion made into a [`MemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub parent_id: String,
    pub blocks: Vec<PackedBlock>,
    pub options: InsertOptions,
}

/// Host backed by an in-memory list of blocks
#[derive(Debug, Default)]
pub struct MemoryHost {
    blocks: Vec<Block>,
    pub insertions: Vec<Insertion>,
    pub messages: Vec<(String, Severity)>,
    echo: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host holding a single block, as when invoked on one piece of text
    pub fn with_block(id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut host = Self::new();
        host.add_block(id, content);
        host
    }

    pub fn add_block(&mut self, id: impl Into<String>, content: impl Into<String>) {
        self.blocks.push(Block {
            id: id.into(),
            content: content.into(),
        });
    }

    /// Also print messages to stderr as they are shown
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Every block inserted so far, in insertion order
    pub fn inserted(&self) -> impl Iterator<Item = &PackedBlock> {
        self.insertions.iter().flat_map(|i| i.blocks.iter())
    }
}

#[async_trait]
impl Host for MemoryHost {
    async fn get_block(&self, id: &str) -> Result<Option<Block>> {
        Ok(self.blocks.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_blocks(&mut self, parent_id: &str, blocks: &[PackedBlock], options: InsertOptions) -> Result<()> {
        if !self.blocks.iter().any(|b| b.id == parent_id) {
            return Err(eyre!("no block with id {parent_id}"));
        }
        self.insertions.push(Insertion {
            parent_id: parent_id.to_string(),
            blocks: blocks.to_vec(),
            options,
        });
        Ok(())
    }

    async fn show_message(&mut self, text: &str, severity: Severity) {
        if self.echo {
            echo_message(text, severity);
        }
        self.messages.push((text.to_string(), severity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_host_lookup() {
        let host = MemoryHost::with_block("b1", "see https://youtu.be/dQw4w9WgXcQ");
        let block = host.get_block("b1").await.unwrap().unwrap();
        assert_eq!(block.content, "see https://youtu.be/dQw4w9WgXcQ");
        assert!(host.get_block("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_host_records_insertions() {
        let mut host = MemoryHost::with_block("b1", "text");
        let blocks = vec![PackedBlock::new("one "), PackedBlock::new("two ")];
        host.insert_blocks("b1", &blocks, InsertOptions { sibling: true })
            .await
            .unwrap();

        assert_eq!(host.insertions.len(), 1);
        assert!(host.insertions[0].options.sibling);
        let contents: Vec<_> = host.inserted().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["one ", "two "]);
    }

    #[tokio::test]
    async fn test_memory_host_rejects_unknown_parent() {
        let mut host = MemoryHost::new();
        let result = host
            .insert_blocks("nope", &[PackedBlock::new("x")], InsertOptions::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_memory_host_records_messages() {
        let mut host = MemoryHost::new();
        host.show_message("careful", Severity::Warning).await;
        assert_eq!(host.messages, vec![("careful".to_string(), Severity::Warning)]);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
