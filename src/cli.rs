use clap::Parser;
use std::path::PathBuf;

use ytblocks::config::Overrides;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Outline,
}

#[derive(Parser)]
#[command(
    name = "ytblocks",
    about = "Turn a YouTube video's captions into outline blocks",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Text containing a YouTube URL or video ID (reads stdin if omitted)
    #[arg(conflicts_with = "page")]
    pub text: Option<String>,

    /// Markdown outline page to insert the caption blocks into
    #[arg(short, long, requires = "block")]
    pub page: Option<PathBuf>,

    /// Block within --page to read the video from: its id:: property or L<line>
    #[arg(long, requires = "page")]
    pub block: Option<String>,

    /// Caption language, or a comma-separated list tried in order
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Maximum characters per block
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Prefix each block with a timestamp link
    #[arg(long, overrides_with = "no_timestamps")]
    pub timestamps: bool,

    /// Leave timestamp links out
    #[arg(long, overrides_with = "timestamps")]
    pub no_timestamps: bool,

    /// Nest caption blocks under the source block
    #[arg(long, overrides_with = "sibling")]
    pub indent: bool,

    /// Insert caption blocks next to the source block
    #[arg(long, overrides_with = "indent")]
    pub sibling: bool,

    /// Output format when printing: text (default), json, outline
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show settings and the result of the lookup
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            caption_language: self.lang.clone(),
            block_size: self.block_size,
            include_timestamps: flag_pair(self.timestamps, self.no_timestamps),
            indent_captions: flag_pair(self.indent, self.sibling),
        }
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
