pub mod config;
pub mod fetch;
pub mod host;
pub mod outline;
pub mod output;
pub mod pack;
pub mod pipeline;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single timed caption fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl CaptionFragment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// Caption text rendered as one logical line
    pub fn display_text(&self) -> String {
        self.text.replace('\n', " ")
    }
}

/// One outline block produced from captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedBlock {
    pub content: String,
}

impl PackedBlock {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Video hosting service an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Service {
    YouTube,
    Vimeo,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::YouTube => write!(f, "youtube"),
            Service::Vimeo => write!(f, "vimeo"),
        }
    }
}

/// A video identifier found in free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub id: String,
    pub service: Service,
}

static BARE_YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("bare id regex"));

// The id group stops at URL delimiters only, so ids embedded in macro syntax
// can carry a trailing `}}` that youtube_id() strips.
static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:\S*?&)?v=|embed/|shorts/|v/|live/)|youtu\.be/)([^\s&?#/)\]"'<>]+)"#,
    )
    .expect("youtube url regex")
});

static VIMEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("vimeo url regex"));

/// Real ids are random, so an 11-letter lowercase word is not taken for one
fn is_bare_youtube_id(input: &str) -> bool {
    BARE_YOUTUBE_ID.is_match(input) && input.chars().any(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

/// Find the first video reference in arbitrary text
pub fn extract_video_ref(input: &str) -> Option<VideoRef> {
    let input = input.trim();

    if is_bare_youtube_id(input) {
        return Some(VideoRef {
            id: input.to_string(),
            service: Service::YouTube,
        });
    }

    if let Some(caps) = YOUTUBE_URL.captures(input) {
        return Some(VideoRef {
            id: caps[1].to_string(),
            service: Service::YouTube,
        });
    }

    if let Some(caps) = VIMEO_URL.captures(input) {
        return Some(VideoRef {
            id: caps[1].to_string(),
            service: Service::Vimeo,
        });
    }

    None
}

/// Extract a usable YouTube video ID from block text
pub fn youtube_id(input: &str) -> Option<String> {
    let video = extract_video_ref(input).filter(|v| v.service == Service::YouTube)?;
    let id = video.id.replacen("}}", "", 1);
    (!id.is_empty()).then_some(id)
}
