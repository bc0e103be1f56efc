use eyre::Result;
use log::{error, info, warn};

use crate::config::Settings;
use crate::fetch::{CaptionSource, LanguageFailure, fetch_captions};
use crate::host::{Host, InsertOptions, Severity};
use crate::pack::pack;
use crate::{PackedBlock, youtube_id};

const NO_VIDEO_ID: &str = "No youtube id found in block";

/// How an invocation on a block ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Caption blocks were inserted under or next to the source block
    Inserted {
        language: String,
        blocks: Vec<PackedBlock>,
        failures: Vec<LanguageFailure>,
    },
    /// The block is missing or holds no YouTube video
    NoIdentifier,
    /// No language yielded any captions
    NoCaptions {
        video_id: String,
        failures: Vec<LanguageFailure>,
    },
    /// Anything else went wrong
    Failed { message: String },
}

impl Outcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Outcome::Inserted { .. })
    }
}

/// Fetch the captions of the video referenced by a block and insert them as blocks.
///
/// Every path that stops early shows the user a message through the host.
pub async fn get_captions<H, S>(host: &mut H, source: &S, block_id: &str, settings: &Settings) -> Outcome
where
    H: Host + ?Sized,
    S: CaptionSource + ?Sized,
{
    match run(host, source, block_id, settings).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Getting captions for block {block_id} failed: {e:?}");
            let message = e.to_string();
            let text = if message.is_empty() {
                "Unknown Error getting subtitles".to_string()
            } else {
                format!("Error getting subtitles: {e:#}")
            };
            host.show_message(&text, Severity::Error).await;
            Outcome::Failed { message }
        }
    }
}

async fn run<H, S>(host: &mut H, source: &S, block_id: &str, settings: &Settings) -> Result<Outcome>
where
    H: Host + ?Sized,
    S: CaptionSource + ?Sized,
{
    let Some(block) = host.get_block(block_id).await? else {
        warn!("Block {block_id} not found");
        host.show_message(NO_VIDEO_ID, Severity::Warning).await;
        return Ok(Outcome::NoIdentifier);
    };

    let Some(video_id) = youtube_id(&block.content) else {
        warn!("No youtube id found in block {}: {}", block.id, block.content);
        host.show_message(NO_VIDEO_ID, Severity::Warning).await;
        return Ok(Outcome::NoIdentifier);
    };

    info!("Getting subtitles for {video_id} in {:?}", settings.languages);
    let fetched = fetch_captions(source, &video_id, &settings.languages).await;

    for failure in &fetched.failures {
        let text = format!("Error getting subtitles ({}): {}", failure.language, failure.message);
        host.show_message(&text, Severity::Error).await;
    }

    if fetched.fragments.is_empty() {
        warn!("No subtitles found for {video_id}");
        host.show_message(&format!("No subtitles found for {video_id}"), Severity::Warning)
            .await;
        return Ok(Outcome::NoCaptions {
            video_id,
            failures: fetched.failures,
        });
    }

    let blocks = pack(&fetched.fragments, &settings.packing);
    let options = InsertOptions {
        sibling: !settings.packing.indent_under_source,
    };
    host.insert_blocks(&block.id, &blocks, options).await?;
    info!("Inserted {} caption blocks for {video_id}", blocks.len());

    Ok(Outcome::Inserted {
        language: fetched.language.unwrap_or_default(),
        blocks,
        failures: fetched.failures,
    })
}
