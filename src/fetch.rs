use async_trait::async_trait;
use eyre::Result;
use log::{debug, info, warn};

use crate::CaptionFragment;

/// Anything that can retrieve one caption track for a video
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch_track(&self, video_id: &str, language: &str) -> Result<Vec<CaptionFragment>>;
}

/// A language whose retrieval raised an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFailure {
    pub language: String,
    pub message: String,
}

impl std::fmt::Display for LanguageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.language, self.message)
    }
}

/// Result of trying every preferred language
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Language the fragments came from, if any succeeded
    pub language: Option<String>,
    pub fragments: Vec<CaptionFragment>,
    pub failures: Vec<LanguageFailure>,
}

/// Fetch captions, trying each language in order until one yields fragments.
///
/// Errors for individual languages are collected rather than returned, so the
/// caller sees every failure even when a later language succeeds. An empty
/// track is skipped without being recorded as a failure.
pub async fn fetch_captions<S>(source: &S, video_id: &str, languages: &[String]) -> FetchOutcome
where
    S: CaptionSource + ?Sized,
{
    let mut outcome = FetchOutcome::default();

    for language in languages {
        debug!("Requesting {language} captions for {video_id}");
        match source.fetch_track(video_id, language).await {
            Ok(fragments) if !fragments.is_empty() => {
                info!("Got {} {language} caption fragments for {video_id}", fragments.len());
                outcome.language = Some(language.clone());
                outcome.fragments = fragments;
                return outcome;
            }
            Ok(_) => {
                debug!("No {language} captions for {video_id}");
            }
            Err(e) => {
                warn!("Fetching {language} captions for {video_id} failed: {e:#}");
                outcome.failures.push(LanguageFailure {
                    language: language.clone(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    outcome
}
