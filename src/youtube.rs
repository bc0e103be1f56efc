use async_trait::async_trait;
use eyre::{Result, bail, eyre};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::CaptionFragment;
use crate::fetch::CaptionSource;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" for auto-generated tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Caption source reading YouTube's built-in captions via the InnerTube API
#[derive(Debug, Clone, Default)]
pub struct YouTubeCaptions {
    client: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn caption_tracks(&self, video_id: &str, lang: &str) -> Result<Vec<CaptionTrack>> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        assert_playable(video_id, resp.playability_status.as_ref())?;

        Ok(resp
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptions {
    async fn fetch_track(&self, video_id: &str, language: &str) -> Result<Vec<CaptionFragment>> {
        let tracks = self.caption_tracks(video_id, language).await?;
        let Some(track) = choose_track(&tracks, language, video_id)? else {
            debug!("Video {video_id} has no caption tracks");
            return Ok(Vec::new());
        };
        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(track.base_url.replace("&fmt=srv3", ""))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

/// No tracks at all means no captions; tracks without `lang` is an error
fn choose_track<'a>(tracks: &'a [CaptionTrack], lang: &str, video_id: &str) -> Result<Option<&'a CaptionTrack>> {
    if tracks.is_empty() {
        return Ok(None);
    }
    select_track(tracks, lang)
        .map(Some)
        .ok_or_else(|| eyre!("could not find {lang} captions for {video_id}"))
}

/// Pick the track for `lang`, preferring manually created over auto-generated
fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let mut matching = tracks.iter().filter(|t| t.language_code == lang);
    let first = matching.next()?;
    if !first.is_generated() {
        return Some(first);
    }
    Some(matching.find(|t| !t.is_generated()).unwrap_or(first))
}

fn assert_playable(video_id: &str, status: Option<&PlayabilityStatus>) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };
    match status.status.as_deref() {
        None | Some("OK") => Ok(()),
        Some(other) => {
            let reason = status.reason.as_deref().unwrap_or(other);
            bail!("video {video_id} is unplayable: {reason}")
        }
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

fn parse_caption_xml(xml: &str) -> Result<Vec<CaptionFragment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // Some tracks omit dur on the last cue
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Empty(_)) => {
                // Self-closing <text .../> has no content
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.trim().is_empty() {
                        fragments.push(CaptionFragment::new(start, dur, text));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(fragments)
}
