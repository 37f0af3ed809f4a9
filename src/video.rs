//! Optional lookup of a cooking video matching the ingredient list.
//!
//! The lookup is best effort: every failure is logged and reported as
//! "no video", never as an error.

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::ingredients::IngredientList;
use crate::model::VideoContext;

/// Ingredients used to build the search query
pub const QUERY_INGREDIENTS: usize = 6;

/// Video descriptions are cut to this many characters before prompting
pub const MAX_DESCRIPTION_CHARS: usize = 800;

/// Finds a single video to use as style guidance
#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn find(&self, ingredients: &IngredientList) -> Option<VideoContext>;
}

/// YouTube Data API keyword search
pub struct YouTubeSearch {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeSearch {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(YouTubeSearch {
            client,
            api_key: config.video_key().map(String::from),
            base_url: config.video.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Errors are stripped of their URL, which carries the API key
    async fn search(&self, api_key: &str, query: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "1"),
                ("q", query),
                ("key", api_key),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(reqwest::Error::without_url)?
            .json::<Value>()
            .await
            .map_err(reqwest::Error::without_url)
    }
}

#[async_trait]
impl VideoLookup for YouTubeSearch {
    async fn find(&self, ingredients: &IngredientList) -> Option<VideoContext> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No video API key configured, skipping video lookup");
            return None;
        };

        let query = format!("{} recipe", ingredients.head(QUERY_INGREDIENTS).join(" "));
        debug!("Searching videos for {:?}", query);

        match self.search(api_key, &query).await {
            Ok(body) => {
                let video = video_from_search(&body);
                if video.is_none() {
                    debug!("Video search returned no usable result");
                }
                video
            }
            Err(e) => {
                warn!("Video search failed: {}", e);
                None
            }
        }
    }
}

/// Build a context from the first search item that carries a video id
fn video_from_search(body: &Value) -> Option<VideoContext> {
    let item = &body["items"][0];
    let video_id = item["id"]["videoId"].as_str().filter(|id| !id.is_empty())?;
    let snippet = &item["snippet"];

    Some(VideoContext {
        video_id: video_id.to_string(),
        title: snippet["title"].as_str().unwrap_or_default().to_string(),
        channel_name: snippet["channelTitle"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        short_description: snippet["description"]
            .as_str()
            .unwrap_or_default()
            .chars()
            .take(MAX_DESCRIPTION_CHARS)
            .collect(),
        url: format!("https://www.youtube.com/watch?v={}", video_id),
    })
}

struct TitlePatterns {
    separators: Regex,
    brackets: Regex,
    trailer: Regex,
    superlatives: Regex,
    promotional: Regex,
    whitespace: Regex,
    generic_suffix: Regex,
}

fn title_patterns() -> &'static TitlePatterns {
    static PATTERNS: OnceLock<TitlePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TitlePatterns {
        separators: Regex::new(r"[-–—_.:|]+").expect("valid regex"),
        brackets: Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").expect("valid regex"),
        trailer: Regex::new(r"[#@].*$").expect("valid regex"),
        superlatives: Regex::new(
            r"(?i)\b(?:best|easy|ultimate|perfect|quick|simple|homemade|authentic)\b",
        )
        .expect("valid regex"),
        promotional: Regex::new(
            r"(?i)\b(?:official\s+video|full\s+tutorial|recipe|how\s+to\s+(?:make|cook))\b",
        )
        .expect("valid regex"),
        whitespace: Regex::new(r"\s+").expect("valid regex"),
        generic_suffix: Regex::new(r"(?i)\s*\b(?:recipe|video|tutorial)$").expect("valid regex"),
    })
}

/// Turn a promotional video title into a concise dish name.
///
/// Cleaning is repeated until the text stops changing, so the function is
/// idempotent. When nothing is left the raw title is returned unchanged.
pub fn clean_video_title(raw: &str) -> String {
    let mut current = raw.to_string();
    // Every pass only removes text; the bound guards odd case mappings
    for _ in 0..8 {
        let next = clean_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        raw.to_string()
    } else {
        current
    }
}

fn clean_once(text: &str) -> String {
    let p = title_patterns();

    let t = p.separators.replace_all(text, " ");
    let t = p.brackets.replace_all(&t, " ");
    let t = p.trailer.replace_all(&t, " ");
    let t = p.superlatives.replace_all(&t, " ");
    let t = p.promotional.replace_all(&t, " ");
    let t = p.whitespace.replace_all(&t, " ");

    let mut titled = t
        .trim()
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    while let Some(m) = p.generic_suffix.find(&titled) {
        titled.truncate(m.start());
        titled = titled.trim_end().to_string();
    }

    titled
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// The cleaned title, only when it is short enough to serve as a recipe title
pub fn concise_title(video: &VideoContext) -> Option<String> {
    let cleaned = clean_video_title(&video.title);
    if !cleaned.is_empty() && cleaned.chars().count() <= crate::model::MAX_VIDEO_TITLE_LEN {
        Some(cleaned)
    } else {
        None
    }
}
