//! External-video library: curated list, mock search, and curation policy.
//!
//! Playback belongs to the host's embedded player; the core only tracks
//! which video a session references. The provider here is a fixed corpus
//! standing in for a real search API.

use serde::{Deserialize, Serialize};

/// A video the user can attach to a session or bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub duration_sec: u32,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set when the item is bookmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Source of video lists.
pub trait VideoProvider {
    fn curated(&self) -> Vec<VideoItem>;
    fn search(&self, query: &str, max_results: usize) -> Vec<VideoItem>;
}

const DEFAULT_ALLOWLIST: &[&str] = &[
    "The Mindful Movement",
    "Yoga With Adriene",
    "Michael Sealey",
    "Great Meditation",
    "Headspace",
];

const DEFAULT_BLOCKLIST: &[&str] = &[
    "asmr eating",
    "prank",
    "conspiracy",
    "politics",
    "crypto",
    "weight loss",
    "hypnosis for",
];

/// Channel allowlist + title keyword blocklist.
#[derive(Debug, Clone)]
pub struct CurationPolicy {
    allow: Vec<String>,
    block: Vec<String>,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl CurationPolicy {
    pub fn new(channel_allowlist: Vec<String>, keyword_blocklist: Vec<String>) -> Self {
        Self {
            allow: channel_allowlist.iter().map(|s| s.to_lowercase()).collect(),
            block: keyword_blocklist.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// An empty allowlist admits every channel; any blocklist keyword in
    /// the title rejects the video.
    pub fn is_allowed(&self, video: &VideoItem) -> bool {
        let title = video.title.to_lowercase();
        let channel = video.channel_title.to_lowercase();
        if !self.allow.is_empty() && !self.allow.contains(&channel) {
            return false;
        }
        !self.block.iter().any(|b| !b.is_empty() && title.contains(b))
    }
}

/// Score and sort videos for a query: +3 per matched query term in the
/// title, +2 for the 8-20 minute sweet spot, -1 for very short or very
/// long videos.
pub fn rank_videos(videos: &[VideoItem], query: &str) -> Vec<VideoItem> {
    let terms: Vec<String> = query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let score = |v: &VideoItem| -> i32 {
        let title = v.title.to_lowercase();
        let mut s = 0;
        for term in &terms {
            if title.contains(term.as_str()) {
                s += 3;
            }
        }
        let d = v.duration_sec;
        if (8 * 60..=20 * 60).contains(&d) {
            s += 2;
        }
        if d > 0 && d < 6 * 60 {
            s -= 1;
        }
        if d > 45 * 60 {
            s -= 1;
        }
        s
    };
    let mut out: Vec<VideoItem> = videos.to_vec();
    out.sort_by_key(|v| std::cmp::Reverse(score(v)));
    out
}

/// Coarse duration label for list rows.
pub fn duration_bucket(sec: u32) -> &'static str {
    match sec {
        0 => "Unknown",
        s if s <= 7 * 60 => "Short",
        s if s <= 20 * 60 => "Medium",
        _ => "Long",
    }
}

/// Fixed-corpus provider used in place of a real search API.
#[derive(Debug, Default)]
pub struct MockVideoProvider;

fn video(id: &str, title: &str, channel: &str, duration_sec: u32, tags: &[&str]) -> VideoItem {
    VideoItem {
        id: id.into(),
        title: title.into(),
        channel_title: channel.into(),
        duration_sec,
        thumbnail_url: Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        saved_at: None,
    }
}

fn curated_corpus() -> Vec<VideoItem> {
    vec![
        video(
            "inpok4MKVLM",
            "10 Minute Guided Meditation For Anxiety",
            "The Mindful Movement",
            10 * 60,
            &["anxiety", "daily", "guided"],
        ),
        video(
            "sG7DBA-mgFY",
            "Body Scan Meditation for Sleep (10 Minutes)",
            "Great Meditation",
            10 * 60,
            &["sleep", "body scan"],
        ),
        video(
            "SEfs5TJZ6Nk",
            "Breathing Exercise - 4-7-8 (Guided)",
            "The Mindful Movement",
            8 * 60,
            &["breath", "focus"],
        ),
        video(
            "ZToicYcHIOU",
            "15 Minute Meditation for Stress",
            "Great Meditation",
            15 * 60,
            &["stress", "daily"],
        ),
        video(
            "O-6f5wQXSu8",
            "5 Minute Morning Meditation",
            "Great Meditation",
            5 * 60,
            &["morning", "short"],
        ),
    ]
}

fn search_corpus() -> Vec<VideoItem> {
    let mut corpus = curated_corpus();
    corpus.extend([
        video(
            "aXItOY0sLRY",
            "20 Minute Guided Meditation for Focus",
            "The Mindful Movement",
            20 * 60,
            &["focus", "work"],
        ),
        video(
            "lWn5vIYzW6o",
            "10 Minute Meditation for Beginners",
            "Great Meditation",
            10 * 60,
            &["beginner", "daily"],
        ),
        video(
            "xQq2c9JtG3Q",
            "15 Minute Body Scan",
            "The Mindful Movement",
            15 * 60,
            &["body scan"],
        ),
    ]);
    corpus
}

impl VideoProvider for MockVideoProvider {
    fn curated(&self) -> Vec<VideoItem> {
        curated_corpus()
    }

    fn search(&self, query: &str, max_results: usize) -> Vec<VideoItem> {
        let corpus = search_corpus();
        let terms: Vec<String> = query
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        if terms.is_empty() {
            return corpus.into_iter().take(max_results).collect();
        }
        let score = |v: &VideoItem| -> i32 {
            let title = v.title.to_lowercase();
            terms
                .iter()
                .filter(|t| title.contains(t.as_str()))
                .count() as i32
                * 2
        };
        let mut out = corpus;
        out.sort_by_key(|v| std::cmp::Reverse(score(v)));
        out.truncate(max_results);
        out
    }
}
