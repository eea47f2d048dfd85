use serde::{Deserialize, Serialize};
use time::Date;

pub type EntityKey = String;

pub const COMPOSITE_KEY_SEPARATOR: &str = "|||";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tracks,
    Artists,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tracks => "tracks",
            Self::Artists => "artists",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListen {
    #[serde(default)]
    pub uts: Option<i64>,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artist_mbid: String,
    #[serde(default)]
    pub track_mbid: String,
    #[serde(default)]
    pub album_mbid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenEvent {
    pub timestamp: i64,
    pub track_name: String,
    pub artist_name: String,
    pub track_key: EntityKey,
    pub artist_key: EntityKey,
    pub track_mbid: Option<String>,
    pub artist_mbid: Option<String>,
    pub album_mbid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    New,
    ReEntry,
    Delta(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakStatus {
    Peak,
    RePeak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayChange {
    Finite(f64),
    InfiniteIncrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPlacement {
    pub week: Date,
    pub rank: u32,
    pub plays_in_window: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub week: Date,
    pub rank: u32,
    pub plays_in_window: u64,
    pub status: Status,
    pub peak_position: Option<u32>,
    pub peak_status: Option<PeakStatus>,
    pub weeks_on_chart: u32,
    pub play_percent_change: PlayChange,
    pub last_week_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDetails {
    pub track_name: String,
    pub artist_name: String,
    pub artist_key: EntityKey,
    pub track_mbid: Option<String>,
    pub album_mbid: Option<String>,
    pub total_plays: u64,
    pub first_play: i64,
    pub last_play: i64,
    pub peaked_at: Option<u32>,
    pub peak_week: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistDetails {
    pub artist_name: String,
    pub artist_mbid: Option<String>,
    pub total_plays: u64,
    pub first_play: i64,
    pub last_play: i64,
    pub peaked_at: Option<u32>,
    pub peak_week: Option<Date>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub key: EntityKey,
    pub name: String,
    pub artist_name: Option<String>,
    pub rank: u32,
    pub plays: u64,
    pub status: Status,
    pub peak: Option<u32>,
    pub peak_status: Option<PeakStatus>,
    pub weeks_on_chart: u32,
    pub play_percent_change: PlayChange,
    pub last_week_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistTrackSummary {
    pub key: EntityKey,
    pub name: String,
    pub total_plays: u64,
    pub peak: Option<u32>,
    pub peak_week: Option<Date>,
}
