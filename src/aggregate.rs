use crate::model::{ArtistDetails, EntityKey, ListenEvent, TrackDetails};
use crate::weeks;
use std::collections::HashMap;
use time::Date;

#[derive(Debug, Clone, Default)]
pub struct WeekCounts {
    pub track_plays: HashMap<EntityKey, u64>,
    pub artist_plays: HashMap<EntityKey, u64>,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub weekly_counts: HashMap<Date, WeekCounts>,
    pub tracks: HashMap<EntityKey, TrackDetails>,
    pub artists: HashMap<EntityKey, ArtistDetails>,
}

impl Aggregation {
    pub fn sorted_weeks(&self) -> Vec<Date> {
        let mut all: Vec<Date> = self.weekly_counts.keys().copied().collect();
        all.sort_unstable();
        all
    }
}

pub fn aggregate(events: &[ListenEvent]) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for event in events {
        let Some(week) = weeks::week_start(event.timestamp) else {
            continue;
        };

        let counts = aggregation.weekly_counts.entry(week).or_default();
        *counts.track_plays.entry(event.track_key.clone()).or_insert(0) += 1;
        *counts
            .artist_plays
            .entry(event.artist_key.clone())
            .or_insert(0) += 1;

        upsert_track(&mut aggregation.tracks, event);
        upsert_artist(&mut aggregation.artists, event);
    }

    aggregation
}

fn upsert_track(tracks: &mut HashMap<EntityKey, TrackDetails>, event: &ListenEvent) {
    let detail = tracks
        .entry(event.track_key.clone())
        .or_insert_with(|| TrackDetails {
            track_name: event.track_name.clone(),
            artist_name: event.artist_name.clone(),
            artist_key: event.artist_key.clone(),
            track_mbid: None,
            album_mbid: None,
            total_plays: 0,
            first_play: event.timestamp,
            last_play: event.timestamp,
            peaked_at: None,
            peak_week: None,
        });

    detail.total_plays = detail.total_plays.saturating_add(1);
    detail.first_play = detail.first_play.min(event.timestamp);
    detail.last_play = detail.last_play.max(event.timestamp);

    // First-write-wins backfill: the first non-empty value observed sticks.
    if detail.track_mbid.is_none() {
        detail.track_mbid = event.track_mbid.clone();
    }
    if detail.album_mbid.is_none() {
        detail.album_mbid = event.album_mbid.clone();
    }
}

fn upsert_artist(artists: &mut HashMap<EntityKey, ArtistDetails>, event: &ListenEvent) {
    let detail = artists
        .entry(event.artist_key.clone())
        .or_insert_with(|| ArtistDetails {
            artist_name: event.artist_name.clone(),
            artist_mbid: None,
            total_plays: 0,
            first_play: event.timestamp,
            last_play: event.timestamp,
            peaked_at: None,
            peak_week: None,
        });

    detail.total_plays = detail.total_plays.saturating_add(1);
    detail.first_play = detail.first_play.min(event.timestamp);
    detail.last_play = detail.last_play.max(event.timestamp);

    if detail.artist_mbid.is_none() {
        detail.artist_mbid = event.artist_mbid.clone();
    }
}
