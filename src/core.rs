use crate::aggregate;
use crate::history::{self, PeakSummary};
use crate::model::{
    ArtistDetails, ArtistTrackSummary, ChartRow, EntityKey, EntityKind, HistoryEntry, ListenEvent,
    RawListen, TrackDetails,
};
use crate::normalize;
use crate::rank::{self, Ranking};
use std::collections::HashMap;
use thiserror::Error;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("no usable listen data after filtering")]
    NoUsableData,
    // Programming-error class: a placement exists for a key that was never
    // aggregated. The whole computation fails rather than publishing a
    // partial dataset.
    #[error("rank placement for unknown entity key {0}")]
    MissingDetails(EntityKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartedTrack {
    pub details: TrackDetails,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartedArtist {
    pub details: ArtistDetails,
    pub history: Vec<HistoryEntry>,
}

// Built fresh on every recompute and replaced atomically; the retained
// normalized event list is the only input carried into the next build.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub tracks: HashMap<EntityKey, ChartedTrack>,
    pub artists: HashMap<EntityKey, ChartedArtist>,
    pub all_weeks: Vec<Date>,
    pub events: Vec<ListenEvent>,
}

impl ChartDataset {
    pub fn from_rows(rows: &[RawListen], ranking: &Ranking) -> Result<Self, ChartError> {
        Self::from_events(normalize::normalize_rows(rows), ranking)
    }

    pub fn from_events(events: Vec<ListenEvent>, ranking: &Ranking) -> Result<Self, ChartError> {
        let aggregation = aggregate::aggregate(&events);
        let all_weeks = aggregation.sorted_weeks();
        if all_weeks.is_empty() {
            return Err(ChartError::NoUsableData);
        }

        let placements = rank::rank_weeks(&all_weeks, &aggregation.weekly_counts, ranking);

        let mut tracks = HashMap::with_capacity(placements.tracks.len());
        for (key, sequence) in placements.tracks {
            let Some(mut details) = aggregation.tracks.get(&key).cloned() else {
                return Err(ChartError::MissingDetails(key));
            };
            let (entries, peak) = history::compile(&sequence);
            apply_track_peak(&mut details, peak);
            tracks.insert(
                key,
                ChartedTrack {
                    details,
                    history: entries,
                },
            );
        }

        let mut artists = HashMap::with_capacity(placements.artists.len());
        for (key, sequence) in placements.artists {
            let Some(mut details) = aggregation.artists.get(&key).cloned() else {
                return Err(ChartError::MissingDetails(key));
            };
            let (entries, peak) = history::compile(&sequence);
            apply_artist_peak(&mut details, peak);
            artists.insert(
                key,
                ChartedArtist {
                    details,
                    history: entries,
                },
            );
        }

        Ok(Self {
            tracks,
            artists,
            all_weeks,
            events,
        })
    }

    pub fn first_week(&self) -> Option<Date> {
        self.all_weeks.first().copied()
    }

    pub fn last_week(&self) -> Option<Date> {
        self.all_weeks.last().copied()
    }

    pub fn track(&self, key: &str) -> Option<&ChartedTrack> {
        self.tracks.get(key)
    }

    pub fn artist(&self, key: &str) -> Option<&ChartedArtist> {
        self.artists.get(key)
    }

    // The primary read path for chart rendering: one ordered page of rows for
    // a week, rank 1 first.
    pub fn chart_for_week(&self, week: Date, kind: EntityKind) -> Vec<ChartRow> {
        let mut rows: Vec<ChartRow> = match kind {
            EntityKind::Tracks => self
                .tracks
                .iter()
                .filter_map(|(key, charted)| {
                    entry_for_week(&charted.history, week).map(|entry| {
                        chart_row(
                            key,
                            entry,
                            charted.details.track_name.clone(),
                            Some(charted.details.artist_name.clone()),
                        )
                    })
                })
                .collect(),
            EntityKind::Artists => self
                .artists
                .iter()
                .filter_map(|(key, charted)| {
                    entry_for_week(&charted.history, week).map(|entry| {
                        chart_row(key, entry, charted.details.artist_name.clone(), None)
                    })
                })
                .collect(),
        };
        rows.sort_by_key(|row| row.rank);
        rows
    }

    // Tracks by one artist, best overall peak first (never-charted last),
    // then total plays.
    pub fn artist_top_tracks(&self, artist_key: &str, limit: usize) -> Vec<ArtistTrackSummary> {
        let mut summaries: Vec<ArtistTrackSummary> = self
            .tracks
            .iter()
            .filter(|(_, charted)| charted.details.artist_key == artist_key)
            .map(|(key, charted)| ArtistTrackSummary {
                key: key.clone(),
                name: charted.details.track_name.clone(),
                total_plays: charted.details.total_plays,
                peak: charted.details.peaked_at,
                peak_week: charted.details.peak_week,
            })
            .collect();

        summaries.sort_by(|a, b| {
            peak_sort_value(a.peak)
                .cmp(&peak_sort_value(b.peak))
                .then(b.total_plays.cmp(&a.total_plays))
                .then_with(|| a.key.cmp(&b.key))
        });
        summaries.truncate(limit);
        summaries
    }
}

fn apply_track_peak(details: &mut TrackDetails, peak: PeakSummary) {
    details.peaked_at = peak.position;
    details.peak_week = peak.week;
}

fn apply_artist_peak(details: &mut ArtistDetails, peak: PeakSummary) {
    details.peaked_at = peak.position;
    details.peak_week = peak.week;
}

fn peak_sort_value(peak: Option<u32>) -> u32 {
    peak.unwrap_or(u32::MAX)
}

// Histories are sorted by week, so a binary search finds the entry.
fn entry_for_week(history: &[HistoryEntry], week: Date) -> Option<&HistoryEntry> {
    history
        .binary_search_by(|entry| entry.week.cmp(&week))
        .ok()
        .map(|index| &history[index])
}

fn chart_row(
    key: &EntityKey,
    entry: &HistoryEntry,
    name: String,
    artist_name: Option<String>,
) -> ChartRow {
    ChartRow {
        key: key.clone(),
        name,
        artist_name,
        rank: entry.rank,
        plays: entry.plays_in_window,
        status: entry.status,
        peak: entry.peak_position,
        peak_status: entry.peak_status,
        weeks_on_chart: entry.weeks_on_chart,
        play_percent_change: entry.play_percent_change,
        last_week_rank: entry.last_week_rank,
    }
}
