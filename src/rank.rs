use crate::aggregate::WeekCounts;
use crate::model::{EntityKey, RankPlacement};
use std::collections::HashMap;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Sliding(u32),
    AllTime,
    YearToDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranking {
    pub mode: WindowMode,
    pub chart_size: u32,
    pub min_plays: u64,
}

impl Default for Ranking {
    fn default() -> Self {
        Self {
            mode: WindowMode::Sliding(1),
            chart_size: 100,
            min_plays: 1,
        }
    }
}

pub type PlacementMap = HashMap<EntityKey, Vec<RankPlacement>>;

#[derive(Debug, Default)]
pub struct RankedPlacements {
    pub tracks: PlacementMap,
    pub artists: PlacementMap,
}

// `all_weeks` must be sorted ascending; placements per entity come out in
// week order by construction.
pub fn rank_weeks(
    all_weeks: &[Date],
    weekly_counts: &HashMap<Date, WeekCounts>,
    ranking: &Ranking,
) -> RankedPlacements {
    RankedPlacements {
        tracks: rank_kind(all_weeks, weekly_counts, ranking, |counts| {
            &counts.track_plays
        }),
        artists: rank_kind(all_weeks, weekly_counts, ranking, |counts| {
            &counts.artist_plays
        }),
    }
}

fn rank_kind<F>(
    all_weeks: &[Date],
    weekly_counts: &HashMap<Date, WeekCounts>,
    ranking: &Ranking,
    select: F,
) -> PlacementMap
where
    F: Fn(&WeekCounts) -> &HashMap<EntityKey, u64>,
{
    let mut placements = PlacementMap::new();
    let mut running: HashMap<EntityKey, u64> = HashMap::new();
    let window_size = match ranking.mode {
        WindowMode::Sliding(size) => size.max(1) as usize,
        _ => 0,
    };
    let mut previous_year: Option<i32> = None;

    for (index, week) in all_weeks.iter().enumerate() {
        if ranking.mode == WindowMode::YearToDate {
            let year = week.year();
            if previous_year != Some(year) {
                running.clear();
                previous_year = Some(year);
            }
        }

        if let Some(counts) = weekly_counts.get(week) {
            for (key, plays) in select(counts) {
                *running.entry(key.clone()).or_insert(0) += plays;
            }
        }

        if matches!(ranking.mode, WindowMode::Sliding(_)) && index >= window_size {
            let leaving = all_weeks[index - window_size];
            if let Some(counts) = weekly_counts.get(&leaving) {
                for (key, plays) in select(counts) {
                    match running.get_mut(key) {
                        Some(current) if *current > *plays => *current -= plays,
                        // Entities at or below zero leave the accumulator entirely.
                        Some(_) => {
                            running.remove(key);
                        }
                        None => {}
                    }
                }
            }
        }

        for (position, (key, plays)) in top_slice(&running, ranking).into_iter().enumerate() {
            placements.entry(key).or_default().push(RankPlacement {
                week: *week,
                rank: position as u32 + 1,
                plays_in_window: plays,
            });
        }
    }

    placements
}

// Plays descending, then key ascending: ties break the same way on every run
// regardless of hash-map iteration order.
fn top_slice(running: &HashMap<EntityKey, u64>, ranking: &Ranking) -> Vec<(EntityKey, u64)> {
    let min_plays = ranking.min_plays.max(1);
    let mut scored: Vec<(EntityKey, u64)> = running
        .iter()
        .filter(|(_, plays)| **plays >= min_plays)
        .map(|(key, plays)| (key.clone(), *plays))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(ranking.chart_size as usize);
    scored
}
