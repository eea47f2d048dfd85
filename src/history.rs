use crate::model::{HistoryEntry, PeakStatus, PlayChange, RankPlacement, Status};
use crate::weeks;
use time::Date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeakSummary {
    pub position: Option<u32>,
    pub week: Option<Date>,
}

// Placements must be in week order (the ranker builds them that way).
pub fn compile(placements: &[RankPlacement]) -> (Vec<HistoryEntry>, PeakSummary) {
    let mut history = Vec::with_capacity(placements.len());
    let mut best: Option<u32> = None;
    let mut best_week: Option<Date> = None;

    for (index, placement) in placements.iter().enumerate() {
        // The previous array slot only counts as "last week" when its week is
        // exactly one calendar week back; a gap means no comparator.
        let previous = index
            .checked_sub(1)
            .map(|prior| &placements[prior])
            .filter(|prior| weeks::is_adjacent(prior.week, placement.week));
        let last_week_rank = previous.map(|prior| prior.rank);
        let last_week_plays = previous.map(|prior| prior.plays_in_window);

        let peak_status = if best.is_none_or(|held| placement.rank < held) {
            best = Some(placement.rank);
            best_week = Some(placement.week);
            Some(PeakStatus::Peak)
        } else if best == Some(placement.rank) {
            let re_peak = match last_week_rank {
                Some(last) => placement.rank < last,
                None => index > 0,
            };
            re_peak.then_some(PeakStatus::RePeak)
        } else {
            None
        };

        let status = match last_week_rank {
            Some(last) => Status::Delta(last as i32 - placement.rank as i32),
            None if index == 0 => Status::New,
            None => Status::ReEntry,
        };

        let play_percent_change = match last_week_plays {
            Some(0) if placement.plays_in_window > 0 => PlayChange::InfiniteIncrease,
            Some(0) | None => PlayChange::Finite(0.0),
            Some(prior) => PlayChange::Finite(
                (placement.plays_in_window as f64 - prior as f64) / prior as f64 * 100.0,
            ),
        };

        history.push(HistoryEntry {
            week: placement.week,
            rank: placement.rank,
            plays_in_window: placement.plays_in_window,
            status,
            peak_position: best,
            peak_status,
            weeks_on_chart: index as u32 + 1,
            play_percent_change,
            last_week_rank,
        });
    }

    (
        history,
        PeakSummary {
            position: best,
            week: best_week,
        },
    )
}
