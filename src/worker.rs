use crate::core::{ChartDataset, ChartError};
use crate::model::ListenEvent;
use crate::rank::Ranking;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

#[derive(Debug, Clone)]
pub struct RecomputeRequest {
    pub events: Arc<Vec<ListenEvent>>,
    pub ranking: Ranking,
}

#[derive(Debug)]
pub struct RecomputeResult {
    pub generation: u64,
    pub outcome: Result<ChartDataset, ChartError>,
}

enum WorkerCommand {
    Recompute { generation: u64, request: RecomputeRequest },
    Shutdown,
}

// One background recompute at a time; queued requests collapse to the newest
// and a result that was superseded while computing is dropped, never
// published.
pub struct ChartWorker {
    cmd_tx: Sender<WorkerCommand>,
    result_rx: Receiver<RecomputeResult>,
    next_generation: u64,
}

impl ChartWorker {
    pub fn start() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        thread::spawn(move || worker_loop(cmd_rx, result_tx));
        Self {
            cmd_tx,
            result_rx,
            next_generation: 0,
        }
    }

    pub fn submit(&mut self, request: RecomputeRequest) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        let _ = self.cmd_tx.send(WorkerCommand::Recompute {
            generation,
            request,
        });
        generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.next_generation
    }

    pub fn try_recv_result(&self) -> Option<RecomputeResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn recv_result(&self) -> Option<RecomputeResult> {
        self.result_rx.recv().ok()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::Shutdown);
    }
}

fn worker_loop(cmd_rx: Receiver<WorkerCommand>, result_tx: Sender<RecomputeResult>) {
    let mut pending: Option<(u64, RecomputeRequest)> = None;

    loop {
        let current = match pending.take() {
            Some(current) => current,
            None => match cmd_rx.recv() {
                Ok(WorkerCommand::Recompute {
                    generation,
                    request,
                }) => (generation, request),
                Ok(WorkerCommand::Shutdown) | Err(_) => return,
            },
        };

        let Some((generation, request)) = drain_to_newest(&cmd_rx, current) else {
            return;
        };

        let outcome = ChartDataset::from_events((*request.events).clone(), &request.ranking);

        // A request that arrived mid-computation supersedes this result.
        match cmd_rx.try_recv() {
            Ok(WorkerCommand::Recompute {
                generation,
                request,
            }) => pending = Some((generation, request)),
            Ok(WorkerCommand::Shutdown) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => {
                if result_tx
                    .send(RecomputeResult {
                        generation,
                        outcome,
                    })
                    .is_err()
                {
                    return;
                }
            }
        }
    }
}

fn drain_to_newest(
    cmd_rx: &Receiver<WorkerCommand>,
    mut current: (u64, RecomputeRequest),
) -> Option<(u64, RecomputeRequest)> {
    loop {
        match cmd_rx.try_recv() {
            Ok(WorkerCommand::Recompute {
                generation,
                request,
            }) => current = (generation, request),
            Ok(WorkerCommand::Shutdown) => return None,
            Err(TryRecvError::Empty) => return Some(current),
            Err(TryRecvError::Disconnected) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, RawListen};
    use crate::normalize;
    use crate::rank::WindowMode;
    use time::{Date, Month};

    fn sample_events() -> Arc<Vec<ListenEvent>> {
        let uts = Date::from_calendar_date(2024, Month::January, 9)
            .expect("date")
            .with_hms(12, 0, 0)
            .expect("time")
            .assume_utc()
            .unix_timestamp();
        let rows = vec![
            RawListen {
                uts: Some(uts),
                artist: String::from("Neon"),
                track: String::from("Night Drive"),
                ..RawListen::default()
            },
            RawListen {
                uts: Some(uts + 60),
                artist: String::from("Blue"),
                track: String::from("Ocean Room"),
                ..RawListen::default()
            },
        ];
        Arc::new(normalize::normalize_rows(&rows))
    }

    #[test]
    fn computes_and_delivers_a_result() {
        let mut worker = ChartWorker::start();
        let generation = worker.submit(RecomputeRequest {
            events: sample_events(),
            ranking: Ranking::default(),
        });

        let result = worker.recv_result().expect("result");
        assert_eq!(result.generation, generation);
        let dataset = result.outcome.expect("dataset");
        assert_eq!(dataset.artists.len(), 2);
        worker.shutdown();
    }

    #[test]
    fn empty_input_surfaces_typed_failure() {
        let mut worker = ChartWorker::start();
        worker.submit(RecomputeRequest {
            events: Arc::new(Vec::new()),
            ranking: Ranking::default(),
        });

        let result = worker.recv_result().expect("result");
        assert_eq!(result.outcome.unwrap_err(), ChartError::NoUsableData);
        worker.shutdown();
    }

    #[test]
    fn newest_request_wins() {
        let mut worker = ChartWorker::start();
        let events = sample_events();

        worker.submit(RecomputeRequest {
            events: events.clone(),
            ranking: Ranking {
                mode: WindowMode::Sliding(1),
                chart_size: 1,
                min_plays: 1,
            },
        });
        let latest = worker.submit(RecomputeRequest {
            events,
            ranking: Ranking {
                mode: WindowMode::Sliding(1),
                chart_size: 2,
                min_plays: 1,
            },
        });

        // Earlier results may or may not appear, but the final one must carry
        // the newest generation and its configuration.
        let mut result = worker.recv_result().expect("result");
        while result.generation < latest {
            result = worker.recv_result().expect("result");
        }
        assert_eq!(result.generation, latest);
        let dataset = result.outcome.expect("dataset");
        let week = dataset.last_week().expect("week");
        assert_eq!(dataset.chart_for_week(week, EntityKind::Artists).len(), 2);
        worker.shutdown();
    }
}
