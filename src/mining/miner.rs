//! The wave scheduler: the only piece of the mining subsystem that owns
//! mutable state across waves (`seen_fen`, `analyzed_fen`, the counters).
//! Engine drivers and Positions are never shared between workers — each
//! wave hands its records to the pool by value and gets them back the
//! same way.

use std::collections::HashSet;

use rand::Rng;

use crate::analysis::Filter;
use crate::board::PositionSignature;
use crate::engine::{EnginePool, Record};
use crate::mining::cache::{AnalyzedCache, DEFAULT_CAPACITY};
use crate::mining::error::MiningError;
use crate::mining::seed;
use crate::mining::sink::{Kind, Sink};

/// All the per-run knobs §4.8 names. Every limit is an upper bound; the
/// mining loop never exceeds one, but may do less (e.g. a frontier that
/// naturally dedupes below `max_frontier`).
#[derive(Debug, Clone)]
pub struct MiningConfig {
    pub max_waves: Option<u64>,
    pub max_frontier: usize,
    pub max_total: Option<u64>,
    pub nodes_cap: u64,
    pub dur_ms: u64,
    pub random_seeds: usize,
    pub infinite: bool,
    pub chess960_seeds: bool,
    pub analyzed_capacity: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        MiningConfig {
            max_waves: None,
            max_frontier: 256,
            max_total: None,
            nodes_cap: 1_000_000,
            dur_ms: 1_000,
            random_seeds: 4,
            infinite: false,
            chess960_seeds: false,
            analyzed_capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct Miner<R: Rng> {
    config: MiningConfig,
    accel: Option<Filter>,
    verify: Filter,
    seen_fen: HashSet<PositionSignature>,
    analyzed_fen: AnalyzedCache,
    waves: u64,
    processed: u64,
    rng: R,
}

impl<R: Rng> Miner<R> {
    pub fn new(config: MiningConfig, accel: Option<Filter>, verify: Filter, rng: R) -> Miner<R> {
        let analyzed_fen = AnalyzedCache::with_capacity(config.analyzed_capacity);
        Miner { config, accel, verify, seen_fen: HashSet::new(), analyzed_fen, waves: 0, processed: 0, rng }
    }

    pub fn waves(&self) -> u64 {
        self.waves
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Runs waves until a limit is hit or the frontier runs dry in
    /// non-`infinite` mode. `initial_frontier` seeds the first wave.
    pub fn run(
        &mut self,
        pool: &mut EnginePool,
        sink: &mut Sink,
        initial_frontier: Vec<Record>,
    ) -> Result<(), MiningError> {
        let mut frontier = initial_frontier;

        loop {
            if let Some(max_waves) = self.config.max_waves {
                if self.waves >= max_waves {
                    break;
                }
            }

            if frontier.is_empty() {
                if !self.config.infinite {
                    break;
                }
                frontier = seed::generate_seeds(&mut self.rng, self.config.random_seeds, self.config.chess960_seeds)
                    .into_iter()
                    .map(Record::new)
                    .collect();
            }

            let deduped = self.deduplicate(frontier);
            let capped: Vec<Record> = deduped.into_iter().take(self.config.max_frontier).collect();
            tracing::debug!(wave_id = self.waves, frontier = capped.len(), "starting wave");

            let analyzed = pool.analyse_all(capped, self.accel.as_ref(), self.config.nodes_cap, self.config.dur_ms);

            let (next_frontier, hit_total_cap) = self.classify_and_expand(analyzed, sink)?;
            sink.flush()?;

            tracing::debug!(
                wave_id = self.waves,
                processed = self.processed,
                next_frontier = next_frontier.len(),
                "wave complete"
            );
            self.waves += 1;
            frontier = next_frontier;

            if hit_total_cap {
                tracing::info!(processed = self.processed, "max_total reached, stopping run");
                break;
            }
        }

        Ok(())
    }

    /// Drops frontier entries already seen or already scored, registering
    /// every survivor in `seen_fen` so later waves' child expansion also
    /// sees it.
    fn deduplicate(&mut self, frontier: Vec<Record>) -> Vec<Record> {
        let mut survivors = Vec::with_capacity(frontier.len());
        for record in frontier {
            let sig = record.position.signature();
            if self.analyzed_fen.contains(&sig) {
                continue;
            }
            if !self.seen_fen.insert(sig) {
                continue;
            }
            survivors.push(record);
        }
        survivors
    }

    /// Returns the next wave's frontier and whether `max_total` was hit
    /// partway through this wave.
    fn classify_and_expand(
        &mut self,
        analyzed: Vec<Record>,
        sink: &mut Sink,
    ) -> Result<(Vec<Record>, bool), MiningError> {
        let mut next_frontier = Vec::new();

        for record in &analyzed {
            if record.error.is_some() {
                continue;
            }

            let sig = record.position.signature();
            self.analyzed_fen.insert(sig);

            let is_puzzle = self.verify.evaluate(&record.analysis);
            sink.emit(record, if is_puzzle { Kind::Puzzle } else { Kind::NonPuzzle })?;

            if is_puzzle {
                self.expand_puzzle_children(record, &mut next_frontier);
            }

            self.processed += 1;
            if let Some(max_total) = self.config.max_total {
                if self.processed >= max_total {
                    return Ok((next_frontier, true));
                }
            }
        }

        Ok((next_frontier, false))
    }

    /// Plays the analysis' best PV1 move and enqueues every legal reply on
    /// the resulting position that's new to both caches.
    fn expand_puzzle_children(&mut self, record: &Record, next_frontier: &mut Vec<Record>) {
        let best = record.analysis.best_move(1);
        if best.is_no_move() {
            return;
        }

        let mut intermediate = record.position.copy_of();
        intermediate.play(best);

        for child in intermediate.generate_sub_positions() {
            let child_sig = child.signature();
            if self.analyzed_fen.contains(&child_sig) {
                continue;
            }
            if self.seen_fen.insert(child_sig) {
                next_frontier.push(Record::with_parent(child, intermediate));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn pi_rng() -> SmallRng {
        SmallRng::from_seed(*b"3.141592653589793238462643383279")
    }

    #[test]
    fn deduplicate_drops_repeats_and_registers_survivors() {
        let verify = Filter::parse("pv1>0").unwrap();
        let mut miner = Miner::new(MiningConfig::default(), None, verify, pi_rng());
        let pos = Position::starting();
        let frontier = vec![Record::new(pos), Record::new(pos.copy_of())];
        let survivors = miner.deduplicate(frontier);
        assert_eq!(survivors.len(), 1);
        assert!(miner.seen_fen.contains(&pos.signature()));
    }

    #[test]
    fn non_infinite_run_stops_when_frontier_empties() {
        // No engines configured: the pool has nothing to dispatch to, so
        // an empty starting frontier should return immediately.
        let verify = Filter::parse("pv1>0").unwrap();
        let mut miner = Miner::new(MiningConfig::default(), None, verify, pi_rng());
        let mut pool = EnginePool::new(Vec::new());
        let dir = std::env::temp_dir().join(format!("chesstide-miner-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut sink = Sink::batched(dir.join("puzzles.jsonl"), dir.join("nonpuzzles.jsonl")).unwrap();
        miner.run(&mut pool, &mut sink, Vec::new()).unwrap();
        assert_eq!(miner.waves(), 0);
        assert_eq!(miner.processed(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
