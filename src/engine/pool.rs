//! A fixed-size collection of [`Engine`] drivers, dispatched across scoped
//! OS threads for the duration of one wave. Each driver is owned exclusively
//! by whichever thread is currently using it; records move into a driver by
//! value and back out the same way, so there is no board state shared
//! between workers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;

use crate::analysis::{Analysis, Filter};
use crate::engine::{Engine, Record};

/// Depth below which the accelerate pre-filter is not consulted: a grid with
/// only a few shallow rows hasn't said enough yet for an early `stop` to be
/// a safe bet.
const ACCEL_MIN_DEPTH: u32 = 6;

pub struct EnginePool {
    engines: Vec<Engine>,
}

impl EnginePool {
    pub fn new(engines: Vec<Engine>) -> EnginePool {
        EnginePool { engines }
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Assigns `records` to idle drivers in parallel and returns once every
    /// one has been analyzed, in input order.
    pub fn analyse_all(&mut self, records: Vec<Record>, accel: Option<&Filter>, nodes_cap: u64, dur_ms: u64) -> Vec<Record> {
        self.analyse_each(records, accel, nodes_cap, dur_ms, |_| {})
    }

    /// Same dispatch as [`EnginePool::analyse_all`], but invokes
    /// `on_complete` on the finishing thread as soon as each record is
    /// done — completion order, not input order.
    pub fn analyse_each(
        &mut self,
        records: Vec<Record>,
        accel: Option<&Filter>,
        nodes_cap: u64,
        dur_ms: u64,
        on_complete: impl FnMut(&Record) + Send,
    ) -> Vec<Record> {
        let len = records.len();
        let queue: Mutex<VecDeque<usize>> = Mutex::new((0..len).collect());
        let slots: Vec<Mutex<Option<Record>>> = records.into_iter().map(|r| Mutex::new(Some(r))).collect();
        let on_complete = Mutex::new(on_complete);

        thread::scope(|scope| {
            for engine in self.engines.iter_mut() {
                let queue = &queue;
                let slots = &slots;
                let on_complete = &on_complete;
                scope.spawn(move || {
                    let mut step = |analysis: &Analysis| -> bool {
                        match accel {
                            Some(filter) => accel_continue(filter, analysis),
                            None => true,
                        }
                    };
                    loop {
                        let idx = queue.lock().expect("queue mutex not poisoned").pop_front();
                        let Some(idx) = idx else { break };
                        let mut record =
                            slots[idx].lock().expect("slot mutex not poisoned").take().expect("slot taken at most once");

                        match engine.analyse(&record.position, nodes_cap, dur_ms, Some(&mut step)) {
                            Ok(analysis) => record.analysis = analysis,
                            Err(err) => record.error = Some(err.to_string()),
                        }

                        let mut callback = on_complete.lock().expect("callback mutex not poisoned");
                        (&mut *callback)(&record);
                        drop(callback);
                        *slots[idx].lock().expect("slot mutex not poisoned") = Some(record);
                    }
                });
            }
        });

        slots.into_iter().map(|m| m.into_inner().expect("slot mutex not poisoned").expect("every slot refilled")).collect()
    }

    /// Sends `quit` to every driver and waits for its process to exit.
    /// Deterministic: no engine is abandoned mid-command.
    pub fn close(self) {
        for engine in self.engines {
            engine.close();
        }
    }
}

fn accel_continue(filter: &Filter, analysis: &Analysis) -> bool {
    if analysis.is_empty() {
        return true;
    }
    let deepest = analysis.outputs().map(|o| o.depth).max().unwrap_or(0);
    if deepest < ACCEL_MIN_DEPTH {
        return true;
    }
    filter.evaluate(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_has_zero_len() {
        let pool = EnginePool::new(Vec::new());
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn analyse_all_on_no_records_returns_empty() {
        let mut pool = EnginePool::new(Vec::new());
        let out = pool.analyse_all(Vec::new(), None, 1000, 1000);
        assert!(out.is_empty());
    }
}
