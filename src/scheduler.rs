// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spreads per-point work for a whole grid across a fixed pool of
//! threads.
//!
//! Every sample is independent, so the workers simply take the next
//! `(index, point)` from a shared queue until it runs dry, keeping
//! what they compute tagged with its index.  Whichever order the
//! workers finish in, the results are put back into grid order in one
//! place once they have all been joined.
//!
//! A shared `Progress` counts finished points as they come in and
//! logs every tenth of the way through the grid.

use num::Complex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cancel::CancelToken;
use errors::FractalError;
use grid::SampleGrid;

/// How many progress lines a complete run logs.
const PROGRESS_STEPS: usize = 10;

/// Points finished so far, shared by every worker of a run.
#[derive(Debug)]
pub struct Progress {
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    /// A counter for a run of `total` points.
    pub fn new(total: usize) -> Progress {
        Progress {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one more finished point.  Returns the percentage reached
    /// when this point crosses one of the reporting steps.
    pub fn tick(&self) -> Option<usize> {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.total == 0 {
            return None;
        }
        let step = |n: usize| (n as u128 * PROGRESS_STEPS as u128 / self.total as u128) as usize;
        let reached = step(done);
        if reached > step(done - 1) && reached <= PROGRESS_STEPS {
            Some(reached * 100 / PROGRESS_STEPS)
        } else {
            None
        }
    }

    /// Points finished so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Points in the run.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// A fixed-size pool of render workers.
#[derive(Copy, Clone, Debug)]
pub struct GridScheduler {
    workers: usize,
}

impl GridScheduler {
    /// A pool of `concurrency` workers, but never more than the
    /// machine has cores.
    pub fn new(concurrency: usize) -> Result<GridScheduler, FractalError> {
        if concurrency == 0 {
            return Err(FractalError::config("concurrency must be at least 1"));
        }
        let workers = concurrency.min(num_cpus::get()).max(1);
        if workers < concurrency {
            debug!(
                "{} workers requested, clamped to {} available cores",
                concurrency, workers
            );
        }
        Ok(GridScheduler { workers })
    }

    /// How many threads a run will use.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` on every point of `grid` and return the results in
    /// the grid's row-major order.  The task receives the token so
    /// that long-running points can give up early.  If the token
    /// trips before every point is done, the run fails with
    /// `Cancelled`.
    pub fn run<F, T>(
        &self,
        grid: &SampleGrid,
        cancel: &CancelToken,
        task: F,
    ) -> Result<Vec<T>, FractalError>
    where
        F: Fn(Complex<f64>, &CancelToken) -> T + Sync,
        T: Send,
    {
        self.run_with_progress(grid, cancel, &Progress::new(grid.len()), task)
    }

    /// As `run`, counting finished points in `progress` as they come in.
    pub fn run_with_progress<F, T>(
        &self,
        grid: &SampleGrid,
        cancel: &CancelToken,
        progress: &Progress,
        task: F,
    ) -> Result<Vec<T>, FractalError>
    where
        F: Fn(Complex<f64>, &CancelToken) -> T + Sync,
        T: Send,
    {
        let total = grid.len();
        let queue = Arc::new(Mutex::new(grid.points().enumerate()));
        let task = &task;

        let joined = crossbeam::scope(|spawner| {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let queue = queue.clone();
                    spawner.spawn(move |_| {
                        let mut done: Vec<(usize, T)> = vec![];
                        loop {
                            // A poisoned queue means another worker
                            // panicked; that surfaces when it is joined.
                            let next = match queue.lock() {
                                Ok(mut points) => points.next(),
                                Err(_) => None,
                            };
                            match next {
                                Some((index, point)) => {
                                    if cancel.is_cancelled() {
                                        break;
                                    }
                                    done.push((index, task(point, cancel)));
                                    if let Some(percent) = progress.tick() {
                                        info!(
                                            "computing grid: {}% ({} of {} points)",
                                            percent,
                                            progress.completed(),
                                            progress.total()
                                        );
                                    }
                                }
                                None => {
                                    break;
                                }
                            }
                        }
                        debug!("worker {} finished {} points", worker, done.len());
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        });

        let finished = match joined {
            Ok(Ok(finished)) => finished,
            _ => return Err(FractalError::WorkerPanicked),
        };
        let results: Vec<(usize, T)> = finished.into_iter().flatten().collect();
        let completed = results.len();

        if cancel.was_cancelled() {
            return Err(FractalError::Cancelled { completed, total });
        }
        assemble(total, results).ok_or(FractalError::Cancelled { completed, total })
    }
}

/// Put index-tagged results back in order.  `None` if any index in
/// `0..total` is missing.
pub(crate) fn assemble<T>(total: usize, results: Vec<(usize, T)>) -> Option<Vec<T>> {
    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    for (index, result) in results {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(result);
        }
    }
    slots.into_iter().collect()
}
