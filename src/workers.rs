//! One thread per independent search.
//!
//! Each job runs on its own scoped thread and receives its `WorkerId`
//! explicitly. The main thread is worker 0; jobs are numbered from 1 in
//! submission order.

use std::fmt;
use std::thread;

use log::{debug, error};

use crate::error::PuzzleError;

/// Small, stable identifier of a worker, for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl WorkerId {
    pub const MAIN: WorkerId = WorkerId(0);
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {}", self.0)
    }
}

/// Runs `work` on every job in parallel and returns the results in job order.
///
/// Fails with `PuzzleError::WorkerPanicked` naming the first worker that
/// panicked; every other worker still runs to completion.
pub fn fan_out<J, R, F>(jobs: Vec<J>, work: F) -> Result<Vec<R>, PuzzleError>
where
    J: Send,
    R: Send,
    F: Fn(WorkerId, J) -> R + Sync,
{
    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .into_iter()
            .enumerate()
            .map(|(i, job)| {
                let id = WorkerId(i + 1);
                let handle = scope.spawn(move || {
                    debug!("Started {id}");
                    work(id, job)
                });
                (id, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        let mut failed = None;
        for (id, handle) in handles {
            match handle.join() {
                Ok(result) => results.push(result),
                Err(_) => {
                    error!("{id} panicked");
                    failed.get_or_insert(id);
                }
            }
        }

        match failed {
            Some(WorkerId(id)) => Err(PuzzleError::WorkerPanicked(id)),
            None => Ok(results),
        }
    })
}
