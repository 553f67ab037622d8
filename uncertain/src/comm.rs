//! The collective-communication boundary used by [`crate::reduce()`].

use crate::Error;
use std::sync::{Arc, Condvar, Mutex};

/// A group of processes which can each contribute one `f64` to a collective
/// gather.
///
/// This is all that's needed from a message-passing runtime: an MPI
/// communicator, an RPC fan-in, or the in-process [`LocalGroup`] can all
/// implement it.
pub trait Communicator {
    /// This process's position in the group, in `0..size()`
    fn rank(&self) -> usize;
    /// The number of processes in the group
    fn size(&self) -> usize;
    /// Blocks until every process in the group has called `all_gather`, then
    /// returns the contributed values ordered by rank.
    ///
    /// Every process receives the same buffer.  There is no timeout.
    fn all_gather(&self, local: f64) -> Result<Vec<f64>, Error>;
}

/// A group containing only the calling process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn all_gather(&self, local: f64) -> Result<Vec<f64>, Error> {
        Ok(vec![local])
    }
}

/// A group of threads in the current process.
///
/// `LocalGroup::new(n)` returns one [`LocalRank`] handle per rank; move each
/// one onto its own thread.  If a handle is dropped, any collective which is
/// waiting on it (or started later) fails with [`Error::Disconnected`]
/// rather than hanging.
#[derive(Debug)]
pub struct LocalGroup {
    size: usize,
    round: Mutex<Round>,
    done: Condvar,
}

#[derive(Debug)]
struct Round {
    /// Bumped each time a gather completes
    generation: u64,
    slots: Vec<Option<f64>>,
    arrived: usize,
    /// The buffer from the last completed gather
    result: Vec<f64>,
    disconnected: bool,
}

impl LocalGroup {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(size: usize) -> Vec<LocalRank> {
        let group = Arc::new(LocalGroup {
            size,
            round: Mutex::new(Round {
                generation: 0,
                slots: vec![None; size],
                arrived: 0,
                result: vec![],
                disconnected: false,
            }),
            done: Condvar::new(),
        });
        (0..size)
            .map(|rank| LocalRank {
                rank,
                group: group.clone(),
            })
            .collect()
    }
}

/// One member of a [`LocalGroup`].
#[derive(Debug)]
pub struct LocalRank {
    rank: usize,
    group: Arc<LocalGroup>,
}

impl Communicator for LocalRank {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.group.size
    }

    fn all_gather(&self, local: f64) -> Result<Vec<f64>, Error> {
        let group = &*self.group;
        let mut round = group.round.lock().map_err(|_| Error::Disconnected)?;
        if round.disconnected {
            return Err(Error::Disconnected);
        }
        round.slots[self.rank] = Some(local);
        round.arrived += 1;

        if round.arrived == group.size {
            // We're last: publish the buffer and wake everyone else
            let buf = round
                .slots
                .iter_mut()
                .map(|x| x.take().unwrap_or(f64::NAN))
                .collect::<Vec<_>>();
            round.result = buf.clone();
            round.arrived = 0;
            round.generation += 1;
            group.done.notify_all();
            return Ok(buf);
        }

        let generation = round.generation;
        while round.generation == generation {
            if round.disconnected {
                return Err(Error::Disconnected);
            }
            round = group.done.wait(round).map_err(|_| Error::Disconnected)?;
        }
        Ok(round.result.clone())
    }
}

impl Drop for LocalRank {
    fn drop(&mut self) {
        if let Ok(mut round) = self.group.round.lock() {
            round.disconnected = true;
            self.group.done.notify_all();
        }
    }
}
