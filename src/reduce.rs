use anyhow::{anyhow, bail, Context, Result};
use bpaf::Bpaf;
use log::*;
use std::io::Write;
use std::thread;
use uncertain::{Communicator, LocalGroup, SDouble};

/// Each worker contributes `rank + 1`; the reduced sample is printed by
/// rank 0.
#[derive(Bpaf)]
pub struct Options {
    /// Number of worker threads in the group
    #[bpaf(argument("W"), fallback(4))]
    workers: usize,
}

pub fn reduce(opts: Options) -> Result<()> {
    let result = run(opts.workers)?;
    let stdout = std::io::stdout();
    writeln!(stdout.lock(), "{}", result)?;
    Ok(())
}

/// Returns rank 0's copy of the reduced sample.
fn run(workers: usize) -> Result<SDouble> {
    if workers == 0 {
        bail!("Need at least one worker");
    }
    let handles = LocalGroup::new(workers)
        .into_iter()
        .map(|comm| {
            thread::spawn(move || {
                let local = comm.rank() as f64 + 1.;
                let x = uncertain::reduce(&comm, local)?;
                debug!("rank {}: {}", comm.rank(), x);
                Ok(x)
            })
        })
        .collect::<Vec<_>>();

    let mut results = vec![];
    for (rank, h) in handles.into_iter().enumerate() {
        let x: Result<SDouble> = h
            .join()
            .map_err(|_| anyhow!("Worker {} panicked", rank))?;
        results.push(x.with_context(|| format!("Worker {} failed", rank))?);
    }
    Ok(results.swap_remove(0))
}
