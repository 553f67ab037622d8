use anyhow::{bail, Result};
use bpaf::Bpaf;
use log::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use uncertain::SDouble;

/// Pushes draws from U(0, 1) and prints `i <mean> +- <error>` every few
/// draws.  The error should shrink like 1/sqrt(i).
#[derive(Bpaf)]
pub struct Options {
    /// Stop after this many draws
    #[bpaf(argument("N"), fallback(100_000))]
    total: usize,
    /// Print a line every K draws
    #[bpaf(argument("K"), fallback(100))]
    every: usize,
    /// Seed for the random number generator
    #[bpaf(argument("SEED"), fallback(1))]
    seed: u64,
}

pub fn converge(opts: Options) -> Result<()> {
    if opts.every == 0 {
        bail!("--every must be positive");
    }
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let stdout = std::io::stdout();
    run(&mut stdout.lock(), &mut rng, opts.total, opts.every)
}

fn run<W: Write, R: Rng>(out: &mut W, rng: &mut R, total: usize, every: usize) -> Result<()> {
    let mut data = SDouble::new();
    for i in 0..=total {
        data.push(rng.gen::<f64>());
        if i % every == 0 {
            writeln!(out, "{} {}", i, data)?;
        }
    }
    info!("Final estimate after {} draws: {}", data.count(), data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut out = vec![];
        run(&mut out, &mut rng, 10_000, 1000).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 11);
        // One draw: no error yet
        assert!(lines[0].starts_with("0 "));
        assert!(lines[0].ends_with("+- NaN"));

        let last = lines[10].split(' ').collect::<Vec<_>>();
        assert_eq!(last[0], "10000");
        let mean = last[1].parse::<f64>().unwrap();
        let error = last[3].parse::<f64>().unwrap();
        assert!((mean - 0.5).abs() < 5. * error);
        // sd of U(0,1) is 1/sqrt(12)
        let expected = (1. / 12_f64).sqrt() / 10_001_f64.sqrt();
        assert!((error - expected).abs() < 0.05 * expected);
    }
}
