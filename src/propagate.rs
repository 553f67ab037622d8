use anyhow::{bail, Result};
use bpaf::Bpaf;
use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fmt;
use std::io::Write;
use uncertain::SDouble;

/// Draws pairs `x ~ N(100, 3²)`, `y ~ N(50, 1²)`.  For each operator, the
/// error propagated from the samples of `x` and `y` is printed next to the
/// error measured directly from a sample of `x op y`.
#[derive(Bpaf)]
pub struct Options {
    /// How many pairs to draw for each operator
    #[bpaf(argument("N"), fallback(100_000))]
    samples: usize,
    /// Seed for the random number generator
    #[bpaf(argument("SEED"), fallback(1))]
    seed: u64,
}

pub fn propagate(opts: Options) -> Result<()> {
    if opts.samples < 2 {
        bail!("Need at least 2 samples to estimate an error");
    }
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let x_dist = Normal::new(100., 3.)?;
    let y_dist = Normal::new(50., 1.)?;

    let stdout = std::io::stdout();
    let mut out = tabwriter::TabWriter::new(stdout.lock());
    for op in Op::ALL {
        info!("Drawing {} pairs for x {} y", opts.samples, op);
        let c = compare(op, opts.samples, &mut rng, &x_dist, &y_dist);
        writeln!(out, "x\t{}", c.x)?;
        writeln!(out, "y\t{}", c.y)?;
        writeln!(out, "x{}y (measured)\t{}", op, c.measured)?;
        writeln!(out, "x{}y (propagated)\t{}", op, c.propagated)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub const ALL: [Op; 4] = [Op::Add, Op::Sub, Op::Mul, Op::Div];

    fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            Op::Add => x + y,
            Op::Sub => x - y,
            Op::Mul => x * y,
            Op::Div => x / y,
        }
    }

    fn propagate(self, x: &SDouble, y: &SDouble) -> SDouble {
        match self {
            Op::Add => x + y,
            Op::Sub => x - y,
            Op::Mul => x * y,
            Op::Div => x / y,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        })
    }
}

pub struct Comparison {
    pub x: SDouble,
    pub y: SDouble,
    /// A sample of `x op y`, taken pairwise
    pub measured: SDouble,
    /// `x op y`, computed from the samples' summaries
    pub propagated: SDouble,
}

pub fn compare<R: rand::Rng, D: Distribution<f64>>(
    op: Op,
    n: usize,
    rng: &mut R,
    x_dist: &D,
    y_dist: &D,
) -> Comparison {
    let mut x = SDouble::new();
    let mut y = SDouble::new();
    let mut measured = SDouble::new();
    for _ in 0..n {
        let a = x_dist.sample(rng);
        let b = y_dist.sample(rng);
        x.push(a);
        y.push(b);
        measured.push(op.apply(a, b));
    }
    let propagated = op.propagate(&x, &y);
    debug!("x{}y: measured {}, propagated {}", op, measured, propagated);
    Comparison {
        x,
        y,
        measured,
        propagated,
    }
}
