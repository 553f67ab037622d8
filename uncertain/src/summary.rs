use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A finalized measurement: the mean of a sample together with its standard
/// error.
///
/// All of the error propagation lives here.  The formulas are first-order
/// (linearized) Gaussian propagation for independent operands, so they are
/// only accurate while the relative errors are small.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Summary {
    /// The sample mean
    pub mean: f64,
    /// The standard error of the mean
    pub error: f64,
}

impl Summary {
    pub fn new(mean: f64, error: f64) -> Summary {
        Summary { mean, error }
    }

    /// A value with no uncertainty.
    pub fn exact(mean: f64) -> Summary {
        Summary { mean, error: 0. }
    }

    /// Computes the mean and the standard error of the mean of `xs`.
    ///
    /// This is the plain two-pass computation: first the mean, then the sum
    /// of squared deviations from it.  The unbiased sample variance is
    /// divided by `n` once more to get the variance of the mean.
    ///
    /// An empty sample gives NaN for both fields; a sample of one gives a
    /// mean and a NaN error.
    pub fn of_sample(xs: &[f64]) -> Summary {
        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let mut e = 0.;
        for x in xs {
            e += (x - mean) * (x - mean);
        }
        e /= n - 1.;
        e /= n;
        Summary {
            mean,
            error: e.sqrt(),
        }
    }

    /// `error / |mean|`.
    pub fn relative_error(self) -> f64 {
        self.error / self.mean.abs()
    }
}

impl Add for Summary {
    type Output = Summary;
    fn add(self, rhs: Summary) -> Summary {
        let v = self.mean + rhs.mean;
        let e = (self.error * self.error + rhs.error * rhs.error).sqrt();
        Summary::new(v, e)
    }
}

impl Sub for Summary {
    type Output = Summary;
    fn sub(self, rhs: Summary) -> Summary {
        let v = self.mean - rhs.mean;
        let e = (self.error * self.error + rhs.error * rhs.error).sqrt();
        Summary::new(v, e)
    }
}

impl Mul for Summary {
    type Output = Summary;
    fn mul(self, rhs: Summary) -> Summary {
        let v = self.mean * rhs.mean;
        let e1 = self.error * rhs.mean;
        let e2 = rhs.error * self.mean;
        Summary::new(v, (e1 * e1 + e2 * e2).sqrt())
    }
}

/// Note that this divides by both means, so a zero mean on either side gives
/// a non-finite error.
impl Div for Summary {
    type Output = Summary;
    fn div(self, rhs: Summary) -> Summary {
        let v = self.mean / rhs.mean;
        let e1 = self.error / self.mean;
        let e2 = rhs.error / rhs.mean;
        Summary::new(v, v * (e1 * e1 + e2 * e2).sqrt())
    }
}

// An exact scalar on the left.  `v - a` and `v / a` are written out because
// `v / a` must not divide by `v`.

impl Add<Summary> for f64 {
    type Output = Summary;
    fn add(self, rhs: Summary) -> Summary {
        Summary::exact(self) + rhs
    }
}

impl Mul<Summary> for f64 {
    type Output = Summary;
    fn mul(self, rhs: Summary) -> Summary {
        Summary::exact(self) * rhs
    }
}

impl Sub<Summary> for f64 {
    type Output = Summary;
    fn sub(self, rhs: Summary) -> Summary {
        Summary::new(self - rhs.mean, rhs.error)
    }
}

impl Div<Summary> for f64 {
    type Output = Summary;
    fn div(self, rhs: Summary) -> Summary {
        let v = self / rhs.mean;
        Summary::new(v, v * (rhs.error / rhs.mean))
    }
}

impl From<f64> for Summary {
    fn from(x: f64) -> Summary {
        Summary::exact(x)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} +- {:.*}", p, self.mean, p, self.error),
            None => write!(f, "{} +- {}", self.mean, self.error),
        }
    }
}
