use crate::summary::Summary;
use std::cell::Cell;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, ShlAssign, Sub, SubAssign};

/// An uncertain double.
///
/// Either a raw sample, whose mean and standard error are computed the first
/// time they're asked for, or a fixed `(mean, error)` pair.  Arithmetic only
/// ever looks at the pair, and its result is always fixed: the samples of the
/// operands don't carry over.
///
/// The cached statistics live in a `Cell`, so an `SDouble` can be read
/// through a shared reference but can't be shared between threads.
#[derive(Clone, Debug)]
pub struct SDouble(Repr);

#[derive(Clone, Debug)]
enum Repr {
    Raw {
        samples: Vec<f64>,
        /// `Some` iff it agrees with `samples`
        cache: Cell<Option<Summary>>,
    },
    Fixed(Summary),
}

impl SDouble {
    /// An empty sample.
    pub fn new() -> SDouble {
        SDouble::from_samples(&[])
    }

    /// A fixed value with a known standard error.
    pub fn with_error(mean: f64, error: f64) -> SDouble {
        SDouble(Repr::Fixed(Summary::new(mean, error)))
    }

    pub fn from_samples(xs: &[f64]) -> SDouble {
        SDouble::from(xs.to_vec())
    }

    /// Records an observation.
    ///
    /// Any cached statistics are dropped.  A fixed value has no sample to
    /// extend, so pushing onto one throws away its mean and error and starts
    /// a new sample containing only `x`.
    pub fn push(&mut self, x: f64) {
        match &mut self.0 {
            Repr::Raw { samples, cache } => {
                samples.push(x);
                cache.set(None);
            }
            Repr::Fixed(_) => *self = SDouble::from(vec![x]),
        }
    }

    /// The mean and standard error, computing and caching them if needed.
    pub fn summary(&self) -> Summary {
        match &self.0 {
            Repr::Raw { samples, cache } => match cache.get() {
                Some(s) => s,
                None => {
                    let s = Summary::of_sample(samples);
                    cache.set(Some(s));
                    s
                }
            },
            Repr::Fixed(s) => *s,
        }
    }

    pub fn mean(&self) -> f64 {
        self.summary().mean
    }

    pub fn standard_error_of_mean(&self) -> f64 {
        self.summary().error
    }

    /// Alias of `standard_error_of_mean`
    pub fn error(&self) -> f64 {
        self.standard_error_of_mean()
    }

    /// The standard deviation, recovered from the standard error as
    /// `error * sqrt(n - 1)`.
    ///
    /// Fixed values have `n = 0`, so this is NaN for them.
    pub fn standard_deviation(&self) -> f64 {
        self.standard_error_of_mean() * (self.count() as f64 - 1.).sqrt()
    }

    /// The number of raw observations; zero for fixed values.
    pub fn count(&self) -> usize {
        self.samples().len()
    }

    /// The raw observations; empty for fixed values.
    pub fn samples(&self) -> &[f64] {
        match &self.0 {
            Repr::Raw { samples, .. } => samples,
            Repr::Fixed(_) => &[],
        }
    }

    /// Whether the mean and error are already known, ie. reading them won't
    /// do any work.
    pub fn is_finalized(&self) -> bool {
        match &self.0 {
            Repr::Raw { cache, .. } => cache.get().is_some(),
            Repr::Fixed(_) => true,
        }
    }
}

impl Default for SDouble {
    fn default() -> SDouble {
        SDouble::new()
    }
}

impl From<Vec<f64>> for SDouble {
    fn from(samples: Vec<f64>) -> SDouble {
        SDouble(Repr::Raw {
            samples,
            cache: Cell::new(None),
        })
    }
}

impl From<&[f64]> for SDouble {
    fn from(xs: &[f64]) -> SDouble {
        SDouble::from_samples(xs)
    }
}

impl From<Summary> for SDouble {
    fn from(s: Summary) -> SDouble {
        SDouble(Repr::Fixed(s))
    }
}

impl Extend<f64> for SDouble {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for SDouble {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> SDouble {
        SDouble::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// `x <<= v` pushes `v`
impl ShlAssign<f64> for SDouble {
    fn shl_assign(&mut self, x: f64) {
        self.push(x);
    }
}

impl fmt::Display for SDouble {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}

// Every combination of owned/borrowed operands, plus a bare `f64` on either
// side.  Everything funnels through the `Summary` operators.
macro_rules! binop_impl {
    ($tr:ident, $method:ident) => {
        impl $tr<&SDouble> for &SDouble {
            type Output = SDouble;
            fn $method(self, rhs: &SDouble) -> SDouble {
                SDouble::from($tr::$method(self.summary(), rhs.summary()))
            }
        }
        impl $tr<SDouble> for SDouble {
            type Output = SDouble;
            fn $method(self, rhs: SDouble) -> SDouble {
                $tr::$method(&self, &rhs)
            }
        }
        impl $tr<&SDouble> for SDouble {
            type Output = SDouble;
            fn $method(self, rhs: &SDouble) -> SDouble {
                $tr::$method(&self, rhs)
            }
        }
        impl $tr<SDouble> for &SDouble {
            type Output = SDouble;
            fn $method(self, rhs: SDouble) -> SDouble {
                $tr::$method(self, &rhs)
            }
        }
        impl $tr<f64> for &SDouble {
            type Output = SDouble;
            fn $method(self, rhs: f64) -> SDouble {
                SDouble::from($tr::$method(self.summary(), Summary::exact(rhs)))
            }
        }
        impl $tr<f64> for SDouble {
            type Output = SDouble;
            fn $method(self, rhs: f64) -> SDouble {
                $tr::$method(&self, rhs)
            }
        }
        impl $tr<&SDouble> for f64 {
            type Output = SDouble;
            fn $method(self, rhs: &SDouble) -> SDouble {
                SDouble::from($tr::$method(self, rhs.summary()))
            }
        }
        impl $tr<SDouble> for f64 {
            type Output = SDouble;
            fn $method(self, rhs: SDouble) -> SDouble {
                $tr::$method(self, &rhs)
            }
        }
    };
}
binop_impl!(Add, add);
binop_impl!(Sub, sub);
binop_impl!(Mul, mul);
binop_impl!(Div, div);

macro_rules! assign_impl {
    ($tr:ident, $method:ident, $op:ident, $op_method:ident) => {
        impl $tr<&SDouble> for SDouble {
            fn $method(&mut self, rhs: &SDouble) {
                self.0 = Repr::Fixed($op::$op_method(self.summary(), rhs.summary()));
            }
        }
        impl $tr<SDouble> for SDouble {
            fn $method(&mut self, rhs: SDouble) {
                $tr::$method(self, &rhs)
            }
        }
        impl $tr<f64> for SDouble {
            fn $method(&mut self, rhs: f64) {
                self.0 = Repr::Fixed($op::$op_method(self.summary(), Summary::exact(rhs)));
            }
        }
    };
}
assign_impl!(AddAssign, add_assign, Add, add);
assign_impl!(SubAssign, sub_assign, Sub, sub);
assign_impl!(MulAssign, mul_assign, Mul, mul);
assign_impl!(DivAssign, div_assign, Div, div);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn mean_and_error() {
        let x = SDouble::from(vec![1., 2., 3.]);
        assert!(!x.is_finalized());
        assert_eq!(x.count(), 3);
        assert_eq!(x.mean(), 2.);
        assert!(x.is_finalized());
        assert_eq!(x.standard_error_of_mean(), (1.0_f64 / 3.).sqrt());
        assert_eq!(x.error(), x.standard_error_of_mean());
        assert_eq!(
            x.standard_deviation(),
            x.standard_error_of_mean() * 2.0_f64.sqrt()
        );
    }

    #[test]
    fn repeated_reads_are_identical() {
        let x = (0..1000)
            .map(|i| (i as f64 * 0.37).sin())
            .collect::<SDouble>();
        let (m, e) = (x.mean(), x.error());
        for _ in 0..10 {
            assert_eq!(x.mean().to_bits(), m.to_bits());
            assert_eq!(x.error().to_bits(), e.to_bits());
        }
    }

    #[test]
    fn push_invalidates() {
        let mut x = SDouble::new();
        x.extend(vec![1., 2., 3.]);
        assert_eq!(x.mean(), 2.);
        x.push(6.);
        assert!(!x.is_finalized());
        assert_eq!(x.mean(), 3.);
        x <<= 3.;
        assert_eq!(x.mean(), 3.);
        assert_eq!(x.count(), 5);
    }

    #[test]
    fn degenerate() {
        let x = SDouble::new();
        assert!(x.mean().is_nan());
        assert!(x.error().is_nan());

        let x = SDouble::from_samples(&[7.]);
        assert_eq!(x.mean(), 7.);
        assert!(x.error().is_nan());
    }

    #[test]
    fn fixed_values() {
        let x = SDouble::with_error(10., 1.);
        assert!(x.is_finalized());
        assert_eq!(x.mean(), 10.);
        assert_eq!(x.error(), 1.);
        assert_eq!(x.count(), 0);
        assert!(x.samples().is_empty());
        assert!(x.standard_deviation().is_nan());
    }

    #[test]
    fn push_onto_fixed_starts_a_new_sample() {
        let mut x = SDouble::with_error(10., 1.);
        x.push(4.);
        x.push(6.);
        assert_eq!(x.samples(), &[4., 6.]);
        assert_eq!(x.mean(), 5.);
        assert_eq!(x.error(), 1.);
    }

    #[test]
    fn clone_before_or_after_finalizing() {
        let x = SDouble::from(vec![1., 4., 9., 16.]);
        let early = x.clone();
        let m = x.summary();
        let late = x.clone();
        assert!(!early.is_finalized());
        assert!(late.is_finalized());
        assert_eq!(early.summary(), m);
        assert_eq!(late.summary(), m);
    }

    #[test]
    fn binary_operators() {
        let a = SDouble::with_error(100., 3.);
        let b = SDouble::with_error(50., 1.);

        let sum = &a + &b;
        assert_eq!(sum.mean(), 150.);
        assert_eq!(sum.error(), 10.0_f64.sqrt());
        assert_abs_diff_eq!(sum.error(), 3.1623, epsilon = 1e-4);

        let diff = &a - &b;
        assert_eq!(diff.summary(), Summary::new(50., 10.0_f64.sqrt()));

        let prod = &a * &b;
        assert_eq!(prod.mean(), 5000.);
        assert_eq!(prod.error(), 32500.0_f64.sqrt());
        assert_abs_diff_eq!(prod.error(), 180.28, epsilon = 1e-2);

        let quot = a / b;
        assert_eq!(quot.mean(), 2.);
        assert_relative_eq!(quot.error(), 2. * 0.0013_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn results_have_no_samples() {
        let a = SDouble::from(vec![1., 2., 3.]);
        let b = SDouble::from(vec![4., 5., 6.]);
        let c = &a + &b;
        assert!(c.is_finalized());
        assert_eq!(c.count(), 0);
        assert_eq!(a.count(), 3);
        assert_eq!(b.samples(), &[4., 5., 6.]);
    }

    #[test]
    fn commutative() {
        let a = SDouble::from(vec![0.3, 1.7, 2.2, 0.9]);
        let b = SDouble::from(vec![-4., 8., 1.5]);
        assert_eq!((&a + &b).summary(), (&b + &a).summary());
        assert_eq!((&a * &b).summary(), (&b * &a).summary());
    }

    #[test]
    fn scalar_operators() {
        let a = SDouble::with_error(10., 1.);
        assert_eq!((&a + 2.).summary(), Summary::new(12., 1.));
        assert_eq!((2. + &a).summary(), Summary::new(12., 1.));
        assert_eq!((&a - 2.).summary(), Summary::new(8., 1.));
        assert_eq!((&a * 2.).summary(), Summary::new(20., 2.));
        assert_eq!((2. * &a).summary(), Summary::new(20., 2.));

        let r = 5. - &a;
        assert_eq!(r.summary(), Summary::new(-5., 1.));

        let a = SDouble::with_error(10., 2.);
        let r = 5. / a;
        assert_eq!(r.mean(), 0.5);
        assert_relative_eq!(r.error(), 0.1);
    }

    #[test]
    fn reversed_division_by_zero_scalar() {
        // The scalar is never a divisor, so a zero numerator is fine
        let r = 0. / SDouble::with_error(10., 2.);
        assert_eq!(r.summary(), Summary::new(0., 0.));
    }

    #[test]
    fn compound_assignment() {
        let x = SDouble::with_error(10., 1.);

        let mut y = x.clone();
        y += 1.;
        assert_eq!(y.summary(), Summary::new(11., 1.));

        let mut y = x.clone();
        y -= 1.;
        assert_eq!(y.summary(), Summary::new(9., 1.));

        let mut y = x.clone();
        y *= 2.;
        assert_eq!(y.summary(), Summary::new(20., 2.));

        let mut y = x.clone();
        y /= 2.;
        assert_eq!(y.mean(), 5.);
        assert_relative_eq!(y.error(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn compound_assignment_matches_binary() {
        let a = SDouble::from(vec![2., 3., 5., 7.]);
        let b = SDouble::from(vec![1., 1.5, 0.5]);

        let mut x = a.clone();
        x += &b;
        assert_eq!(x.summary(), (&a + &b).summary());
        let mut x = a.clone();
        x -= &b;
        assert_eq!(x.summary(), (&a - &b).summary());
        let mut x = a.clone();
        x *= &b;
        assert_eq!(x.summary(), (&a * &b).summary());
        let mut x = a.clone();
        x /= b.clone();
        assert_eq!(x.summary(), (&a / &b).summary());

        // the operand is untouched
        assert_eq!(b.samples(), &[1., 1.5, 0.5]);
        assert_eq!(b.mean(), 1.);
    }

    #[test]
    fn compound_assignment_drops_samples() {
        let mut x = SDouble::from(vec![1., 3.]);
        x += 1.;
        assert_eq!(x.count(), 0);
        assert_eq!(x.summary(), Summary::new(3., 1.));
    }

    #[test]
    fn display() {
        let x = SDouble::from(vec![1., 3.]);
        assert_eq!(x.to_string(), "2 +- 1");
        assert_eq!(format!("{:.3}", x), "2.000 +- 1.000");
        assert_eq!(SDouble::with_error(150., 0.5).to_string(), "150 +- 0.5");
    }
}
