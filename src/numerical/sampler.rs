//! Numeric sampler: evaluates a compiled expression on an evenly spaced grid.
//!
//! A failed point never aborts the curve. The whole grid is first evaluated in one vectorised
//! pass; if any value comes back non-finite the grid is evaluated again point by point with the
//! checked closure and every failure becomes NaN. Finally the singularity guard blanks the grid
//! point nearest to each sign change of a pole factor, so a curve like `1/x` is never drawn as a
//! continuous line through its pole. A zero the function stays bounded next to (`sin(x)/x` at 0)
//! is removable and left alone.
//!
//! [`find_pole`] answers the stricter question asked by definite integration: is there any pole
//! on the interval, including even-order ones like `1/x**2` that never change sign.
use crate::symbolic::symbolic_lambdify::Evaluator;
use crate::symbolic::utils::linspace;
use log::debug;
use ndarray::Array1;
use std::fmt;

pub const DEFAULT_POINTS: usize = 1000;
/// distance from a located zero, relative to the grid step, at which the function is sampled
const ZERO_OFFSET: f64 = 1e-6;
/// a zero is a pole when |f| next to it exceeds its grid neighbours by this factor
const POLE_GROWTH: f64 = 10.0;
/// |p| at a refined minimum below this fraction of max |p| on the grid counts as a zero
const ZERO_TOL: f64 = 1e-10;
const GOLDEN_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum RangeError {
    /// x_min == x_max
    Empty { x_min: f64, x_max: f64 },
    /// x_min > x_max
    Inverted { x_min: f64, x_max: f64 },
    NonFinite,
    /// zero sample points requested
    NoPoints,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::Empty { x_min, x_max } => {
                write!(f, "Empty range: x_min ({}) equals x_max ({})", x_min, x_max)
            }
            RangeError::Inverted { x_min, x_max } => write!(
                f,
                "Inverted range: x_min ({}) is greater than x_max ({})",
                x_min, x_max
            ),
            RangeError::NonFinite => write!(f, "Range bounds must be finite numbers"),
            RangeError::NoPoints => write!(f, "At least one sample point is required"),
        }
    }
}

impl std::error::Error for RangeError {}

/// Ordered (x, y) samples over a closed interval; `y` is NaN where the function is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn finite_count(&self) -> usize {
        self.y.iter().filter(|y| y.is_finite()).count()
    }

    pub fn nan_count(&self) -> usize {
        self.y.iter().filter(|y| y.is_nan()).count()
    }

    pub fn first_finite(&self) -> Option<f64> {
        self.y.iter().copied().find(|y| y.is_finite())
    }

    /// (min, max) over the finite values
    pub fn finite_bounds(&self) -> Option<(f64, f64)> {
        self.y
            .iter()
            .copied()
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }

    /// `(x_i, y_i)` pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Checks the bounds and the point count. Bounds are never swapped here.
pub fn validate_range(x_min: f64, x_max: f64, n: usize) -> Result<(), RangeError> {
    if !x_min.is_finite() || !x_max.is_finite() {
        return Err(RangeError::NonFinite);
    }
    if x_min == x_max {
        return Err(RangeError::Empty { x_min, x_max });
    }
    if x_min > x_max {
        return Err(RangeError::Inverted { x_min, x_max });
    }
    if n == 0 {
        return Err(RangeError::NoPoints);
    }
    Ok(())
}

/// Samples `evaluator` at `n` evenly spaced points from `x_min` to `x_max` inclusive.
///
/// # Examples
/// ```rust, ignore
/// let f = Evaluator::new(&Expr::parse_expression("1/x").unwrap());
/// let set = sample(&f, -10.0, 10.0, 1000).unwrap();
/// assert_eq!(set.nan_count(), 1);
/// ```
pub fn sample(evaluator: &Evaluator, x_min: f64, x_max: f64, n: usize) -> Result<SampleSet, RangeError> {
    validate_range(x_min, x_max, n)?;
    let x = Array1::from(linspace(x_min, x_max, n));
    let mut y = match evaluator.eval_array(&x) {
        Ok(y) => y,
        Err(e) => {
            debug!(
                "vectorised evaluation of {} failed ({}), evaluating point by point",
                evaluator.expr(),
                e
            );
            x.mapv(|xi| evaluator.eval_checked(xi).unwrap_or(f64::NAN))
        }
    };
    let masked = mask_singularities(evaluator, &x, &mut y);
    if masked > 0 {
        debug!("{} sample(s) of {} blanked at poles", masked, evaluator.expr());
    }
    Ok(SampleSet { x, y })
}

/// Blanks the sample nearest to every strict sign change of a pole factor between two adjacent
/// finite samples. The zero is located by linear interpolation; a tie goes to the lower index.
/// Removable zeros are skipped. Returns the number of samples newly set to NaN.
pub fn mask_singularities(evaluator: &Evaluator, x: &Array1<f64>, y: &mut Array1<f64>) -> usize {
    if !evaluator.has_poles() || x.len() < 2 {
        return 0;
    }
    let mut to_mask = Vec::new();
    for pole in evaluator.pole_values(x) {
        for i in 0..x.len() - 1 {
            let (p0, p1) = (pole[i], pole[i + 1]);
            if !(p0.is_finite() && p1.is_finite()) || !(y[i].is_finite() && y[i + 1].is_finite()) {
                continue;
            }
            if p0 * p1 < 0.0 {
                let zero = x[i] - p0 * (x[i + 1] - x[i]) / (p1 - p0);
                if is_removable(evaluator, zero, x[i + 1] - x[i], y[i], y[i + 1]) {
                    continue;
                }
                let nearest = if zero - x[i] <= x[i + 1] - zero { i } else { i + 1 };
                to_mask.push(nearest);
            }
        }
    }
    let mut masked = 0;
    for i in to_mask {
        if !y[i].is_nan() {
            y[i] = f64::NAN;
            masked += 1;
        }
    }
    masked
}

/// True when `f` stays of the size of its grid neighbours on both sides of `zero`.
fn is_removable(evaluator: &Evaluator, zero: f64, step: f64, y0: f64, y1: f64) -> bool {
    let delta = ZERO_OFFSET * step.abs().max(f64::EPSILON);
    let bound = POLE_GROWTH * y0.abs().max(y1.abs()).max(1.0);
    [zero - delta, zero + delta].iter().all(|&t| {
        let value = evaluator.call(t);
        value.is_finite() && value.abs() <= bound
    })
}

/// Location of a non-removable pole on `[a, b]`, `a < b`, if there is one.
///
/// Every pole factor is evaluated on an `n`-point grid. A factor that is zero on the grid, or
/// changes sign between neighbours, has a zero there. A local minimum of |p| is refined by
/// golden-section search and accepted when |p| drops to `ZERO_TOL` of its largest grid value,
/// which catches zeros of even multiplicity. Candidates where the function stays bounded are
/// removable and skipped.
pub fn find_pole(evaluator: &Evaluator, a: f64, b: f64, n: usize) -> Option<f64> {
    if !evaluator.has_poles() || n < 2 || !(a < b) {
        return None;
    }
    let x = Array1::from(linspace(a, b, n));
    let step = (b - a) / (n - 1) as f64;
    let y = x.mapv(|xi| evaluator.call(xi));
    let neighbours = |i: usize| {
        let left = if i > 0 { y[i - 1] } else { f64::NAN };
        let right = if i + 1 < n { y[i + 1] } else { f64::NAN };
        (finite_or_zero(left), finite_or_zero(right))
    };
    for pole in evaluator.pole_functions() {
        let p = x.mapv(|xi| pole(xi));
        let scale = p.iter().filter(|v| v.is_finite()).fold(0.0f64, |m, v| m.max(v.abs()));
        for i in 0..n {
            if !p[i].is_finite() {
                continue;
            }
            if p[i] == 0.0 {
                let (y0, y1) = neighbours(i);
                if !is_removable(evaluator, x[i], step, y0, y1) {
                    return Some(x[i]);
                }
                continue;
            }
            if i + 1 < n && p[i + 1].is_finite() && p[i] * p[i + 1] < 0.0 {
                let zero = x[i] - p[i] * (x[i + 1] - x[i]) / (p[i + 1] - p[i]);
                if !is_removable(evaluator, zero, step, finite_or_zero(y[i]), finite_or_zero(y[i + 1])) {
                    return Some(zero);
                }
                continue;
            }
            let left = if i > 0 { p[i - 1].abs() } else { f64::INFINITY };
            let right = if i + 1 < n { p[i + 1].abs() } else { f64::INFINITY };
            if p[i].abs() <= left && p[i].abs() <= right {
                let lo = x[i.saturating_sub(1)];
                let hi = x[(i + 1).min(n - 1)];
                let candidate = golden_section_min(|t| pole(t).abs(), lo, hi);
                if pole(candidate).abs() <= ZERO_TOL * scale.max(1.0) {
                    let (y0, y1) = neighbours(i);
                    if !is_removable(evaluator, candidate, step, y0.max(finite_or_zero(y[i])), y1) {
                        return Some(candidate);
                    }
                }
            }
        }
    }
    None
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Minimiser of a unimodal `f` on `[lo, hi]`.
fn golden_section_min(f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> f64 {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (lo, hi);
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let (mut fc, mut fd) = (f(c), f(d));
    for _ in 0..GOLDEN_ITERATIONS {
        if (b - a).abs() <= f64::EPSILON * (1.0 + a.abs().max(b.abs())) {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - ratio * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ratio * (b - a);
            fd = f(d);
        }
    }
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;

    fn evaluator(text: &str) -> Evaluator {
        Evaluator::new(&Expr::parse_expression(text).unwrap())
    }

    #[test]
    fn test_grid_endpoints_and_values() {
        let set = sample(&evaluator("x**2"), -2.0, 2.0, 5).unwrap();
        assert_eq!(set.x.to_vec(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(set.y.to_vec(), vec![4.0, 1.0, 0.0, 1.0, 4.0]);
        assert_eq!(set.finite_count(), 5);
    }

    #[test]
    fn test_single_point() {
        let set = sample(&evaluator("x + 1"), 3.0, 4.0, 1).unwrap();
        assert_eq!(set.x.to_vec(), vec![3.0]);
        assert_eq!(set.y.to_vec(), vec![4.0]);
    }

    #[test]
    fn test_reciprocal_has_exactly_one_nan_nearest_zero() {
        let set = sample(&evaluator("1/x"), -10.0, 10.0, 1000).unwrap();
        assert_eq!(set.len(), 1000);
        assert_eq!(set.nan_count(), 1);
        let nan_index = set.y.iter().position(|y| y.is_nan()).unwrap();
        let mut nearest = 0;
        for (i, xi) in set.x.iter().enumerate() {
            if xi.abs() < set.x[nearest].abs() {
                nearest = i;
            }
        }
        assert_eq!(nan_index, nearest);
        assert_eq!(set.finite_count(), 999);
    }

    #[test]
    fn test_domain_failures_become_nan() {
        let set = sample(&evaluator("log(x)"), -1.0, 1.0, 5).unwrap();
        // -1, -0.5, 0 are outside the domain; 0.5 and 1 are fine
        assert!(set.y[0].is_nan() && set.y[1].is_nan() && set.y[2].is_nan());
        assert_relative_eq!(set.y[3], 0.5f64.ln());
        assert_relative_eq!(set.y[4], 0.0);
    }

    #[test]
    fn test_pole_on_grid_point() {
        let set = sample(&evaluator("1/x"), -1.0, 1.0, 3).unwrap();
        assert!(set.y[1].is_nan());
        assert_eq!(set.nan_count(), 1);
    }

    #[test]
    fn test_tangent_poles_are_blanked() {
        let set = sample(&evaluator("tan(x)"), -3.0, 3.0, 601).unwrap();
        // poles at -pi/2 and pi/2
        assert_eq!(set.nan_count(), 2);
    }

    #[test]
    fn test_removable_singularity_is_not_blanked() {
        let set = sample(&evaluator("sin(x)/x"), -10.0, 10.0, 1000).unwrap();
        assert_eq!(set.nan_count(), 0);
        // a genuine pole behind a vanishing numerator is still blanked
        let set = sample(&evaluator("x/x**3"), -10.0, 10.0, 1000).unwrap();
        assert_eq!(set.nan_count(), 1);
        let set = sample(&evaluator("x/(x**2 - 0.5)"), -10.0, 10.0, 1000).unwrap();
        assert_eq!(set.nan_count(), 2);
    }

    #[test]
    fn test_find_pole() {
        // even order pole between grid points
        let pole = find_pole(&evaluator("1/x**2"), -1.0, 2.0, 2001).unwrap();
        assert!(pole.abs() < 1e-6);
        let pole = find_pole(&evaluator("1/(x - 0.3)**2"), -1.0, 2.0, 2001).unwrap();
        assert_relative_eq!(pole, 0.3, epsilon = 1e-6);
        assert!(find_pole(&evaluator("1/x"), -1.0, 2.0, 2001).is_some());
        assert!(find_pole(&evaluator("tan(x)"), 1.0, 2.0, 2001).is_some());
        assert_eq!(find_pole(&evaluator("1/x**2"), 1.0, 2.0, 2001), None);
        assert_eq!(find_pole(&evaluator("1/(x**2 + 1)"), -3.0, 3.0, 2001), None);
        assert_eq!(find_pole(&evaluator("sin(x)/x"), -1.0, 2.0, 2001), None);
        assert_eq!(find_pole(&evaluator("x**2"), -1.0, 2.0, 2001), None);
    }

    #[test]
    fn test_range_errors() {
        let f = evaluator("x");
        assert_eq!(
            sample(&f, 1.0, 1.0, 10).unwrap_err(),
            RangeError::Empty { x_min: 1.0, x_max: 1.0 }
        );
        assert_eq!(
            sample(&f, 2.0, 1.0, 10).unwrap_err(),
            RangeError::Inverted { x_min: 2.0, x_max: 1.0 }
        );
        assert_eq!(sample(&f, f64::NEG_INFINITY, 1.0, 10).unwrap_err(), RangeError::NonFinite);
        assert_eq!(sample(&f, 0.0, 1.0, 0).unwrap_err(), RangeError::NoPoints);
    }
}
