//! Numeric cross-checks of the symbolic results: finite-difference derivatives and
//! Gauss-Legendre quadrature.
use crate::numerical::sampler::{RangeError, validate_range};
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use crate::symbolic::symbolic_engine_derivatives::DiffError;
use crate::symbolic::utils::{linspace, max_abs_deviation, numerical_derivative};
use gauss_quad::GaussLegendre;
use std::fmt;

/// step of the central differences
pub const DIFFERENCE_STEP: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub enum CrossCheckError {
    Diff(DiffError),
    Range(RangeError),
    Quadrature(String),
    /// no grid point where both derivatives are finite
    NoComparablePoints,
}

impl fmt::Display for CrossCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossCheckError::Diff(e) => write!(f, "{}", e),
            CrossCheckError::Range(e) => write!(f, "{}", e),
            CrossCheckError::Quadrature(msg) => write!(f, "Quadrature failed: {}", msg),
            CrossCheckError::NoComparablePoints => {
                write!(f, "No grid point where both derivatives are defined")
            }
        }
    }
}

impl std::error::Error for CrossCheckError {}

impl From<DiffError> for CrossCheckError {
    fn from(e: DiffError) -> Self {
        CrossCheckError::Diff(e)
    }
}

impl From<RangeError> for CrossCheckError {
    fn from(e: RangeError) -> Self {
        CrossCheckError::Range(e)
    }
}

/// Largest |symbolic f'(x) - central difference| over `n` grid points of `[x_min, x_max]`.
pub fn compare_with_numeric_derivative(
    expr: &Expr,
    x_min: f64,
    x_max: f64,
    n: usize,
) -> Result<f64, CrossCheckError> {
    validate_range(x_min, x_max, n)?;
    let derivative = expr.n_th_derivative1D(DECLARED_VARIABLE, 1)?;
    let xs = linspace(x_min, x_max, n);
    let f = expr.lambdify1D(DECLARED_VARIABLE);
    let df = derivative.lambdify1D(DECLARED_VARIABLE);
    let numeric = numerical_derivative(&f, &xs, DIFFERENCE_STEP);
    let symbolic: Vec<f64> = xs.iter().map(|&x| df(x)).collect();
    max_abs_deviation(&symbolic, &numeric).ok_or(CrossCheckError::NoComparablePoints)
}

/// Definite integral of `expr` over `[a, b]` by Gauss-Legendre quadrature with `degree` nodes.
pub fn numerical_integral(expr: &Expr, a: f64, b: f64, degree: usize) -> Result<f64, CrossCheckError> {
    if !a.is_finite() || !b.is_finite() {
        return Err(CrossCheckError::Range(RangeError::NonFinite));
    }
    let f = expr.lambdify1D(DECLARED_VARIABLE);
    let quad = GaussLegendre::new(degree)
        .map_err(|e| CrossCheckError::Quadrature(format!("{:?}", e)))?;
    Ok(quad.integrate(a, b, &f))
}
