//! Plot data assembler: the function curve plus optional derivative and integral curves over
//! one range, ready for an external renderer.
//!
//! The function curve is mandatory; a range problem fails the whole bundle. A derivative or
//! integral that the symbolic engine cannot produce is left out and reported in
//! `partial_failures`, the rest of the bundle is still returned.
use crate::numerical::sampler::{DEFAULT_POINTS, RangeError, SampleSet, sample, validate_range};
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use crate::symbolic::symbolic_engine_derivatives::DiffError;
use crate::symbolic::symbolic_integration::IntegrationError;
use crate::symbolic::symbolic_lambdify::Evaluator;
use log::{info, warn};
use std::fmt;
use tabled::{builder::Builder, settings::Style};

pub const MAX_DERIVATIVE_ORDER: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    pub include_derivative: bool,
    /// 1..=MAX_DERIVATIVE_ORDER, checked only when the derivative is requested
    pub derivative_order: usize,
    pub include_integral: bool,
    pub points: usize,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            include_derivative: true,
            derivative_order: 1,
            include_integral: true,
            points: DEFAULT_POINTS,
        }
    }
}

/// Fatal for the whole bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    Range(RangeError),
    DerivativeOrder(usize),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::Range(e) => write!(f, "{}", e),
            PlotError::DerivativeOrder(order) => write!(
                f,
                "Derivative order must be between 1 and {}, got {}",
                MAX_DERIVATIVE_ORDER, order
            ),
        }
    }
}

impl std::error::Error for PlotError {}

impl From<RangeError> for PlotError {
    fn from(e: RangeError) -> Self {
        PlotError::Range(e)
    }
}

/// An optional curve that could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialFailure {
    Derivative(DiffError),
    Integral(IntegrationError),
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialFailure::Derivative(e) => write!(f, "derivative omitted: {}", e),
            PartialFailure::Integral(e) => write!(f, "integral omitted: {}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotBundle {
    pub expr: Expr,
    pub derivative_order: usize,
    pub function: SampleSet,
    pub derivative: Option<SampleSet>,
    pub derivative_expr: Option<Expr>,
    /// shifted so that its first finite value is exactly 0
    pub integral: Option<SampleSet>,
    pub integral_expr: Option<Expr>,
    pub partial_failures: Vec<PartialFailure>,
}

impl PlotBundle {
    /// every requested curve is present
    pub fn is_complete(&self) -> bool {
        self.partial_failures.is_empty()
    }

    /// Per-curve statistics: expression, finite and NaN counts, finite min and max.
    pub fn summary_table(&self) -> String {
        let mut rows: Vec<Vec<String>> = vec![
            ["curve", "expression", "finite", "NaN", "min", "max"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ];
        rows.push(summary_row("f(x)", &self.expr, &self.function));
        if let (Some(set), Some(expr)) = (&self.derivative, &self.derivative_expr) {
            rows.push(summary_row(&format!("f^({})(x)", self.derivative_order), expr, set));
        }
        if let (Some(set), Some(expr)) = (&self.integral, &self.integral_expr) {
            rows.push(summary_row("F(x)", expr, set));
        }
        let mut table = Builder::from(rows).build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

fn summary_row(curve: &str, expr: &Expr, set: &SampleSet) -> Vec<String> {
    let (min, max) = match set.finite_bounds() {
        Some((lo, hi)) => (format!("{:.6}", lo), format!("{:.6}", hi)),
        None => ("-".to_string(), "-".to_string()),
    };
    vec![
        curve.to_string(),
        expr.to_string(),
        set.finite_count().to_string(),
        set.nan_count().to_string(),
        min,
        max,
    ]
}

/// Shifts the curve so that its first finite value becomes exactly 0.
/// Returns the subtracted constant; an all-NaN set is left as is.
pub fn normalize_integral(set: &mut SampleSet) -> Option<f64> {
    let first = set.first_finite()?;
    set.y.mapv_inplace(|y| y - first);
    Some(first)
}

/// Builds the plot data for `expr` over `[x_min, x_max]`.
///
/// # Examples
/// ```rust, ignore
/// let f = Expr::parse_expression("x**2 - 4*x + 4").unwrap();
/// let bundle = assemble(&f, -10.0, 10.0, &PlotOptions::default()).unwrap();
/// assert_eq!(bundle.integral.unwrap().first_finite(), Some(0.0));
/// ```
pub fn assemble(expr: &Expr, x_min: f64, x_max: f64, options: &PlotOptions) -> Result<PlotBundle, PlotError> {
    validate_range(x_min, x_max, options.points)?;
    if options.include_derivative
        && !(1..=MAX_DERIVATIVE_ORDER).contains(&options.derivative_order)
    {
        return Err(PlotError::DerivativeOrder(options.derivative_order));
    }
    let function = sample(&Evaluator::new(expr), x_min, x_max, options.points)?;
    let mut partial_failures = Vec::new();

    let (derivative, derivative_expr) = if options.include_derivative {
        match expr.n_th_derivative1D(DECLARED_VARIABLE, options.derivative_order) {
            Ok(d_expr) => {
                let set = sample(&Evaluator::new(&d_expr), x_min, x_max, options.points)?;
                (Some(set), Some(d_expr))
            }
            Err(e) => {
                warn!("derivative of {} omitted: {}", expr, e);
                partial_failures.push(PartialFailure::Derivative(e));
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let (integral, integral_expr) = if options.include_integral {
        match expr.antiderivative(DECLARED_VARIABLE) {
            Ok(i_expr) => {
                let mut set = sample(&Evaluator::new(&i_expr), x_min, x_max, options.points)?;
                if normalize_integral(&mut set).is_none() {
                    warn!("integral {} is undefined on [{}, {}]", i_expr, x_min, x_max);
                }
                (Some(set), Some(i_expr))
            }
            Err(e) => {
                warn!("integral of {} omitted: {}", expr, e);
                partial_failures.push(PartialFailure::Integral(e));
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    info!(
        "assembled plot data for {} on [{}, {}] with {} points",
        expr, x_min, x_max, options.points
    );
    Ok(PlotBundle {
        expr: expr.clone(),
        derivative_order: options.derivative_order,
        function,
        derivative,
        derivative_expr,
        integral,
        integral_expr,
        partial_failures,
    })
}
