//! The calculus core as seen by front ends: parse, classify, differentiate, integrate, assemble
//! and describe_concept, plus a few conveniences (compiled evaluators, the analysis report,
//! suggestions and keyword answers).
//!
//! Every function here is stateless; separate calls share nothing.
use crate::Utils::settings::SettingsError;
use crate::analysis::classifier;
use crate::analysis::concepts;
use crate::analysis::function_classes::FunctionClass;
use crate::numerical::plot_data::{self, PlotBundle, PlotError, PlotOptions};
use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use crate::symbolic::symbolic_engine_derivatives::DiffError;
use crate::symbolic::symbolic_integration::{Integral, IntegrationError};
use crate::symbolic::symbolic_lambdify::Evaluator;
use log::{debug, warn};
use std::fmt;
use std::io;

pub use crate::analysis::concepts::answer_calculus_question;
pub use crate::analysis::insights::{Suggestion, analyze_function, suggest_functions};

/// Any failure of the pipeline, for callers chaining the entry points with `?`.
#[derive(Debug)]
pub enum CalculusError {
    Parse(ParseError),
    Diff(DiffError),
    Integration(IntegrationError),
    Plot(PlotError),
    Settings(SettingsError),
    Io(io::Error),
}

impl fmt::Display for CalculusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculusError::Parse(e) => write!(f, "Parse error: {}", e),
            CalculusError::Diff(e) => write!(f, "Differentiation error: {}", e),
            CalculusError::Integration(e) => write!(f, "Integration error: {}", e),
            CalculusError::Plot(e) => write!(f, "Plot error: {}", e),
            CalculusError::Settings(e) => write!(f, "Settings error: {}", e),
            CalculusError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CalculusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalculusError::Parse(e) => Some(e),
            CalculusError::Diff(e) => Some(e),
            CalculusError::Integration(e) => Some(e),
            CalculusError::Plot(e) => Some(e),
            CalculusError::Settings(e) => Some(e),
            CalculusError::Io(e) => Some(e),
        }
    }
}

impl From<ParseError> for CalculusError {
    fn from(e: ParseError) -> Self {
        CalculusError::Parse(e)
    }
}

impl From<DiffError> for CalculusError {
    fn from(e: DiffError) -> Self {
        CalculusError::Diff(e)
    }
}

impl From<IntegrationError> for CalculusError {
    fn from(e: IntegrationError) -> Self {
        CalculusError::Integration(e)
    }
}

impl From<PlotError> for CalculusError {
    fn from(e: PlotError) -> Self {
        CalculusError::Plot(e)
    }
}

impl From<SettingsError> for CalculusError {
    fn from(e: SettingsError) -> Self {
        CalculusError::Settings(e)
    }
}

impl From<io::Error> for CalculusError {
    fn from(e: io::Error) -> Self {
        CalculusError::Io(e)
    }
}

/// Validated expression over `x`.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    match Expr::parse_expression(text) {
        Ok(expr) => {
            debug!("parsed '{}' as {}", text, expr);
            Ok(expr)
        }
        Err(e) => {
            warn!("cannot parse '{}': {}", text, e);
            Err(e)
        }
    }
}

/// Lexical family of the text as the user typed it.
pub fn classify(text: &str) -> FunctionClass {
    classifier::classify(text)
}

/// `order`-th derivative, `order >= 1`.
pub fn differentiate(expr: &Expr, order: usize) -> Result<Expr, DiffError> {
    expr.n_th_derivative1D(DECLARED_VARIABLE, order)
}

/// Indefinite integral (without `+ C`) unless both bounds are given, then the definite value.
pub fn integrate(expr: &Expr, lower: Option<f64>, upper: Option<f64>) -> Result<Integral, IntegrationError> {
    expr.integrate_with_bounds(DECLARED_VARIABLE, lower, upper)
}

pub fn to_evaluator(expr: &Expr) -> Evaluator {
    Evaluator::new(expr)
}

pub fn assemble(expr: &Expr, x_min: f64, x_max: f64, options: &PlotOptions) -> Result<PlotBundle, PlotError> {
    plot_data::assemble(expr, x_min, x_max, options)
}

pub fn describe_concept(query: &str) -> &'static str {
    concepts::describe_concept(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::sampler::{RangeError, sample};
    use crate::symbolic::utils::{linspace, numerical_derivative};
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_pipeline() {
        let text = "x**2 - 4*x + 4";
        let f = parse(text).unwrap();
        assert_eq!(classify(text), FunctionClass::Polynomial);
        assert_eq!(differentiate(&f, 1).unwrap().to_string(), "2 * x - 4");
        match integrate(&f, None, None).unwrap() {
            Integral::Indefinite(big_f) => {
                assert_eq!(big_f, parse("x**3/3 - 2*x**2 + 4*x").unwrap());
                assert_eq!(big_f.to_string(), "x**3 / 3 - 2 * x**2 + 4 * x");
            }
            other => panic!("expected an indefinite integral, got {:?}", other),
        }
    }

    #[test]
    fn test_trigonometric_pipeline() {
        let text = "sin(x) + cos(x)";
        assert!(parse(text).is_ok());
        assert_eq!(classify(text), FunctionClass::Trigonometric);
    }

    #[test]
    fn test_rational_sampling() {
        let text = "1/x";
        let f = parse(text).unwrap();
        assert_eq!(classify(text), FunctionClass::Rational);
        let set = sample(&to_evaluator(&f), -10.0, 10.0, 1000).unwrap();
        assert_eq!(set.nan_count(), 1);
        let nearest = set
            .x
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap();
        assert!(set.y[nearest].is_nan());
        assert_eq!(set.finite_count(), 999);
    }

    #[test]
    fn test_foreign_variable_is_rejected() {
        assert!(matches!(parse("y + 1"), Err(ParseError::UnknownVariable { .. })));
    }

    #[test]
    fn test_definite_and_single_bound() {
        let f = parse("x**2").unwrap();
        match integrate(&f, Some(0.0), Some(3.0)).unwrap() {
            Integral::Definite(value) => assert_relative_eq!(value, 9.0, epsilon = 1e-12),
            other => panic!("expected a definite integral, got {:?}", other),
        }
        // a single bound is ignored
        assert!(matches!(integrate(&f, Some(0.0), None).unwrap(), Integral::Indefinite(_)));
        assert!(matches!(
            integrate(&parse("1/x").unwrap(), Some(-1.0), Some(1.0)),
            Err(IntegrationError::Divergent { .. })
        ));
    }

    #[test]
    fn test_symbolic_derivative_matches_finite_differences() {
        for text in ["x**2 - 4*x + 4", "x**3 - 6*x**2 + 11*x - 6", "2*x**4 - 3*x**2 + 1"] {
            let f = parse(text).unwrap();
            let df = to_evaluator(&differentiate(&f, 1).unwrap());
            let xs = linspace(-3.0, 3.0, 61);
            let numeric = numerical_derivative(|x| to_evaluator(&f).call(x), &xs, 1e-5);
            for (x, n) in xs.iter().zip(numeric) {
                assert_relative_eq!(df.call(*x), n, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_assemble_errors() {
        let f = parse("x").unwrap();
        let err = assemble(&f, 2.0, 2.0, &PlotOptions::default()).unwrap_err();
        assert!(matches!(err, PlotError::Range(RangeError::Empty { .. })));
        let wrapped: CalculusError = err.into();
        assert!(wrapped.to_string().starts_with("Plot error: Empty range"));
    }

    #[test]
    fn test_integral_curves_start_at_zero() {
        for text in ["x**2 - 4*x + 4", "sin(x)", "exp(x)", "log(x)", "1/x", "tan(x)"] {
            let bundle = assemble(&parse(text).unwrap(), -5.0, 5.0, &PlotOptions::default()).unwrap();
            let integral = bundle.integral.unwrap();
            assert_eq!(integral.first_finite(), Some(0.0), "{}", text);
        }
    }

    #[test]
    fn test_describe_concept() {
        assert!(describe_concept("derivatives").starts_with("The derivative measures"));
        assert!(describe_concept("weather").starts_with("This is a concept in calculus."));
        assert!(answer_calculus_question("what is a maclaurin series").starts_with("A series is"));
        assert_eq!(suggest_functions().len(), 5);
        assert!(analyze_function("cos(x)").contains("This function is even"));
    }
}
