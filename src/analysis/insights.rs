//! Insights about a single function: symmetry, periodicity, real roots of plain polynomials,
//! and the canned report built from them.
use crate::analysis::classifier::classify;
use crate::analysis::function_classes::{FUNCTION_EXPLANATIONS, FunctionClass};
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use crate::symbolic::utils::linspace;
use nalgebra::DMatrix;
use tabled::Tabled;

const COEFFICIENT_TOL: f64 = 1e-12;
const ROOT_TOL: f64 = 1e-6;
const SYMMETRY_TOL: f64 = 1e-9;
/// minimal number of finite (f(x), f(-x)) pairs for a symmetry verdict
const MIN_SYMMETRY_PAIRS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// f(-x) = f(x)
    Even,
    /// f(-x) = -f(x)
    Odd,
}

/// Numeric symmetry check on a grid of positive points and their mirror images.
///
/// Pairs where either side is undefined are skipped; with too few defined pairs there is no
/// verdict. The zero function counts as even.
pub fn symmetry(expr: &Expr) -> Option<Symmetry> {
    let f = expr.lambdify1D(DECLARED_VARIABLE);
    let pairs: Vec<(f64, f64)> = linspace(0.05, 4.95, 50)
        .into_iter()
        .map(|x| (f(x), f(-x)))
        .filter(|(right, left)| right.is_finite() && left.is_finite())
        .collect();
    if pairs.len() < MIN_SYMMETRY_PAIRS {
        return None;
    }
    let close = |a: f64, b: f64| (a - b).abs() <= SYMMETRY_TOL * (1.0 + a.abs().max(b.abs()));
    if pairs.iter().all(|&(right, left)| close(left, right)) {
        Some(Symmetry::Even)
    } else if pairs.iter().all(|&(right, left)| close(left, -right)) {
        Some(Symmetry::Odd)
    } else {
        None
    }
}

/// Distinct real roots, ascending, from the eigenvalues of the companion matrix.
pub fn real_roots(coefficients: &[f64]) -> Vec<f64> {
    let mut coeffs = coefficients.to_vec();
    while coeffs.last().is_some_and(|c| c.abs() < COEFFICIENT_TOL) {
        coeffs.pop();
    }
    if coeffs.len() < 2 {
        return Vec::new();
    }
    let degree = coeffs.len() - 1;
    let leading = coeffs[degree];
    // first row -a_{n-1}/a_n ... -a_0/a_n, ones on the subdiagonal
    let companion = DMatrix::from_fn(degree, degree, |row, col| {
        if row == 0 {
            -coeffs[degree - 1 - col] / leading
        } else if row == col + 1 {
            1.0
        } else {
            0.0
        }
    });
    let mut roots: Vec<f64> = companion
        .complex_eigenvalues()
        .iter()
        .filter(|z| z.re.is_finite() && z.im.abs() <= ROOT_TOL * (1.0 + z.re.abs()))
        .map(|z| tidy(z.re))
        .collect();
    roots.sort_by(|a, b| a.total_cmp(b));
    roots.dedup_by(|a, b| (*a - *b).abs() <= ROOT_TOL * (1.0 + b.abs()));
    roots
}

/// rounds away eigenvalue noise, `-0` becomes `0`
fn tidy(value: f64) -> f64 {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Insight lines for the report, in display order.
pub fn insights(expr: &Expr, class: FunctionClass) -> Vec<String> {
    let mut lines = Vec::new();
    match symmetry(expr) {
        Some(Symmetry::Even) => {
            lines.push("This function is even: f(-x) = f(x). It's symmetric about the y-axis.".to_string())
        }
        Some(Symmetry::Odd) => {
            lines.push("This function is odd: f(-x) = -f(x). It's symmetric about the origin.".to_string())
        }
        None => {}
    }
    if class == FunctionClass::Trigonometric {
        lines.push("This is a trigonometric function, which is periodic in nature.".to_string());
    }
    if let Some(coefficients) = expr.polynomial_coefficients(DECLARED_VARIABLE) {
        let roots = real_roots(&coefficients);
        if !roots.is_empty() {
            let roots_str: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
            lines.push(format!("The function has roots (zeros) at x = {}.", roots_str.join(", ")));
        }
    }
    lines
}

/// Canned report: family explanation, insights, similar functions and properties.
///
/// Never fails; an unparsable text yields a short apology carrying the parse error.
pub fn analyze_function(text: &str) -> String {
    let expr = match Expr::parse_expression(text) {
        Ok(expr) => expr,
        Err(e) => {
            return format!(
                "I couldn't fully analyze this function due to its complexity. Basic error: {}",
                e
            );
        }
    };
    let class = classify(text);
    let info = class.info();
    let mut report = format!("{}\n\n", info.explanation);
    let lines = insights(&expr, class);
    if !lines.is_empty() {
        report.push_str(&format!("Insights:\n{}\n\n", lines.join("\n")));
    }
    if !info.examples.is_empty() {
        report.push_str(&format!("Similar functions:\n{}\n\n", info.examples.join(", ")));
    }
    report.push_str(&format!("Properties: {}", info.properties));
    report
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct Suggestion {
    pub category: String,
    pub example: &'static str,
}

/// One suggestion per family: its capitalised name and first example.
pub fn suggest_functions() -> Vec<Suggestion> {
    FUNCTION_EXPLANATIONS
        .iter()
        .filter_map(|(class, info)| {
            info.examples.first().map(|example| Suggestion {
                category: class.capitalized(),
                example,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Expr {
        Expr::parse_expression(text).unwrap()
    }

    #[test]
    fn test_symmetry() {
        assert_eq!(symmetry(&parse("cos(x)")), Some(Symmetry::Even));
        assert_eq!(symmetry(&parse("x**4 - 3*x**2")), Some(Symmetry::Even));
        assert_eq!(symmetry(&parse("sin(x)")), Some(Symmetry::Odd));
        assert_eq!(symmetry(&parse("1/x")), Some(Symmetry::Odd));
        assert_eq!(symmetry(&parse("x**2 - 4*x + 4")), None);
        // undefined for negative x
        assert_eq!(symmetry(&parse("log(x)")), None);
    }

    #[test]
    fn test_factored_polynomial_roots() {
        let report = analyze_function("(x - 1)*(x + 1)");
        assert!(report.contains("The function has roots (zeros) at x = -1, 1."));
    }

    #[test]
    fn test_real_roots() {
        let roots = real_roots(&[-6.0, 11.0, -6.0, 1.0]);
        assert_eq!(roots.len(), 3);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert_relative_eq!(*root, expected, epsilon = 1e-9);
        }
        // double root reported once
        assert_eq!(real_roots(&[4.0, -4.0, 1.0]), vec![2.0]);
        // x**2 + 1 has no real roots
        assert!(real_roots(&[1.0, 0.0, 1.0]).is_empty());
        assert_eq!(real_roots(&[3.0, 2.0]), vec![-1.5]);
        assert!(real_roots(&[5.0]).is_empty());
        assert!(real_roots(&[0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_analyze_polynomial() {
        let report = analyze_function("x**3 - 6*x**2 + 11*x - 6");
        assert!(report.starts_with("Polynomial functions are expressions"));
        assert!(report.contains("Insights:\nThe function has roots (zeros) at x = 1, 2, 3.\n\n"));
        assert!(report.contains("Similar functions:\nx**2 - 4*x + 4, x**3 - 6*x**2 + 11*x - 6, 2*x**4 - 3*x**2 + 1\n\n"));
        assert!(report.ends_with("The highest exponent determines the degree of the polynomial."));
    }

    #[test]
    fn test_analyze_trigonometric() {
        let report = analyze_function("sin(x)");
        assert!(report.contains(
            "Insights:\nThis function is odd: f(-x) = -f(x). It's symmetric about the origin.\nThis is a trigonometric function, which is periodic in nature.\n\n"
        ));
        assert!(report.contains("Properties: Trigonometric functions are periodic"));
    }

    #[test]
    fn test_analyze_without_insights() {
        let report = analyze_function("log(x)");
        assert!(!report.contains("Insights:"));
        assert!(report.contains("Similar functions:\nlog(x), log(x, 10), ln(x)\n\n"));
    }

    #[test]
    fn test_analyze_failure() {
        let report = analyze_function("y + 1");
        assert!(report.starts_with("I couldn't fully analyze this function due to its complexity. Basic error: "));
        assert!(report.contains("'y'"));
    }

    #[test]
    fn test_suggest_functions() {
        let suggestions = suggest_functions();
        assert_eq!(suggestions.len(), 5);
        assert_eq!(
            suggestions[0],
            Suggestion {
                category: "Polynomial".to_string(),
                example: "x**2 - 4*x + 4"
            }
        );
        assert_eq!(suggestions[4].category, "Rational");
        assert_eq!(suggestions[4].example, "1/x");
    }
}
