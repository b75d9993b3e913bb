//! # Symbolic Integration Module
//!
//! Rule based indefinite integration of [`Expr`] trees, plus definite integration through the
//! fundamental theorem of calculus.
//!
//! Covered closed forms: polynomials in any written form, constants, sums and differences,
//! constant multiples, division by constants, power rule (any constant exponent, linear bases,
//! also as `c/(ax+b)^n`), `c^u`, `exp`/`sin`/`cos`/`tan`/
//! `log`/`sqrt`/`abs` of linear arguments, `x^n * e^u`, `x^n * ln x`, `f'/f -> ln|f|`.
//! Anything else is reported as [`IntegrationError::NoClosedForm`]; nothing is ever silently
//! returned unintegrated.
use crate::numerical::sampler::{find_pole, sample};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::Evaluator;
use crate::symbolic::symbolic_simplify::{MAX_POLYNOMIAL_DEGREE, split_coefficient};
use std::fmt;

/// grid used to look for points where a definite integrand is undefined
const DIVERGENCE_SAMPLE_POINTS: usize = 2001;

#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// no elementary antiderivative is known for the named sub-expression
    NoClosedForm(String),
    /// the integrand is undefined somewhere on [lower, upper], or the antiderivative blows up at a bound
    Divergent { lower: f64, upper: f64 },
    InvalidBounds { lower: f64, upper: f64 },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationError::NoClosedForm(expr) => {
                write!(f, "No closed-form antiderivative found for {}", expr)
            }
            IntegrationError::Divergent { lower, upper } => write!(
                f,
                "The integral diverges or is undefined on [{}, {}]",
                lower, upper
            ),
            IntegrationError::InvalidBounds { lower, upper } => {
                write!(f, "Invalid integration bounds [{}, {}]", lower, upper)
            }
        }
    }
}

impl std::error::Error for IntegrationError {}

/// Result of `integrate`: an antiderivative (additive constant omitted) or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Integral {
    Indefinite(Expr),
    Definite(f64),
}

fn no_closed_form(expr: &Expr) -> IntegrationError {
    IntegrationError::NoClosedForm(expr.to_string())
}

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Simplified antiderivative: the integrand is simplified first so that the rules see
    /// canonical shapes, the result is simplified again.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x**2 - 4*x + 4").unwrap();
    /// assert_eq!(f.antiderivative("x").unwrap().to_string(), "x**3 / 3 - 2 * x**2 + 4 * x");
    /// ```
    pub fn antiderivative(&self, var: &str) -> Result<Expr, IntegrationError> {
        Ok(self.simplify().integrate(var)?.simplify())
    }

    /// Indefinite integral without the constant of integration. The result is not simplified.
    pub fn integrate(&self, var: &str) -> Result<Expr, IntegrationError> {
        if !self.contains_variable(var) {
            // ∫ c dx = c*x
            return Ok(self.clone() * Expr::Var(var.to_string()));
        }
        // any polynomial, factored or nested, term by term
        if let Some(coefficients) = self.polynomial_coefficients(var) {
            let mut integrated = vec![0.0];
            integrated.extend(coefficients.iter().enumerate().map(|(k, a)| a / (k + 1) as f64));
            return Ok(Expr::from_coefficients(&integrated, var));
        }
        match self {
            // ∫ x dx = x²/2
            Expr::Var(_) => Ok(Expr::Var(var.to_string()).pow(Expr::Const(2.0)) / Expr::Const(2.0)),

            Expr::Const(_) => Ok(self.clone() * Expr::Var(var.to_string())),

            // ∫ (f + g) dx = ∫ f dx + ∫ g dx
            Expr::Add(lhs, rhs) => Ok(lhs.integrate(var)? + rhs.integrate(var)?),

            // ∫ (f - g) dx = ∫ f dx - ∫ g dx
            Expr::Sub(lhs, rhs) => Ok(lhs.integrate(var)? - rhs.integrate(var)?),

            Expr::Mul(lhs, rhs) => self.integrate_multiplication(lhs, rhs, var),

            Expr::Div(lhs, rhs) => self.integrate_division(lhs, rhs, var),

            Expr::Pow(base, exp) => self.integrate_power(base, exp, var),

            // ∫ e^(ax+b) dx = e^(ax+b)/a
            Expr::Exp(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                Ok(scale(self.clone(), a))
            }

            Expr::Ln(arg) => self.integrate_logarithm(arg, var),

            // ∫ sin(ax+b) dx = -cos(ax+b)/a
            Expr::sin(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                Ok(scale(-Expr::cos(arg.clone()), a))
            }

            // ∫ cos(ax+b) dx = sin(ax+b)/a
            Expr::cos(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                Ok(scale(Expr::sin(arg.clone()), a))
            }

            // ∫ tan(ax+b) dx = -ln|cos(ax+b)|/a
            Expr::tg(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                let cos_u = Expr::cos(arg.clone());
                Ok(scale(-Expr::abs(cos_u.boxed()).ln(), a))
            }

            // ∫ sqrt(ax+b) dx = 2/3 (ax+b)^(3/2) / a
            Expr::sqrt(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                let u = arg.as_ref().clone();
                Ok(Expr::Const(2.0 / (3.0 * a)) * u.pow(Expr::Const(1.5)))
            }

            // ∫ |ax+b| dx = (ax+b)|ax+b| / 2a
            Expr::abs(arg) => {
                let (a, _) = linear_coefficients(arg, var).ok_or_else(|| no_closed_form(self))?;
                let u = arg.as_ref().clone();
                Ok((u * self.clone()) / Expr::Const(2.0 * a))
            }
        }
    }

    /// constant factors, then the integration by parts families
    fn integrate_multiplication(&self, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Expr, IntegrationError> {
        // ∫ c*f dx = c*∫ f dx
        if !lhs.contains_variable(var) {
            return Ok(lhs.clone() * rhs.integrate(var)?);
        }
        if !rhs.contains_variable(var) {
            return Ok(rhs.clone() * lhs.integrate(var)?);
        }

        // Pattern 1: x^n * exp(ax+b), both orders
        if let Some(result) = integrate_polynomial_times_exponential(lhs, rhs, var)
            .or_else(|| integrate_polynomial_times_exponential(rhs, lhs, var))
        {
            return Ok(result);
        }

        // Pattern 2: x^n * ln(x), both orders
        if let Some(result) = integrate_polynomial_times_logarithm(lhs, rhs, var)
            .or_else(|| integrate_polynomial_times_logarithm(rhs, lhs, var))
        {
            return Ok(result);
        }

        Err(no_closed_form(self))
    }

    fn integrate_division(&self, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Expr, IntegrationError> {
        // ∫ f/c dx = (∫ f dx)/c
        if !rhs.contains_variable(var) {
            return Ok(lhs.integrate(var)? / rhs.clone());
        }

        // ∫ c/(ax+b)^n dx = c ∫ (ax+b)^(-n) dx
        if !lhs.contains_variable(var) {
            if let Expr::Pow(base, exp) = rhs {
                if let Expr::Const(n) = exp.as_ref() {
                    let negated = Expr::Const(-n);
                    let reciprocal = base.as_ref().clone().pow(negated.clone());
                    if let Ok(result) = reciprocal.integrate_power(base, &negated, var) {
                        return Ok(lhs.clone() * result);
                    }
                }
            }
        }

        // ∫ ln(x)/x dx = ln(x)²/2
        if let (Expr::Ln(inner), Expr::Var(name)) = (lhs, rhs) {
            if name == var && matches!(inner.as_ref(), Expr::Var(v) if v == var) {
                return Ok(lhs.clone().pow(Expr::Const(2.0)) / Expr::Const(2.0));
            }
        }

        // ∫ k*f'/f dx = k*ln|f|, which covers 1/x and 1/(ax+b)
        let derivative = rhs.diff(var).simplify();
        let numerator = lhs.simplify();
        let (c_num, rest_num) = split_coefficient(&numerator);
        let (c_der, rest_der) = split_coefficient(&derivative);
        if c_der != 0.0 && rest_num == rest_der {
            let log_f = Expr::abs(Box::new(rhs.clone())).ln();
            let ratio = c_num / c_der;
            return Ok(if ratio == 1.0 {
                log_f
            } else {
                Expr::Const(ratio) * log_f
            });
        }

        Err(no_closed_form(self))
    }

    fn integrate_power(&self, base: &Expr, exp: &Expr, var: &str) -> Result<Expr, IntegrationError> {
        match (base.contains_variable(var), exp.contains_variable(var)) {
            // ∫ (ax+b)^n dx = (ax+b)^(n+1) / (a(n+1)), n = -1 gives ln|ax+b|/a
            (true, false) => {
                let Expr::Const(n) = exp else {
                    return Err(no_closed_form(self));
                };
                let (a, _) = linear_coefficients(base, var).ok_or_else(|| no_closed_form(self))?;
                if matches!(base, Expr::Var(name) if name == var) {
                    return Ok(integrate_power_simple(*n, var));
                }
                let u = base.clone();
                if *n == -1.0 {
                    return Ok(scale(Expr::abs(Box::new(u)).ln(), a));
                }
                Ok(u.pow(Expr::Const(n + 1.0)) / Expr::Const(a * (n + 1.0)))
            }
            // ∫ c^(ax+b) dx = c^(ax+b) / (a ln c)
            (false, true) => {
                let (a, _) = linear_coefficients(exp, var).ok_or_else(|| no_closed_form(self))?;
                match base {
                    Expr::Const(c) if *c > 0.0 && *c != 1.0 => {
                        let denominator = if a == 1.0 {
                            base.clone().ln()
                        } else {
                            Expr::Const(a) * base.clone().ln()
                        };
                        Ok(self.clone() / denominator)
                    }
                    _ => Err(no_closed_form(self)),
                }
            }
            _ => Err(no_closed_form(self)),
        }
    }

    fn integrate_logarithm(&self, arg: &Expr, var: &str) -> Result<Expr, IntegrationError> {
        // ∫ ln(x) dx = x*ln(x) - x
        if let Expr::Var(name) = arg {
            if name == var {
                let x = Expr::Var(var.to_string());
                return Ok(x.clone() * x.clone().ln() - x);
            }
        }
        // ∫ ln(u) dx = (u ln(u) - u)/a for u = ax+b, the same with ln|u|
        let inner = match arg {
            Expr::abs(inner) => inner.as_ref(),
            other => other,
        };
        let (a, _) = linear_coefficients(inner, var).ok_or_else(|| no_closed_form(self))?;
        let u = inner.clone();
        Ok(scale(u.clone() * self.clone() - u, a))
    }

    //___________________________________DEFINITE INTEGRALS____________________________________

    /// Definite integration using the fundamental theorem of calculus.
    ///
    /// Fails with `Divergent` if the integrand is undefined anywhere on the closed interval (the
    /// interval is sampled with the singularity guard and searched for zeros of every pole
    /// factor) or if the antiderivative is not finite at a bound.
    pub fn definite_integrate(&self, var: &str, lower: f64, upper: f64) -> Result<f64, IntegrationError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(IntegrationError::InvalidBounds { lower, upper });
        }
        let antiderivative = self.antiderivative(var)?;
        if lower == upper {
            return Ok(0.0);
        }
        let (a, b) = if lower < upper { (lower, upper) } else { (upper, lower) };
        let integrand = Evaluator::with_variable(self, var);
        let coarse = sample(&integrand, a, b, DIVERGENCE_SAMPLE_POINTS)
            .map_err(|_| IntegrationError::InvalidBounds { lower, upper })?;
        if coarse.y.iter().any(|y| y.is_nan()) {
            return Err(IntegrationError::Divergent { lower, upper });
        }
        // even-order poles never change sign, so the sampled curve alone misses them
        if find_pole(&integrand, a, b, DIVERGENCE_SAMPLE_POINTS).is_some() {
            return Err(IntegrationError::Divergent { lower, upper });
        }
        let primitive = Evaluator::with_variable(&antiderivative, var);
        let upper_val = primitive.call(upper);
        let lower_val = primitive.call(lower);
        if !upper_val.is_finite() || !lower_val.is_finite() {
            return Err(IntegrationError::Divergent { lower, upper });
        }
        Ok(upper_val - lower_val)
    }

    /// Indefinite integral unless both bounds are given; a single bound is ignored.
    pub fn integrate_with_bounds(
        &self,
        var: &str,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<Integral, IntegrationError> {
        match (lower, upper) {
            (Some(lower), Some(upper)) => {
                Ok(Integral::Definite(self.definite_integrate(var, lower, upper)?))
            }
            _ => Ok(Integral::Indefinite(self.antiderivative(var)?)),
        }
    }
}

/// `expr / a`, written without the division when `a == 1`
fn scale(expr: Expr, a: f64) -> Expr {
    if a == 1.0 {
        expr
    } else {
        expr / Expr::Const(a)
    }
}

/// `(a, b)` if `expr` is `a*var + b` with `a != 0`
pub(crate) fn linear_coefficients(expr: &Expr, var: &str) -> Option<(f64, f64)> {
    if !expr.contains_variable(var) {
        return None;
    }
    match expr.diff(var).simplify() {
        Expr::Const(a) if a != 0.0 && a.is_finite() => {
            let b = expr.eval_expression(var, 0.0);
            b.is_finite().then_some((a, b))
        }
        _ => None,
    }
}

/// Simple power integration x^n dx = x^(n+1)/(n+1), n = -1 gives ln|x|
fn integrate_power_simple(n: f64, var: &str) -> Expr {
    let x = Expr::Var(var.to_string());
    if n == -1.0 {
        Expr::abs(x.boxed()).ln()
    } else {
        x.pow(Expr::Const(n + 1.0)) / Expr::Const(n + 1.0)
    }
}

/// n from x^n (n a non-negative integer), 0 for a constant
fn extract_power_from_polynomial(poly: &Expr, var: &str) -> Option<i32> {
    match poly {
        Expr::Var(x) if x == var => Some(1),
        Expr::Pow(base, exp) => match (base.as_ref(), exp.as_ref()) {
            (Expr::Var(x), Expr::Const(power))
                if x == var && power.fract() == 0.0 && *power >= 0.0 && *power <= i32::MAX as f64 =>
            {
                Some(*power as i32)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Handle x^n * exp(ax+b) integration using recursive integration by parts
fn integrate_polynomial_times_exponential(poly: &Expr, exp: &Expr, var: &str) -> Option<Expr> {
    let Expr::Exp(exp_inner) = exp else {
        return None;
    };
    let n = extract_power_from_polynomial(poly, var)?;
    // one level of recursion per power
    if n > MAX_POLYNOMIAL_DEGREE as i32 {
        return None;
    }
    let (a, _) = linear_coefficients(exp_inner, var)?;
    Some(integrate_xn_times_exp(n, a, exp, var))
}

/// ∫ x^n e^u dx = x^n e^u / a - (n/a) ∫ x^(n-1) e^u dx for u = ax + b
fn integrate_xn_times_exp(n: i32, a: f64, exp_u: &Expr, var: &str) -> Expr {
    if n == 0 {
        return scale(exp_u.clone(), a);
    }
    let x = Expr::Var(var.to_string());
    let xn = if n == 1 {
        x
    } else {
        x.pow(Expr::Const(n as f64))
    };
    let first_term = scale(xn * exp_u.clone(), a);
    let second_term = Expr::Const(n as f64 / a) * integrate_xn_times_exp(n - 1, a, exp_u, var);
    first_term - second_term
}

/// Handle x^n * ln(x) integration using integration by parts
fn integrate_polynomial_times_logarithm(poly: &Expr, ln_expr: &Expr, var: &str) -> Option<Expr> {
    let Expr::Ln(ln_inner) = ln_expr else {
        return None;
    };
    if !matches!(ln_inner.as_ref(), Expr::Var(x) if x == var) {
        return None;
    }
    let n = extract_power_from_polynomial(poly, var)?;
    Some(integrate_xn_times_ln_x(n, var))
}

/// ∫ x^n * ln(x) dx = x^(n+1) ln(x)/(n+1) - x^(n+1)/(n+1)²
fn integrate_xn_times_ln_x(n: i32, var: &str) -> Expr {
    let x = Expr::Var(var.to_string());
    let n_plus_1 = (n + 1) as f64;
    let x_power = x.clone().pow(Expr::Const(n_plus_1));
    (x_power.clone() * x.ln()) / Expr::Const(n_plus_1)
        - x_power / Expr::Const(n_plus_1 * n_plus_1)
}

///////////////////////////////////////////////////////////////////////////////////////////
// tests
////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod integration_tests {

    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Expr {
        Expr::parse_expression(text).unwrap()
    }

    /// checks F' == f numerically at a few points inside the domain
    fn assert_antiderivative(text: &str, points: &[f64]) {
        let f = parse(text);
        let big_f = f.antiderivative("x").unwrap();
        let h = 1e-5;
        for &x in points {
            let numeric = (big_f.eval_expression("x", x + h) - big_f.eval_expression("x", x - h)) / (2.0 * h);
            assert_relative_eq!(numeric, f.eval_expression("x", x), epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_integrate_constant() {
        // ∫ 5 dx = 5x
        let result = Expr::Const(5.0).antiderivative("x").unwrap();
        assert_eq!(result, parse("5*x"));
    }

    #[test]
    fn test_integrate_variable() {
        // ∫ x dx = x²/2
        let result = Expr::x().antiderivative("x").unwrap();
        assert_eq!(result.to_string(), "x**2 / 2");
    }

    #[test]
    fn test_integrate_polynomial_canonical_form() {
        let result = parse("x**2 - 4*x + 4").antiderivative("x").unwrap();
        assert_eq!(result, parse("x**3/3 - 2*x**2 + 4*x"));
        assert_eq!(result.to_string(), "x**3 / 3 - 2 * x**2 + 4 * x");
    }

    #[test]
    fn test_integrate_basic_functions() {
        assert_eq!(parse("sin(x)").antiderivative("x").unwrap(), parse("-cos(x)"));
        assert_eq!(parse("cos(x)").antiderivative("x").unwrap(), parse("sin(x)"));
        assert_eq!(parse("exp(x)").antiderivative("x").unwrap(), parse("exp(x)"));
        assert_eq!(parse("log(x)").antiderivative("x").unwrap(), parse("x*log(x) - x"));
        assert_eq!(parse("1/x").antiderivative("x").unwrap(), parse("log(abs(x))"));
    }

    #[test]
    fn test_integrate_linear_arguments() {
        assert_antiderivative("exp(2*x + 1)", &[-1.0, 0.0, 0.5]);
        assert_antiderivative("sin(3*x)", &[-1.0, 0.2, 2.0]);
        assert_antiderivative("cos(x/2 - 1)", &[-1.0, 0.2, 2.0]);
        assert_antiderivative("tan(x)", &[-1.0, 0.2, 1.0]);
        assert_antiderivative("sqrt(2*x + 1)", &[0.0, 1.0, 3.0]);
        assert_antiderivative("abs(x)", &[-2.0, -0.5, 1.5]);
        assert_antiderivative("(2*x + 1)**3", &[-1.0, 0.0, 1.0]);
        assert_antiderivative("log(2*x)", &[0.5, 1.0, 3.0]);
    }

    #[test]
    fn test_integrate_exponential_base() {
        assert_antiderivative("2**x", &[-1.0, 0.0, 2.0]);
        assert_antiderivative("10**(3*x)", &[-0.5, 0.0, 0.3]);
    }

    #[test]
    fn test_integrate_by_parts_families() {
        assert_antiderivative("x*exp(x)", &[-1.0, 0.0, 1.0]);
        assert_antiderivative("x**3*exp(-2*x)", &[-1.0, 0.0, 1.0]);
        assert_antiderivative("exp(x)*x**2", &[-1.0, 0.5, 1.0]);
        assert_antiderivative("x**2*log(x)", &[0.5, 1.0, 2.0]);
        assert_antiderivative("log(x)/x", &[0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_integrate_logarithmic_derivative() {
        assert_antiderivative("2*x/(x**2 + 1)", &[-1.0, 0.0, 2.0]);
        assert_antiderivative("x/(x**2 + 1)", &[-1.0, 0.0, 2.0]);
        assert_antiderivative("1/(3*x - 1)", &[1.0, 2.0, -1.0]);
        assert_antiderivative("1/x**3", &[0.5, 1.0, -2.0]);
    }

    #[test]
    fn test_division_by_constant() {
        assert_antiderivative("(x**2 + 1)/4", &[-1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_no_closed_form_is_an_error() {
        let err = parse("exp(-x**2)").antiderivative("x").unwrap_err();
        assert!(matches!(err, IntegrationError::NoClosedForm(_)));
        assert!(parse("sin(x)/x").antiderivative("x").is_err());
        assert!(parse("x**x").antiderivative("x").is_err());
    }

    #[test]
    fn test_definite_integration_polynomial() {
        let value = parse("x**2").definite_integrate("x", 0.0, 3.0).unwrap();
        assert_relative_eq!(value, 9.0, epsilon = 1e-10);
        let value = parse("x**2 - 4*x + 4").definite_integrate("x", 0.0, 2.0).unwrap();
        assert_relative_eq!(value, 8.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_definite_integration_trigonometric() {
        let value = parse("sin(x)").definite_integrate("x", 0.0, std::f64::consts::PI).unwrap();
        assert_relative_eq!(value, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_definite_integration_reversed_bounds() {
        let value = parse("x").definite_integrate("x", 2.0, 0.0).unwrap();
        assert_relative_eq!(value, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_definite_integration_over_a_pole_diverges() {
        let err = parse("1/x").definite_integrate("x", -1.0, 1.0).unwrap_err();
        assert_eq!(err, IntegrationError::Divergent { lower: -1.0, upper: 1.0 });
        let value = parse("1/x").definite_integrate("x", 1.0, std::f64::consts::E).unwrap();
        assert_relative_eq!(value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_definite_integration_over_an_even_order_pole_diverges() {
        let err = parse("1/x**2").definite_integrate("x", -1.0, 2.0).unwrap_err();
        assert_eq!(err, IntegrationError::Divergent { lower: -1.0, upper: 2.0 });
        assert!(matches!(
            parse("1/(x - 0.3)**2").definite_integrate("x", -1.0, 2.0),
            Err(IntegrationError::Divergent { .. })
        ));
        assert!(matches!(
            parse("x**-4").definite_integrate("x", 2.0, -1.0),
            Err(IntegrationError::Divergent { .. })
        ));
        let value = parse("1/x**2").definite_integrate("x", 1.0, 2.0).unwrap();
        assert_relative_eq!(value, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_integrate_factored_polynomials() {
        for text in ["x*(x+1)", "(x-1)*(x+1)", "(x**2+1)**2", "x**2*(x-3)"] {
            assert_antiderivative(text, &[-2.0, 0.5, 3.0]);
        }
        assert_eq!(parse("(x-1)*(x+1)").antiderivative("x").unwrap().to_string(), "x**3 / 3 - x");
        let value = parse("x*(x+1)").definite_integrate("x", 0.0, 3.0).unwrap();
        assert_relative_eq!(value, 13.5, epsilon = 1e-12);
    }

    #[test]
    fn test_integrate_reciprocal_power_of_linear_base() {
        assert_antiderivative("1/(x-0.5)**2", &[-1.0, 1.0, 2.0]);
        assert_antiderivative("3/(2*x+1)**3", &[0.0, 1.0, 2.0]);
        let value = parse("1/(x-0.5)**2").definite_integrate("x", 1.0, 2.0).unwrap();
        assert_relative_eq!(value, 4.0 / 3.0, epsilon = 1e-12);
        assert!(matches!(
            parse("1/(x-0.5)**2").definite_integrate("x", 0.0, 1.0),
            Err(IntegrationError::Divergent { .. })
        ));
    }

    #[test]
    fn test_high_power_times_exponential_has_no_closed_form() {
        assert_antiderivative("x**5*exp(x)", &[-1.0, 0.0, 1.0]);
        assert!(matches!(
            parse("x**1000*exp(x)").antiderivative("x"),
            Err(IntegrationError::NoClosedForm(_))
        ));
    }

    #[test]
    fn test_definite_integration_invalid_bounds() {
        let err = parse("x").definite_integrate("x", 0.0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidBounds { .. }));
    }

    #[test]
    fn test_single_bound_is_ignored() {
        let f = parse("x");
        assert_eq!(
            f.integrate_with_bounds("x", Some(1.0), None).unwrap(),
            Integral::Indefinite(parse("x**2/2"))
        );
        assert!(matches!(
            f.integrate_with_bounds("x", Some(0.0), Some(1.0)).unwrap(),
            Integral::Definite(v) if (v - 0.5).abs() < 1e-12
        ));
    }
}
