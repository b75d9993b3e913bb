//! # Lambdify: symbolic expressions to numeric closures
//!
//! `lambdify1D` compiles an [`Expr`] into a thread safe `Fn(f64) -> f64` closure whose structure
//! mirrors the tree, so nothing is parsed or interpreted at call time.
//!
//! [`Evaluator`] bundles three compiled forms of the same tree:
//! - the plain closure (`call`, whole-array `eval_array`)
//! - a checked closure (`eval_checked`) that reports division by zero, domain errors and overflow
//! - the pole factors of the tree (denominators, `cos(u)` for every `tan(u)`, bases raised to a
//!   negative power), used by the sampler to find singularities between grid points
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use ndarray::Array1;
use std::fmt;

/// compiled single variable function
pub type Func1D = Box<dyn Fn(f64) -> f64 + Send + Sync>;
/// compiled single variable function with pointwise error reporting
pub type CheckedFunc1D = Box<dyn Fn(f64) -> Result<f64, EvalError> + Send + Sync>;

/// Pointwise evaluation failure. Never fatal for a curve: the sampler turns it into NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    DivisionByZero,
    /// argument outside the real domain of a function, e.g. log(-1) or sqrt(-2)
    Domain { function: &'static str, argument: f64 },
    /// finite arguments produced an infinite value
    Overflow,
    NonFinite,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::Domain { function, argument } => {
                write!(f, "{}({}) is not defined over the reals", function, argument)
            }
            EvalError::Overflow => write!(f, "Numeric overflow"),
            EvalError::NonFinite => write!(f, "Result is not a finite number"),
        }
    }
}

impl std::error::Error for EvalError {}

/// finite result or the matching error
fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else if value.is_infinite() {
        Err(EvalError::Overflow)
    } else {
        Err(EvalError::NonFinite)
    }
}

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions

    /// Converts a single-variable expression into an executable closure.
    ///
    /// Symbols other than `var` evaluate to NaN.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::x().pow(Expr::Const(2.0)); // x**2
    /// let func = f.lambdify1D("x");
    /// assert_eq!(func(3.0), 9.0);
    /// ```
    pub fn lambdify1D(&self, var: &str) -> Func1D {
        match self {
            Expr::Var(name) if name == var => Box::new(|x| x),
            Expr::Var(_) => Box::new(|_| f64::NAN),
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify1D(var);
                let rf = rhs.lambdify1D(var);
                Box::new(move |x| lf(x) + rf(x))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify1D(var);
                let rf = rhs.lambdify1D(var);
                Box::new(move |x| lf(x) - rf(x))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify1D(var);
                let rf = rhs.lambdify1D(var);
                Box::new(move |x| lf(x) * rf(x))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify1D(var);
                let rf = rhs.lambdify1D(var);
                Box::new(move |x| lf(x) / rf(x))
            }
            Expr::Pow(b, e) => {
                let bf = b.lambdify1D(var);
                let ef = e.lambdify1D(var);
                Box::new(move |x| bf(x).powf(ef(x)))
            }
            Expr::Exp(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).exp())
            }
            Expr::Ln(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).ln())
            }
            Expr::sin(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).sin())
            }
            Expr::cos(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).cos())
            }
            Expr::tg(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).tan())
            }
            Expr::sqrt(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).sqrt())
            }
            Expr::abs(e) => {
                let f = e.lambdify1D(var);
                Box::new(move |x| f(x).abs())
            }
        }
    } // end of lambdify1D

    /// Same as `lambdify1D`, but every node checks its own result.
    pub fn lambdify1D_checked(&self, var: &str) -> CheckedFunc1D {
        match self {
            Expr::Var(name) if name == var => Box::new(finite),
            Expr::Var(_) => Box::new(|_| Err(EvalError::NonFinite)),
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| finite(val))
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify1D_checked(var);
                let rf = rhs.lambdify1D_checked(var);
                Box::new(move |x| finite(lf(x)? + rf(x)?))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify1D_checked(var);
                let rf = rhs.lambdify1D_checked(var);
                Box::new(move |x| finite(lf(x)? - rf(x)?))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify1D_checked(var);
                let rf = rhs.lambdify1D_checked(var);
                Box::new(move |x| finite(lf(x)? * rf(x)?))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify1D_checked(var);
                let rf = rhs.lambdify1D_checked(var);
                Box::new(move |x| {
                    let denominator = rf(x)?;
                    if denominator == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    finite(lf(x)? / denominator)
                })
            }
            Expr::Pow(b, e) => {
                let bf = b.lambdify1D_checked(var);
                let ef = e.lambdify1D_checked(var);
                Box::new(move |x| {
                    let base = bf(x)?;
                    let exponent = ef(x)?;
                    if base == 0.0 && exponent < 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    if base < 0.0 && exponent.fract() != 0.0 {
                        return Err(EvalError::Domain {
                            function: "pow",
                            argument: base,
                        });
                    }
                    finite(base.powf(exponent))
                })
            }
            Expr::Exp(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| finite(f(x)?.exp()))
            }
            Expr::Ln(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| {
                    let argument = f(x)?;
                    if argument <= 0.0 {
                        return Err(EvalError::Domain {
                            function: "log",
                            argument,
                        });
                    }
                    finite(argument.ln())
                })
            }
            Expr::sin(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| finite(f(x)?.sin()))
            }
            Expr::cos(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| finite(f(x)?.cos()))
            }
            Expr::tg(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| finite(f(x)?.tan()))
            }
            Expr::sqrt(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| {
                    let argument = f(x)?;
                    if argument < 0.0 {
                        return Err(EvalError::Domain {
                            function: "sqrt",
                            argument,
                        });
                    }
                    finite(argument.sqrt())
                })
            }
            Expr::abs(e) => {
                let f = e.lambdify1D_checked(var);
                Box::new(move |x| finite(f(x)?.abs()))
            }
        }
    }

    /// Sub-expressions whose zeros are poles of the whole expression.
    pub fn pole_factors(&self, var: &str) -> Vec<Expr> {
        let mut poles = Vec::new();
        self.collect_pole_factors(var, &mut poles);
        poles
    }

    fn collect_pole_factors(&self, var: &str, poles: &mut Vec<Expr>) {
        let push = |factor: Expr, poles: &mut Vec<Expr>| {
            if factor.contains_variable(var) && !poles.contains(&factor) {
                poles.push(factor);
            }
        };
        match self {
            Expr::Var(_) | Expr::Const(_) => {}
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) => {
                lhs.collect_pole_factors(var, poles);
                rhs.collect_pole_factors(var, poles);
            }
            Expr::Div(lhs, rhs) => {
                lhs.collect_pole_factors(var, poles);
                rhs.collect_pole_factors(var, poles);
                push(rhs.as_ref().clone(), poles);
            }
            Expr::Pow(base, exp) => {
                base.collect_pole_factors(var, poles);
                exp.collect_pole_factors(var, poles);
                if matches!(exp.as_ref(), Expr::Const(e) if *e < 0.0) {
                    push(base.as_ref().clone(), poles);
                }
            }
            Expr::tg(arg) => {
                arg.collect_pole_factors(var, poles);
                push(Expr::cos(arg.clone()), poles);
            }
            Expr::Exp(arg) | Expr::Ln(arg) | Expr::sin(arg) | Expr::cos(arg) | Expr::sqrt(arg)
            | Expr::abs(arg) => arg.collect_pole_factors(var, poles),
        }
    }
}

/// Numeric view of an expression over the declared variable.
///
/// Holds only compiled closures, so it is `Send + Sync` and can be shared between threads.
pub struct Evaluator {
    expr: Expr,
    func: Func1D,
    checked: CheckedFunc1D,
    poles: Vec<Func1D>,
}

impl Evaluator {
    pub fn new(expr: &Expr) -> Self {
        Self::with_variable(expr, DECLARED_VARIABLE)
    }

    pub fn with_variable(expr: &Expr, var: &str) -> Self {
        let poles = expr
            .pole_factors(var)
            .iter()
            .map(|factor| factor.lambdify1D(var))
            .collect();
        Evaluator {
            expr: expr.clone(),
            func: expr.lambdify1D(var),
            checked: expr.lambdify1D_checked(var),
            poles,
        }
    }

    /// the expression this evaluator was compiled from
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// raw IEEE evaluation: `1/0` is `inf`, `log(-1)` is NaN
    pub fn call(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    pub fn eval_checked(&self, x: f64) -> Result<f64, EvalError> {
        (self.checked)(x)
    }

    /// Whole-array evaluation. Fails as a whole if any element is not finite.
    pub fn eval_array(&self, xs: &Array1<f64>) -> Result<Array1<f64>, EvalError> {
        let ys = xs.mapv(|x| (self.func)(x));
        match ys.iter().find(|y| !y.is_finite()) {
            Some(y) if y.is_infinite() => Err(EvalError::Overflow),
            Some(_) => Err(EvalError::NonFinite),
            None => Ok(ys),
        }
    }

    /// values of every pole factor at `xs`, one array per factor
    pub fn pole_values(&self, xs: &Array1<f64>) -> Vec<Array1<f64>> {
        self.poles.iter().map(|p| xs.mapv(|x| p(x))).collect()
    }

    /// compiled pole factors, in the order of `Expr::pole_factors`
    pub fn pole_functions(&self) -> &[Func1D] {
        &self.poles
    }

    pub fn has_poles(&self) -> bool {
        !self.poles.is_empty()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("expr", &self.expr.to_string())
            .field("poles", &self.poles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    #[test]
    fn test_lambdify1d_single_variable() {
        let func = Expr::x().lambdify1D("x");
        assert_eq!(func(5.0), 5.0);
    }

    #[test]
    fn test_lambdify1d_constant() {
        let func = Expr::Const(42.0).lambdify1D("x");
        assert_eq!(func(100.0), 42.0);
    }

    #[test]
    fn test_lambdify1d_polynomial() {
        let x = Expr::x();
        let expr = x.clone() * x.clone() + x.clone() * Expr::Const(2.0) + Expr::Const(1.0); // x^2 + 2x + 1
        let func = expr.lambdify1D("x");
        assert_eq!(func(3.0), 16.0);
    }

    #[test]
    fn test_lambdify1d_trigonometric() {
        let func = Expr::sin(Expr::x().boxed()).lambdify1D("x");
        assert_relative_eq!(func(0.0), 0.0, epsilon = 1e-10);
        assert_relative_eq!(func(PI / 2.0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_foreign_symbol_is_nan() {
        let expr = Expr::Var("y".to_string()) + Expr::Const(1.0);
        assert!(expr.lambdify1D("x")(1.0).is_nan());
        assert!(Evaluator::new(&expr).eval_checked(1.0).is_err());
    }

    #[test]
    fn test_checked_errors() {
        let x = Expr::x();
        let reciprocal = Evaluator::new(&(Expr::Const(1.0) / x.clone()));
        assert_eq!(reciprocal.eval_checked(0.0), Err(EvalError::DivisionByZero));
        assert_relative_eq!(reciprocal.eval_checked(4.0).unwrap(), 0.25);

        let log = Evaluator::new(&x.clone().ln());
        assert!(matches!(
            log.eval_checked(-1.0),
            Err(EvalError::Domain { function: "log", .. })
        ));
        let root = Evaluator::new(&Expr::sqrt(x.clone().boxed()));
        assert!(matches!(
            root.eval_checked(-2.0),
            Err(EvalError::Domain { function: "sqrt", .. })
        ));
        let growth = Evaluator::new(&x.exp());
        assert_eq!(growth.eval_checked(1000.0), Err(EvalError::Overflow));
    }

    #[test]
    fn test_eval_array() {
        let square = Evaluator::new(&Expr::x().pow(Expr::Const(2.0)));
        let ys = square.eval_array(&array![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ys, array![1.0, 4.0, 9.0]);

        let reciprocal = Evaluator::new(&(Expr::Const(1.0) / Expr::x()));
        assert!(reciprocal.eval_array(&array![-1.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_pole_factors() {
        let x = Expr::x();
        let expr = Expr::tg(x.clone().boxed()) + Expr::Const(1.0) / (x.clone() - Expr::Const(2.0))
            + x.clone().pow(Expr::Const(-2.0));
        let poles = expr.pole_factors("x");
        assert_eq!(
            poles,
            vec![
                Expr::cos(x.clone().boxed()),
                x.clone() - Expr::Const(2.0),
                x.clone()
            ]
        );
        // constant denominators are not poles
        assert!((x / Expr::Const(2.0)).pole_factors("x").is_empty());
    }
}
