//! # Symbolic Engine Derivatives Module
//!
//! Exact analytical differentiation of [`Expr`] trees.
//!
//! ## Key Methods
//! - `diff(var)` - one derivative, raw (unsimplified) tree
//! - `n_th_derivative1D(var, order)` - repeated `diff` + `simplify`, with order validation
//!
//! ## Rules
//! Sum, product, quotient and chain rules, plus two shortcuts that keep the trees small:
//! constant factors (`d(c*f) = c*f'`) and constant denominators (`d(f/c) = f'/c`).
//! `d(ln|u|) = u'/u` is applied directly so that integrating `1/x` to `log(abs(x))` and
//! differentiating again gives back `1 / x`.

use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DiffError {
    /// derivative order must be at least 1
    InvalidOrder(usize),
    /// the tree mentions a symbol other than the declared variable
    ForeignVariable(String),
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffError::InvalidOrder(order) => {
                write!(f, "Derivative order must be at least 1, got {}", order)
            }
            DiffError::ForeignVariable(name) => write!(
                f,
                "Cannot differentiate: '{}' is not the declared variable '{}'",
                name, DECLARED_VARIABLE
            ),
        }
    }
}

impl std::error::Error for DiffError {}

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// - Power rule: d/dx(x^n) = n*x^(n-1), general case d(f^g) = f^g * (g' ln f + g f'/f)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule for every function node
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::x().pow(Expr::Const(2.0)); // x**2
    /// let df_dx = f.diff("x").simplify(); // 2 * x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) if !lhs.contains_variable(var) => {
                Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))
            }
            Expr::Mul(lhs, rhs) if !rhs.contains_variable(var) => {
                Expr::Mul(rhs.clone(), Box::new(lhs.diff(var)))
            }
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) if !rhs.contains_variable(var) => {
                Expr::Div(Box::new(lhs.diff(var)), rhs.clone())
            }
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            // c^g: c^g * ln(c) * g'
            Expr::Pow(base, exp) if !base.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(Box::new(self.clone()), Box::new(Expr::Ln(base.clone())))),
                Box::new(exp.diff(var)),
            ),
            // f^g = exp(g ln f)
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(Box::new(exp.diff(var)), Box::new(Expr::Ln(base.clone())))),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => match expr.as_ref() {
                Expr::abs(inner) => Expr::Div(Box::new(inner.diff(var)), inner.clone()),
                _ => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            },
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::sqrt(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(2.0)),
                    Box::new(Expr::sqrt(expr.clone())),
                )),
            ),
            // |u|' = u/|u| * u', undefined at u = 0
            Expr::abs(expr) => Expr::Mul(
                Box::new(Expr::Div(expr.clone(), Box::new(Expr::abs(expr.clone())))),
                Box::new(expr.diff(var)),
            ),
        }
    } // end of diff

    /// Higher-order derivative: `diff` followed by `simplify`, `order` times.
    ///
    /// Fails for `order == 0` and for trees that mention a variable other than `var`.
    pub fn n_th_derivative1D(&self, var: &str, order: usize) -> Result<Expr, DiffError> {
        if order == 0 {
            return Err(DiffError::InvalidOrder(order));
        }
        if let Some(name) = self.variables().into_iter().find(|name| name != var) {
            return Err(DiffError::ForeignVariable(name));
        }
        let mut derivative = self.clone();
        for _ in 0..order {
            derivative = derivative.diff(var).simplify();
        }
        Ok(derivative)
    }
}
