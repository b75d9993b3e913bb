//! # Symbolic Engine Module
//!
//! Core expression tree of the calculator. Every expression the user types ends up here as an
//! immutable `Expr` tree over the single declared variable `x`; derivatives, integrals and
//! simplified forms are always new trees.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variable**: `Var(String)` - the declared variable (always "x" for parsed input)
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `sqrt`, `abs`
//!
//! ### Key Methods
//! - `diff(var)` - analytical derivative (see `symbolic_engine_derivatives`)
//! - `integrate(var)` - rule based antiderivative (see `symbolic_integration`)
//! - `simplify()` - algebraic simplification (see `symbolic_simplify`)
//! - `lambdify1D()` - conversion into a Rust closure (see `symbolic_lambdify`)
//!
//! ## Rendering
//!
//! `Display` produces the canonical textual form. It is precedence aware and uses the same
//! surface syntax the parser accepts (`**` for powers, `log` for the natural logarithm, `tan` for
//! the tangent), so rendering and re-parsing reproduces the tree. `to_latex()` lives in
//! `symbolic_latex`.

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::f64;
use std::fmt;

/// name of the only free variable accepted by the parser
pub const DECLARED_VARIABLE: &str = "x";

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// assert_eq!(expr.to_string(), "x + 2");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ** exponent, the exponent may be any sub-expression
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm, written `log` by the user
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function, written `tan` by the user
    tg(Box<Expr>),
    /// Square root
    sqrt(Box<Expr>),
    /// Absolute value
    abs(Box<Expr>),
}

/// binding strength used by the textual and typeset renderers
pub(crate) const PREC_SUM: u8 = 1;
pub(crate) const PREC_PRODUCT: u8 = 2;
pub(crate) const PREC_UNARY: u8 = 3;
pub(crate) const PREC_POWER: u8 = 4;
pub(crate) const PREC_ATOM: u8 = 5;

impl Expr {
    /// Binding strength of the node as it is rendered.
    ///
    /// Negative constants and `-1 * e` are rendered with a leading minus and therefore bind like
    /// a unary operator.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Const(c) if c.is_sign_negative() => PREC_UNARY,
            Expr::Var(_) | Expr::Const(_) => PREC_ATOM,
            Expr::Add(..) | Expr::Sub(..) => PREC_SUM,
            Expr::Mul(lhs, rhs) if lhs.is_minus_one() && !rhs.is_const() => PREC_UNARY,
            Expr::Mul(..) | Expr::Div(..) => PREC_PRODUCT,
            Expr::Pow(..) => PREC_POWER,
            _ => PREC_ATOM,
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "(")?;
            self.fmt_bare(f)?;
            write!(f, ")")
        } else {
            self.fmt_bare(f)
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_with(f, PREC_SUM)?;
                write!(f, " + ")?;
                rhs.fmt_with(f, PREC_PRODUCT)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_with(f, PREC_SUM)?;
                write!(f, " - ")?;
                rhs.fmt_with(f, PREC_PRODUCT)
            }
            Expr::Mul(lhs, rhs) if lhs.is_minus_one() && !rhs.is_const() => {
                write!(f, "-")?;
                rhs.fmt_with(f, PREC_UNARY)
            }
            Expr::Mul(lhs, rhs) => {
                lhs.fmt_with(f, PREC_PRODUCT)?;
                write!(f, " * ")?;
                rhs.fmt_with(f, PREC_UNARY)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_with(f, PREC_PRODUCT)?;
                write!(f, " / ")?;
                rhs.fmt_with(f, PREC_UNARY)
            }
            Expr::Pow(base, exp) => {
                base.fmt_with(f, PREC_ATOM)?;
                write!(f, "**")?;
                exp.fmt_with(f, PREC_UNARY)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "log({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
            Expr::sqrt(expr) => write!(f, "sqrt({})", expr),
            Expr::abs(expr) => write!(f, "abs({})", expr),
        }
    }
}

/// Canonical textual rendering.
///
/// Only the parentheses needed to keep the tree shape are written, so `parse(expr.to_string())`
/// gives back `expr`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_bare(f)
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// the declared variable as an expression
    pub fn x() -> Expr {
        Expr::Var(DECLARED_VARIABLE.to_string())
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    pub(crate) fn is_minus_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == -1.0)
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.substitute_variable(var, expr)),
                Box::new(exp.substitute_variable(var, expr)),
            ),
            Expr::Exp(inner) => Expr::Exp(Box::new(inner.substitute_variable(var, expr))),
            Expr::Ln(inner) => Expr::Ln(Box::new(inner.substitute_variable(var, expr))),
            Expr::sin(inner) => Expr::sin(Box::new(inner.substitute_variable(var, expr))),
            Expr::cos(inner) => Expr::cos(Box::new(inner.substitute_variable(var, expr))),
            Expr::tg(inner) => Expr::tg(Box::new(inner.substitute_variable(var, expr))),
            Expr::sqrt(inner) => Expr::sqrt(Box::new(inner.substitute_variable(var, expr))),
            Expr::abs(inner) => Expr::abs(Box::new(inner.substitute_variable(var, expr))),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::sqrt(expr)
            | Expr::abs(expr) => expr.contains_variable(var_name),
        }
    }

    /// number of nodes on the longest root-to-leaf path; a leaf has height 1
    pub fn height(&self) -> usize {
        match self {
            Expr::Var(_) | Expr::Const(_) => 1,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => 1 + left.height().max(right.height()),
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::sqrt(expr)
            | Expr::abs(expr) => 1 + expr.height(),
        }
    }

    /// sorted set of all variable names found in the tree
    pub fn variables(&self) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                found.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_variables(found);
                right.collect_variables(found);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::sqrt(expr)
            | Expr::abs(expr) => expr.collect_variables(found),
        }
    }

    /// first variable that is not the declared one, if any
    pub fn foreign_variable(&self) -> Option<String> {
        self.variables()
            .into_iter()
            .find(|name| name != DECLARED_VARIABLE)
    }

    /// Evaluates the tree at a point without building a closure.
    pub fn eval_expression(&self, var: &str, value: f64) -> f64 {
        match self {
            Expr::Var(name) if name == var => value,
            Expr::Var(_) => f64::NAN,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(var, value) + rhs.eval_expression(var, value),
            Expr::Sub(lhs, rhs) => lhs.eval_expression(var, value) - rhs.eval_expression(var, value),
            Expr::Mul(lhs, rhs) => lhs.eval_expression(var, value) * rhs.eval_expression(var, value),
            Expr::Div(lhs, rhs) => lhs.eval_expression(var, value) / rhs.eval_expression(var, value),
            Expr::Pow(base, exp) => base
                .eval_expression(var, value)
                .powf(exp.eval_expression(var, value)),
            Expr::Exp(expr) => expr.eval_expression(var, value).exp(),
            Expr::Ln(expr) => expr.eval_expression(var, value).ln(),
            Expr::sin(expr) => expr.eval_expression(var, value).sin(),
            Expr::cos(expr) => expr.eval_expression(var, value).cos(),
            Expr::tg(expr) => expr.eval_expression(var, value).tan(),
            Expr::sqrt(expr) => expr.eval_expression(var, value).sqrt(),
            Expr::abs(expr) => expr.eval_expression(var, value).abs(),
        }
    }
}
