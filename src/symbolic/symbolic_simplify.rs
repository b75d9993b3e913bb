//! # Symbolic Expression Simplification Module
//!
//! Algebraic simplification of [`Expr`] trees.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: arithmetic on numerical constants
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x / x = 1, x^a * x^b = x^(a+b), ...
//! 3. **Term Collection**: sums are flattened into signed terms, like terms are merged
//!    (`3x + 2x = 5x`, `2 sin(x) - sin(x) = sin(x)`) and the sum is rebuilt in a canonical order:
//!    the polynomial block (descending degree, constant last) sits where its first term appeared,
//!    other terms keep their order of appearance.
//! 4. **Readable Coefficients**: coefficients that are small rationals are written as fractions,
//!    so the antiderivative of `x**2` reads `x**3 / 3` instead of `0.3333333333333333 * x**3`.
//!
//! `simplify()` repeats the pass until the tree stops changing, which makes it idempotent.

use crate::symbolic::symbolic_engine::Expr;
use std::collections::BTreeMap;

const MAX_PASSES: usize = 8;
/// largest denominator tried when a coefficient is written as a fraction
const MAX_DENOMINATOR: i64 = 1000;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Public interface for expression simplification.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let d = Expr::parse_expression("x**2 - 4*x + 4").unwrap().diff("x").simplify();
    /// assert_eq!(d.to_string(), "2 * x - 4");
    /// ```
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_();
        for _ in 0..MAX_PASSES {
            let next = current.simplify_();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// One bottom-up simplification pass.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b), // (a) + (b) = (a + b)
                    (Expr::Const(0.0), _) => rhs,                           // 0 + x = x
                    (_, Expr::Const(0.0)) => lhs,                           // x + 0 = x
                    _ => collect_sum(&Expr::Add(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b), // (a) - (b) = (a - b)
                    (_, Expr::Const(0.0)) => lhs,                           // x - 0 = x
                    _ if lhs == rhs => Expr::Const(0.0),                    // x - x = 0
                    _ => collect_sum(&Expr::Sub(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Mul(lhs, rhs) => simplify_product(lhs.simplify_(), rhs.simplify_()),
            Expr::Div(lhs, rhs) => simplify_quotient(lhs.simplify_(), rhs.simplify_()),
            Expr::Pow(base, exp) => {
                let base = base.simplify_();
                let exp = exp.simplify_();
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a.powf(*b)), // (a) ^ (b) = (a ^ b)
                    (_, Expr::Const(0.0)) => Expr::Const(1.0),                   // x ^ 0 = 1
                    (_, Expr::Const(1.0)) => base,                               // x ^ 1 = x
                    (Expr::Const(1.0), _) => Expr::Const(1.0),                   // 1 ^ x = 1
                    // (x^a)^b = x^(a*b), integer exponents only: (x^2)^(1/2) is |x|
                    (Expr::Pow(inner_base, inner_exp), Expr::Const(b))
                        if is_integer(*b) && matches!(inner_exp.as_ref(), Expr::Const(a) if is_integer(*a)) =>
                    {
                        let new_exp = Expr::Mul(inner_exp.clone(), Box::new(exp.clone())).simplify_();
                        Expr::Pow(inner_base.clone(), Box::new(new_exp))
                    }
                    _ => Expr::Pow(Box::new(base), Box::new(exp)),
                }
            }
            Expr::Exp(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(0.0) => Expr::Const(1.0),
                    _ => Expr::Exp(Box::new(expr)),
                }
            }
            Expr::Ln(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(1.0) => Expr::Const(0.0),
                    // ln(e^u) = u for every real u
                    Expr::Exp(inner) => inner.as_ref().clone(),
                    _ => Expr::Ln(Box::new(expr)),
                }
            } // ln
            Expr::sin(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(0.0) => Expr::Const(0.0),
                    _ => Expr::sin(Box::new(expr)),
                }
            } //sin
            Expr::cos(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(0.0) => Expr::Const(1.0),
                    _ => Expr::cos(Box::new(expr)),
                }
            } //cos
            Expr::tg(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(0.0) => Expr::Const(0.0),
                    _ => Expr::tg(Box::new(expr)),
                }
            } //tg
            Expr::sqrt(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    // exact roots only: sqrt(4) = 2, sqrt(2) stays symbolic
                    Expr::Const(c) if *c >= 0.0 && is_integer(c.sqrt()) => Expr::Const(c.sqrt()),
                    _ => Expr::sqrt(Box::new(expr)),
                }
            }
            Expr::abs(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(c) => Expr::Const(c.abs()),
                    Expr::abs(_) => expr,
                    _ => Expr::abs(Box::new(expr)),
                }
            }
        }
    }
}

fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15
}

/// product rules on already simplified factors
fn simplify_product(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b), // (a) * (b) = (a * b)
        (Expr::Const(0.0), _) | (_, Expr::Const(0.0)) => Expr::Const(0.0), // 0 * x = 0
        (Expr::Const(1.0), _) => rhs,                           // 1 * x = x
        (_, Expr::Const(1.0)) => lhs,                           // x * 1 = x
        // constants go first: x * c = c * x
        (_, Expr::Const(_)) => simplify_product(rhs, lhs),
        // x * (y / x) = y
        (_, Expr::Div(num, den)) if den.as_ref() == &lhs => num.as_ref().clone(),
        (Expr::Div(num, den), _) if den.as_ref() == &rhs => num.as_ref().clone(),
        // x^a * x^b = x^(a+b)
        (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if base1 == base2 => {
            let new_exp = Expr::Add(exp1.clone(), exp2.clone()).simplify_();
            Expr::Pow(base1.clone(), Box::new(new_exp)).simplify_()
        }
        (Expr::Pow(base, exp), other) | (other, Expr::Pow(base, exp))
            if base.as_ref() == other && !other.is_const() =>
        {
            let new_exp = Expr::Add(exp.clone(), Box::new(Expr::Const(1.0))).simplify_();
            Expr::Pow(base.clone(), Box::new(new_exp)).simplify_()
        }
        (a, b) if a == b && !a.is_const() => {
            Expr::Pow(Box::new(a.clone()), Box::new(Expr::Const(2.0)))
        }
        _ => canonical_term(Expr::Mul(Box::new(lhs), Box::new(rhs))),
    }
}

/// quotient rules on already simplified operands
fn simplify_quotient(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b), // (a) / (b) = (a / b)
        (Expr::Const(0.0), _) if !rhs.is_zero() => Expr::Const(0.0),        // 0 / x = 0
        (_, Expr::Const(1.0)) => lhs,                                        // x / 1 = x
        _ if lhs == rhs && !rhs.is_zero() => Expr::Const(1.0),               // x / x = 1
        // x^a / x^b = x^(a-b)
        (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if base1 == base2 => {
            let new_exp = Expr::Sub(exp1.clone(), exp2.clone()).simplify_();
            Expr::Pow(base1.clone(), Box::new(new_exp)).simplify_()
        }
        (Expr::Pow(base, exp), other) if base.as_ref() == other && !other.is_const() => {
            let new_exp = Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0))).simplify_();
            Expr::Pow(base.clone(), Box::new(new_exp)).simplify_()
        }
        (other, Expr::Pow(base, exp)) if base.as_ref() == other && !other.is_const() => {
            let new_exp = Expr::Sub(Box::new(Expr::Const(1.0)), exp.clone()).simplify_();
            Expr::Pow(base.clone(), Box::new(new_exp)).simplify_()
        }
        // (a * b) / b = a
        (Expr::Mul(a, b), _) if b.as_ref() == &rhs => a.as_ref().clone(),
        (Expr::Mul(a, b), _) if a.as_ref() == &rhs => b.as_ref().clone(),
        (_, Expr::Const(c)) if *c != 0.0 => canonical_term(Expr::Div(Box::new(lhs), Box::new(rhs))),
        _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
    }
}

/// Splits a term into its numeric coefficient and the remaining factors.
///
/// Looks through products and divisions by constants: `3 * (x**2 / 2)` is `(1.5, x**2)`.
pub(crate) fn split_coefficient(expr: &Expr) -> (f64, Option<Expr>) {
    match expr {
        Expr::Const(c) => (*c, None),
        Expr::Mul(lhs, rhs) => {
            let (c1, r1) = split_coefficient(lhs);
            let (c2, r2) = split_coefficient(rhs);
            let rest = match (r1, r2) {
                (Some(a), Some(b)) => Some(Expr::Mul(Box::new(a), Box::new(b))),
                (Some(a), None) | (None, Some(a)) => Some(a),
                (None, None) => None,
            };
            (c1 * c2, rest)
        }
        Expr::Div(lhs, rhs) => match rhs.as_ref() {
            Expr::Const(d) if *d != 0.0 => {
                let (c, rest) = split_coefficient(lhs);
                (c / d, rest)
            }
            _ => (1.0, Some(expr.clone())),
        },
        _ => (1.0, Some(expr.clone())),
    }
}

/// Rewrites a product/quotient into `coefficient * rest` canonical form.
fn canonical_term(expr: Expr) -> Expr {
    let (coeff, rest) = split_coefficient(&expr);
    match rest {
        None => Expr::Const(coeff),
        Some(_) if coeff == 0.0 => Expr::Const(0.0),
        Some(rest) => build_term(coeff, Some(rest)),
    }
}

/// Writes `coeff` as a fraction `num / den` when that reads better than a decimal.
///
/// Integers stay integers, one-digit decimals other than halves stay decimals (`0.1`, `0.2`),
/// anything else with a denominator up to `MAX_DENOMINATOR` becomes a fraction.
pub(crate) fn rationalize(coeff: f64) -> Option<(i64, i64)> {
    if !coeff.is_finite() {
        return None;
    }
    if is_integer(coeff) {
        return Some((coeff as i64, 1));
    }
    let tolerance = 1e-12 * coeff.abs().max(1.0);
    for den in 2..=MAX_DENOMINATOR {
        let num = (coeff * den as f64).round();
        if num.abs() > 1e12 {
            return None;
        }
        if (coeff - num / den as f64).abs() < tolerance {
            let single_decimal = is_integer((coeff * 10.0 * 1e9).round() / 1e9);
            if single_decimal && den != 2 {
                return None;
            }
            return Some((num as i64, den));
        }
    }
    None
}

/// Builds `coeff * rest` in canonical shape: `rest`, `-rest`, `n * rest`, `rest / d`,
/// `n * rest / d`, or `c * rest` for coefficients without a short fraction.
pub(crate) fn build_term(coeff: f64, rest: Option<Expr>) -> Expr {
    let Some(rest) = rest else {
        return Expr::Const(coeff);
    };
    match rationalize(coeff) {
        Some((num, den)) => {
            let numerator = match num {
                1 => rest,
                -1 => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(rest)),
                n => Expr::Mul(Box::new(Expr::Const(n as f64)), Box::new(rest)),
            };
            if den == 1 {
                numerator
            } else {
                Expr::Div(Box::new(numerator), Box::new(Expr::Const(den as f64)))
            }
        }
        None => Expr::Mul(Box::new(Expr::Const(coeff)), Box::new(rest)),
    }
}

//___________________________________POLYNOMIALS____________________________________

/// polynomials above this degree are not expanded
pub const MAX_POLYNOMIAL_DEGREE: usize = 32;

impl Expr {
    /// Coefficients `[a0, a1, ..., an]` when the tree is a plain polynomial in `var`.
    ///
    /// Accepts sums, products, division by non-zero constants and non-negative integer powers,
    /// so factored forms such as `x*(x+1)` or `(x**2+1)**2` are expanded. Anything else
    /// (functions, division by `var`, degree above `MAX_POLYNOMIAL_DEGREE`) gives `None`.
    pub fn polynomial_coefficients(&self, var: &str) -> Option<Vec<f64>> {
        let coefficients = match self {
            Expr::Const(c) => vec![*c],
            Expr::Var(name) if name == var => vec![0.0, 1.0],
            Expr::Add(lhs, rhs) => add_coefficients(
                &lhs.polynomial_coefficients(var)?,
                &rhs.polynomial_coefficients(var)?,
                1.0,
            ),
            Expr::Sub(lhs, rhs) => add_coefficients(
                &lhs.polynomial_coefficients(var)?,
                &rhs.polynomial_coefficients(var)?,
                -1.0,
            ),
            Expr::Mul(lhs, rhs) => {
                mul_coefficients(&lhs.polynomial_coefficients(var)?, &rhs.polynomial_coefficients(var)?)
            }
            Expr::Div(lhs, rhs) => match rhs.as_ref() {
                Expr::Const(c) if *c != 0.0 => lhs.polynomial_coefficients(var)?.iter().map(|a| a / c).collect(),
                _ => return None,
            },
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= MAX_POLYNOMIAL_DEGREE as f64 => {
                    let base = base.polynomial_coefficients(var)?;
                    let mut acc = vec![1.0];
                    for _ in 0..(*n as usize) {
                        acc = mul_coefficients(&acc, &base);
                        if acc.len() > MAX_POLYNOMIAL_DEGREE + 1 {
                            return None;
                        }
                    }
                    acc
                }
                _ => return None,
            },
            _ => return None,
        };
        if coefficients.len() > MAX_POLYNOMIAL_DEGREE + 1 || coefficients.iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some(coefficients)
    }

    /// `a0 + a1*var + ... + an*var^n` with zero coefficients left out, highest degree first.
    pub fn from_coefficients(coefficients: &[f64], var: &str) -> Expr {
        let x = Expr::Var(var.to_string());
        coefficients
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| **c != 0.0)
            .map(|(k, c)| {
                let rest = match k {
                    0 => None,
                    1 => Some(x.clone()),
                    _ => Some(x.clone().pow(Expr::Const(k as f64))),
                };
                build_term(*c, rest)
            })
            .reduce(|acc, term| acc + term)
            .unwrap_or(Expr::Const(0.0))
    }
}

fn add_coefficients(a: &[f64], b: &[f64], sign: f64) -> Vec<f64> {
    (0..a.len().max(b.len()))
        .map(|i| a.get(i).copied().unwrap_or(0.0) + sign * b.get(i).copied().unwrap_or(0.0))
        .collect()
}

fn mul_coefficients(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            product[i + j] += ai * bj;
        }
    }
    product
}

/// Represents the variable part of a polynomial term (monomial).
///
/// `3x^2` has monomial key `{"x": 2}` and coefficient `3`; a constant has the empty key.
/// `BTreeMap` keeps the key canonical and ordered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonomialKey(pub BTreeMap<String, i32>);

impl MonomialKey {
    pub fn degree(&self) -> i32 {
        self.0.values().sum()
    }

    fn to_expr(&self) -> Option<Expr> {
        self.0
            .iter()
            .filter(|(_, exp)| **exp != 0)
            .map(|(var, exp)| {
                let var_expr = Expr::Var(var.clone());
                if *exp == 1 {
                    var_expr
                } else {
                    Expr::Pow(Box::new(var_expr), Box::new(Expr::Const(*exp as f64)))
                }
            })
            .reduce(|a, b| Expr::Mul(Box::new(a), Box::new(b)))
    }
}

/// Flatten nested multiplication expressions into a list of factors.
fn flatten_mul(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_mul(a, out);
            flatten_mul(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Monomial key of a coefficient-free term: products of variables and integer powers of variables.
fn monomial_key(rest: &Option<Expr>) -> Option<MonomialKey> {
    let Some(rest) = rest else {
        return Some(MonomialKey(BTreeMap::new()));
    };
    let mut factors = Vec::new();
    flatten_mul(rest, &mut factors);
    let mut map = BTreeMap::new();
    for factor in factors {
        match factor {
            Expr::Var(v) => *map.entry(v).or_insert(0) += 1,
            Expr::Pow(base, exp) => match (*base, *exp) {
                (Expr::Var(v), Expr::Const(n)) if is_integer(n) => {
                    *map.entry(v).or_insert(0) += n as i32
                }
                _ => return None,
            },
            _ => return None,
        }
    }
    Some(MonomialKey(map))
}

/// Flatten nested Add/Sub expressions into signed `(coefficient, rest)` terms.
///
/// Subtraction negates the coefficient; a constant multiple of a sum is distributed:
/// `a - 2 * (b + c)` becomes `[a, -2 b, -2 c]`.
fn flatten_add(expr: &Expr, sign: f64, out: &mut Vec<(f64, Option<Expr>)>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_add(a, sign, out);
            flatten_add(b, sign, out);
        }
        Expr::Sub(a, b) => {
            flatten_add(a, sign, out);
            flatten_add(b, -sign, out);
        }
        _ => {
            let (coeff, rest) = split_coefficient(expr);
            match rest {
                Some(inner @ (Expr::Add(..) | Expr::Sub(..))) => {
                    flatten_add(&inner, sign * coeff, out)
                }
                rest => out.push((sign * coeff, rest)),
            }
        }
    }
}

enum Slot {
    Polynomial,
    Other(usize),
}

/// Collects like terms of a sum and rebuilds it in canonical order.
fn collect_sum(expr: &Expr) -> Expr {
    let mut terms = Vec::new();
    flatten_add(expr, 1.0, &mut terms);

    let mut slots: Vec<Slot> = Vec::new();
    let mut polynomial: BTreeMap<MonomialKey, f64> = BTreeMap::new();
    let mut others: Vec<(Expr, f64)> = Vec::new();
    for (coeff, rest) in terms {
        if let Some(key) = monomial_key(&rest) {
            if !slots.iter().any(|s| matches!(s, Slot::Polynomial)) {
                slots.push(Slot::Polynomial);
            }
            *polynomial.entry(key).or_insert(0.0) += coeff;
        } else if let Some(rest) = rest {
            match others.iter().position(|(existing, _)| existing == &rest) {
                Some(i) => others[i].1 += coeff,
                None => {
                    slots.push(Slot::Other(others.len()));
                    others.push((rest, coeff));
                }
            }
        }
    }

    // descending degree, constant term after the x terms
    let mut poly_terms: Vec<(MonomialKey, f64)> =
        polynomial.into_iter().filter(|(_, c)| *c != 0.0).collect();
    poly_terms.sort_by(|(a, _), (b, _)| b.degree().cmp(&a.degree()).then_with(|| a.cmp(b)));

    let mut signed_terms: Vec<(f64, Option<Expr>)> = Vec::new();
    for slot in slots {
        match slot {
            Slot::Polynomial => {
                for (key, coeff) in &poly_terms {
                    signed_terms.push((*coeff, key.to_expr()));
                }
            }
            Slot::Other(i) => {
                let (rest, coeff) = &others[i];
                if *coeff != 0.0 {
                    signed_terms.push((*coeff, Some(rest.clone())));
                }
            }
        }
    }

    let mut result: Option<Expr> = None;
    for (coeff, rest) in signed_terms {
        result = Some(match result {
            None => build_term(coeff, rest),
            Some(acc) if coeff < 0.0 => {
                Expr::Sub(Box::new(acc), Box::new(build_term(-coeff, rest)))
            }
            Some(acc) => Expr::Add(Box::new(acc), Box::new(build_term(coeff, rest))),
        });
    }
    result.unwrap_or(Expr::Const(0.0))
}
