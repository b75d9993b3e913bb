//! Canonical typeset (LaTeX) rendering of [`Expr`].
//!
//! Uses the same binding strengths as the textual renderer with two exceptions: a `\frac{}{}`
//! is already grouped and only needs parentheses as the base of a power, and `e^{u}` must be
//! parenthesised when it is itself raised to a power.
//!
//! - `x**3 / 3 - 2 * x**2` -> `\frac{x^{3}}{3} - 2 \cdot x^{2}`
//! - `sqrt(abs(x))` -> `\sqrt{\left|x\right|}`
//! - `exp(-x)` -> `e^{-x}`
use crate::symbolic::symbolic_engine::{Expr, PREC_ATOM, PREC_POWER, PREC_PRODUCT, PREC_SUM, PREC_UNARY};
use std::f64::consts::{E, PI};

impl Expr {
    /// LaTeX source for the expression.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("sin(x)/x").unwrap();
    /// assert_eq!(expr.to_latex(), r"\frac{\sin\left(x\right)}{x}");
    /// ```
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        self.latex_bare(&mut out);
        out
    }

    fn latex_precedence(&self) -> u8 {
        match self {
            Expr::Div(..) => PREC_ATOM,
            Expr::Exp(_) => PREC_POWER,
            _ => self.precedence(),
        }
    }

    fn latex_with(&self, out: &mut String, min_prec: u8) {
        if self.latex_precedence() < min_prec {
            out.push_str(r"\left(");
            self.latex_bare(out);
            out.push_str(r"\right)");
        } else {
            self.latex_bare(out);
        }
    }

    fn latex_bare(&self, out: &mut String) {
        match self {
            Expr::Var(name) => out.push_str(name),
            Expr::Const(val) => out.push_str(&latex_number(*val)),
            Expr::Add(lhs, rhs) => {
                lhs.latex_with(out, PREC_SUM);
                out.push_str(" + ");
                rhs.latex_with(out, PREC_PRODUCT);
            }
            Expr::Sub(lhs, rhs) => {
                lhs.latex_with(out, PREC_SUM);
                out.push_str(" - ");
                rhs.latex_with(out, PREC_PRODUCT);
            }
            Expr::Mul(lhs, rhs) if lhs.is_minus_one() && !rhs.is_const() => {
                out.push('-');
                rhs.latex_with(out, PREC_UNARY);
            }
            Expr::Mul(lhs, rhs) => {
                lhs.latex_with(out, PREC_PRODUCT);
                out.push_str(r" \cdot ");
                rhs.latex_with(out, PREC_UNARY);
            }
            Expr::Div(lhs, rhs) => {
                out.push_str(r"\frac{");
                lhs.latex_bare(out);
                out.push_str("}{");
                rhs.latex_bare(out);
                out.push('}');
            }
            Expr::Pow(base, exp) => {
                if matches!(base.as_ref(), Expr::Div(..)) {
                    out.push_str(r"\left(");
                    base.latex_bare(out);
                    out.push_str(r"\right)");
                } else {
                    base.latex_with(out, PREC_ATOM);
                }
                out.push_str("^{");
                exp.latex_bare(out);
                out.push('}');
            }
            Expr::Exp(arg) => {
                out.push_str("e^{");
                arg.latex_bare(out);
                out.push('}');
            }
            Expr::Ln(arg) => latex_call(out, r"\ln", arg),
            Expr::sin(arg) => latex_call(out, r"\sin", arg),
            Expr::cos(arg) => latex_call(out, r"\cos", arg),
            Expr::tg(arg) => latex_call(out, r"\tan", arg),
            Expr::sqrt(arg) => {
                out.push_str(r"\sqrt{");
                arg.latex_bare(out);
                out.push('}');
            }
            Expr::abs(arg) => {
                out.push_str(r"\left|");
                arg.latex_bare(out);
                out.push_str(r"\right|");
            }
        }
    }
}

fn latex_call(out: &mut String, name: &str, arg: &Expr) {
    out.push_str(name);
    out.push_str(r"\left(");
    arg.latex_bare(out);
    out.push_str(r"\right)");
}

fn latex_number(val: f64) -> String {
    if val == PI {
        r"\pi".to_string()
    } else if val == -PI {
        r"-\pi".to_string()
    } else if val == E {
        "e".to_string()
    } else if val.is_infinite() {
        let infinity = if val > 0.0 { r"\infty" } else { r"-\infty" };
        infinity.to_string()
    } else {
        val.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latex(text: &str) -> String {
        Expr::parse_expression(text).unwrap().to_latex()
    }

    #[test]
    fn test_latex_polynomial() {
        assert_eq!(
            latex("x**3/3 - 2*x**2 + 4*x"),
            r"\frac{x^{3}}{3} - 2 \cdot x^{2} + 4 \cdot x"
        );
    }

    #[test]
    fn test_latex_functions() {
        assert_eq!(latex("sin(x) + cos(x)"), r"\sin\left(x\right) + \cos\left(x\right)");
        assert_eq!(latex("sqrt(abs(x))"), r"\sqrt{\left|x\right|}");
        assert_eq!(latex("exp(-x)"), r"e^{-x}");
        assert_eq!(latex("ln(x)"), r"\ln\left(x\right)");
        assert_eq!(latex("tan(2*x)"), r"\tan\left(2 \cdot x\right)");
    }

    #[test]
    fn test_latex_grouping() {
        assert_eq!(latex("(x + 1)**2"), r"\left(x + 1\right)^{2}");
        assert_eq!(latex("2*(x - 1)"), r"2 \cdot \left(x - 1\right)");
        assert_eq!(latex("exp(x)**2"), r"\left(e^{x}\right)^{2}");
        assert_eq!(latex("(1/x)**2"), r"\left(\frac{1}{x}\right)^{2}");
        assert_eq!(latex("-x**2"), r"-x^{2}");
    }

    #[test]
    fn test_latex_nested_fraction_in_function() {
        assert_eq!(
            latex("sqrt(1/(x + 1))"),
            r"\sqrt{\frac{1}{x + 1}}"
        );
        assert_eq!(latex("abs(x)/2"), r"\frac{\left|x\right|}{2}");
    }

    #[test]
    fn test_latex_constants() {
        assert_eq!(latex("pi*x"), r"\pi \cdot x");
        assert_eq!(latex("2.5"), "2.5");
    }
}
