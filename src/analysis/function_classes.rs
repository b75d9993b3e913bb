//! Function families and the explanatory texts attached to each of them.
use strum_macros::{Display, EnumIter};

/// Structural family of an expression, as guessed by the lexical classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FunctionClass {
    Polynomial,
    Trigonometric,
    Exponential,
    Logarithmic,
    Rational,
}

#[derive(Debug, PartialEq)]
pub struct FunctionInfo {
    pub explanation: &'static str,
    /// parsable example expressions, the first one is used for suggestions
    pub examples: &'static [&'static str],
    pub properties: &'static str,
}

/// Canned texts, one row per family, in the declaration order of [`FunctionClass`].
pub static FUNCTION_EXPLANATIONS: [(FunctionClass, FunctionInfo); 5] = [
    (
        FunctionClass::Polynomial,
        FunctionInfo {
            explanation: "Polynomial functions are expressions with variables raised to non-negative integer powers. They're smooth, continuous, and have predictable behavior.",
            examples: &["x**2 - 4*x + 4", "x**3 - 6*x**2 + 11*x - 6", "2*x**4 - 3*x**2 + 1"],
            properties: "Polynomials have continuous derivatives of all orders. The highest exponent determines the degree of the polynomial.",
        },
    ),
    (
        FunctionClass::Trigonometric,
        FunctionInfo {
            explanation: "Trigonometric functions relate angles to the sides of a right triangle. They're periodic and fundamental to wave analysis.",
            examples: &["sin(x)", "cos(x)", "tan(x)", "sin(x)**2 + cos(x)**2"],
            properties: "Trigonometric functions are periodic, with sin(x) and cos(x) having a period of 2π. They are widely used to model oscillatory behavior.",
        },
    ),
    (
        FunctionClass::Exponential,
        FunctionInfo {
            explanation: "Exponential functions have a constant base raised to a variable power. They model growth and decay processes.",
            examples: &["exp(x)", "2**x", "exp(-x**2)"],
            properties: "The derivative of e^x is itself. Exponential functions are used to model population growth, compound interest, and radioactive decay.",
        },
    ),
    (
        FunctionClass::Logarithmic,
        FunctionInfo {
            explanation: "Logarithmic functions are the inverse of exponential functions. They grow very slowly as x increases.",
            examples: &["log(x)", "log(x, 10)", "ln(x)"],
            properties: "Logarithms convert multiplication to addition: log(a*b) = log(a) + log(b). They are used to model phenomena that grow quickly at first, then slow down.",
        },
    ),
    (
        FunctionClass::Rational,
        FunctionInfo {
            explanation: "Rational functions are ratios of polynomials. They can have vertical asymptotes where the denominator equals zero.",
            examples: &["1/x", "x/(x**2-1)", "(x**2+1)/(x-2)"],
            properties: "Rational functions may have vertical asymptotes at points where the denominator is zero. They may also have horizontal or slant asymptotes.",
        },
    ),
];

impl FunctionClass {
    pub fn info(&self) -> &'static FunctionInfo {
        &FUNCTION_EXPLANATIONS[*self as usize].1
    }

    /// "Polynomial", "Trigonometric", ...
    pub fn capitalized(&self) -> String {
        let name = self.to_string();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_table_follows_declaration_order() {
        for (class, row) in FunctionClass::iter().zip(FUNCTION_EXPLANATIONS.iter()) {
            assert_eq!(class, row.0);
            assert!(std::ptr::eq(class.info(), &row.1));
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(FunctionClass::Trigonometric.to_string(), "trigonometric");
        assert_eq!(FunctionClass::Rational.capitalized(), "Rational");
    }

    #[test]
    fn test_every_example_parses() {
        for class in FunctionClass::iter() {
            assert!(!class.info().examples.is_empty());
            for example in class.info().examples {
                assert!(Expr::parse_expression(example).is_ok(), "{}", example);
            }
        }
    }
}
