//! Lexical classification of the input text.
//!
//! The rules look at the text the user typed, not at the parsed tree, and the first rule that
//! fires wins. The label only selects illustrative content, so `x/2` being reported as rational
//! is expected.
use crate::analysis::function_classes::FunctionClass;
use regex::Regex;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

const TRIG_NAMES: [&str; 6] = ["sin", "cos", "tan", "sec", "csc", "cot"];

/// `x**<integer literal>`, the optional group catches a fractional tail such as `x**2.5`
static VARIABLE_POWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x\*\*(\d+)(\.\d*)?").expect("power pattern"));

/// Classification rules in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ClassifierRule {
    /// a trigonometric name anywhere in the text
    TrigName,
    /// `exp` or a power operator: polynomial when every power is `x**n`, exponential otherwise
    PowerOrExp,
    /// `log` or `ln`
    Logarithm,
    /// a division operator
    Division,
    Default,
}

impl ClassifierRule {
    /// `text` must already be lowercased with `^` rewritten to `**`.
    pub fn apply(&self, text: &str) -> Option<FunctionClass> {
        match self {
            ClassifierRule::TrigName => TRIG_NAMES
                .iter()
                .any(|name| text.contains(name))
                .then_some(FunctionClass::Trigonometric),
            ClassifierRule::PowerOrExp => {
                if !(text.contains("exp") || text.contains("**")) {
                    return None;
                }
                if is_plain_polynomial_power(text) {
                    Some(FunctionClass::Polynomial)
                } else {
                    Some(FunctionClass::Exponential)
                }
            }
            ClassifierRule::Logarithm => (text.contains("log") || text.contains("ln"))
                .then_some(FunctionClass::Logarithmic),
            ClassifierRule::Division => text.contains('/').then_some(FunctionClass::Rational),
            ClassifierRule::Default => Some(FunctionClass::Polynomial),
        }
    }
}

fn is_plain_polynomial_power(text: &str) -> bool {
    if text.contains("exp(") || text.contains("e**") {
        return false;
    }
    let powers = text.matches("**").count();
    let integer_powers = VARIABLE_POWER
        .captures_iter(text)
        .filter(|caps| caps.get(2).is_none())
        .count();
    powers > 0 && powers == integer_powers
}

/// Heuristic family of the expression text.
/// # Examples
/// ```rust, ignore
/// assert_eq!(classify("sin(x) + cos(x)"), FunctionClass::Trigonometric);
/// assert_eq!(classify("x^2 - 4*x + 4"), FunctionClass::Polynomial);
/// ```
pub fn classify(text: &str) -> FunctionClass {
    let text = text.to_lowercase().replace('^', "**");
    ClassifierRule::iter()
        .find_map(|rule| rule.apply(&text))
        .unwrap_or(FunctionClass::Polynomial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_examples() {
        assert_eq!(classify("sin(x) + cos(x)"), FunctionClass::Trigonometric);
        assert_eq!(classify("x**2 - 4*x + 4"), FunctionClass::Polynomial);
        assert_eq!(classify("x**3 - 6*x**2 + 11*x - 6"), FunctionClass::Polynomial);
        assert_eq!(classify("exp(-x**2)"), FunctionClass::Exponential);
        assert_eq!(classify("2**x"), FunctionClass::Exponential);
        assert_eq!(classify("log(x, 10)"), FunctionClass::Logarithmic);
        assert_eq!(classify("ln(x)"), FunctionClass::Logarithmic);
        assert_eq!(classify("1/x"), FunctionClass::Rational);
    }

    #[test]
    fn test_precedence() {
        // trigonometric beats everything
        assert_eq!(classify("sin(x)**2 + cos(x)**2"), FunctionClass::Trigonometric);
        assert_eq!(classify("tan(x)/x"), FunctionClass::Trigonometric);
        // a power operator beats the division rule
        assert_eq!(classify("x/(x**2-1)"), FunctionClass::Polynomial);
        assert_eq!(classify("log(x)**2"), FunctionClass::Exponential);
    }

    #[test]
    fn test_caret_and_case() {
        assert_eq!(classify("x^2 + 1"), FunctionClass::Polynomial);
        assert_eq!(classify("SIN(x)"), FunctionClass::Trigonometric);
    }

    #[test]
    fn test_non_integer_powers_are_exponential() {
        assert_eq!(classify("x**2.5"), FunctionClass::Exponential);
        assert_eq!(classify("x**-1"), FunctionClass::Exponential);
        assert_eq!(classify("(x+1)**2"), FunctionClass::Exponential);
    }

    #[test]
    fn test_known_imprecision() {
        // a polynomial written with a division is reported as rational
        assert_eq!(classify("x/2"), FunctionClass::Rational);
        assert_eq!(classify("x + 1"), FunctionClass::Polynomial);
        assert_eq!(classify("abs(x)"), FunctionClass::Polynomial);
    }

    #[test]
    fn test_rules_fire_in_order() {
        let text = "x/2";
        let fired: Vec<ClassifierRule> = ClassifierRule::iter()
            .filter(|rule| rule.apply(text).is_some())
            .collect();
        assert_eq!(fired, vec![ClassifierRule::Division, ClassifierRule::Default]);
    }
}
