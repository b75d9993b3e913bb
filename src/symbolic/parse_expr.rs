//! # Expression parser
//!
//! Turns untrusted user text into an [`Expr`] over the single variable `x`. Nothing is ever
//! evaluated here: the text is normalised, every identifier is checked against a fixed whitelist,
//! and only then the `nom` grammar builds the tree.
//!
//! Pipeline:
//! 1. trim, `^` -> `**`, whole-word aliases (`ln` -> `log`)
//! 2. parentheses balance check
//! 3. identifier scan with word boundaries: `x`, `pi`, `e` and the functions
//!    sin, cos, tan, log, exp, sqrt, abs followed by `(`; anything else is rejected
//! 4. grammar:
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom ('**' unary)?
//! atom    := number | call | 'x' | 'pi' | 'e' | '(' sum ')'
//! call    := name '(' sum (',' sum)? ')'      (two arguments only for log(a, base))
//! ```
//! Error positions are character offsets into the normalised text. Input nested deeper than
//! `MAX_NESTING` levels, chains building a tree taller than `MAX_TREE_HEIGHT` and literals that
//! overflow `f64` are `InvalidSyntax` at the offending spot.
use crate::symbolic::symbolic_engine::{DECLARED_VARIABLE, Expr};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded},
};
use regex::Regex;
use std::f64::consts::{E, PI};
use std::fmt;
use std::sync::LazyLock;

/// functions a user may call, as written in the normalised text
pub const SUPPORTED_FUNCTIONS: [&str; 7] = ["sin", "cos", "tan", "log", "exp", "sqrt", "abs"];
/// named numeric literals
pub const NAMED_CONSTANTS: [&str; 2] = ["pi", "e"];
/// parentheses, signs, calls and exponents nested deeper than this are rejected
pub const MAX_NESTING: usize = 64;
/// operator chains may not build a tree taller than this
pub const MAX_TREE_HEIGHT: usize = 256;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern"));
/// (pattern, replacement) pairs applied before the scan, whole words only
static FUNCTION_ALIASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![(Regex::new(r"\bln\b").expect("alias pattern"), "log")]
});

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// nothing but whitespace was given
    Empty,
    UnbalancedParentheses { position: usize },
    /// a free symbol other than the declared variable
    UnknownVariable { name: String, position: usize },
    UnsupportedFunction { name: String, position: usize },
    InvalidSyntax { token: String, position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Empty expression"),
            ParseError::UnbalancedParentheses { position } => {
                write!(f, "Unbalanced parentheses at position {}", position)
            }
            ParseError::UnknownVariable { name, position } => write!(
                f,
                "Unknown variable '{}' at position {}: only '{}' is allowed",
                name, position, DECLARED_VARIABLE
            ),
            ParseError::UnsupportedFunction { name, position } => write!(
                f,
                "Unsupported function '{}' at position {}: expected one of {}",
                name,
                position,
                SUPPORTED_FUNCTIONS.join(", ")
            ),
            ParseError::InvalidSyntax { token, position } => {
                write!(f, "Unexpected '{}' at position {}", token, position)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl Expr {
    /// Parses user text into a validated expression over `x`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("x^2 - 4*x + 4").unwrap();
    /// assert_eq!(expr.to_string(), "x**2 - 4 * x + 4");
    /// ```
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Err(ParseError::Empty);
        }
        check_parentheses(&normalized)?;
        scan_identifiers(&normalized)?;
        match parse_sum(&normalized, 0) {
            Ok((rest, expr)) => {
                let rest = rest.trim_start();
                if rest.is_empty() {
                    Ok(expr)
                } else {
                    Err(syntax_error(&normalized, rest))
                }
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(syntax_error(&normalized, e.input))
            }
            Err(nom::Err::Incomplete(_)) => Err(syntax_error(&normalized, "")),
        }
    }
}

/// trim, caret to `**`, whole-word function aliases
pub fn normalize(input: &str) -> String {
    let mut text = input.trim().replace('^', "**");
    for (pattern, replacement) in FUNCTION_ALIASES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

fn char_position(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

fn syntax_error(normalized: &str, rest: &str) -> ParseError {
    let offset = normalized.len() - rest.len();
    let token = if rest.is_empty() {
        "end of input".to_string()
    } else {
        let word: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
            .collect();
        if word.is_empty() {
            rest.chars().take(1).collect()
        } else {
            word
        }
    };
    ParseError::InvalidSyntax {
        token,
        position: char_position(normalized, offset),
    }
}

fn check_parentheses(text: &str) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for (i, c) in text.chars().enumerate() {
        match c {
            '(' => open.push(i),
            ')' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedParentheses { position: i });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(position) => Err(ParseError::UnbalancedParentheses { position }),
        None => Ok(()),
    }
}

/// Every identifier must be a whitelisted function followed by `(`, the declared variable or a
/// named constant. Matching is on whole words so `sinh` never passes as `sin`.
fn scan_identifiers(text: &str) -> Result<(), ParseError> {
    for found in IDENTIFIER.find_iter(text) {
        let name = found.as_str();
        let position = char_position(text, found.start());
        let is_call = text[found.end()..].trim_start().starts_with('(');
        let is_function = SUPPORTED_FUNCTIONS.contains(&name);
        if is_call {
            if !is_function {
                return Err(ParseError::UnsupportedFunction {
                    name: name.to_string(),
                    position,
                });
            }
        } else if is_function {
            return Err(ParseError::InvalidSyntax {
                token: name.to_string(),
                position,
            });
        } else if name != DECLARED_VARIABLE && !NAMED_CONSTANTS.contains(&name) {
            return Err(ParseError::UnknownVariable {
                name: name.to_string(),
                position,
            });
        }
    }
    Ok(())
}

//___________________________________GRAMMAR____________________________________

fn too_deep(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Failure(Error::new(input, ErrorKind::TooLarge))
}

/// Left fold of an operator chain. Fails once the tree grows taller than `MAX_TREE_HEIGHT`.
fn fold_chain<'a>(
    start: &'a str,
    first: Expr,
    rest: Vec<(char, Expr)>,
    combine: impl Fn(Expr, char, Expr) -> Expr,
) -> Result<Expr, nom::Err<Error<&'a str>>> {
    let mut height = first.height();
    let mut acc = first;
    for (op, rhs) in rest {
        height = height.max(rhs.height()) + 1;
        if height > MAX_TREE_HEIGHT {
            return Err(too_deep(start));
        }
        acc = combine(acc, op, rhs);
    }
    Ok(acc)
}

fn parse_sum(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (rest, first) = parse_product(input, depth)?;
    let (rest, terms) =
        many0(pair(preceded(multispace0, one_of("+-")), |i| parse_product(i, depth))).parse(rest)?;
    let expr = fold_chain(input, first, terms, |acc, op, rhs| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    })?;
    Ok((rest, expr))
}

fn parse_product(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (rest, first) = parse_unary(input, depth)?;
    let (rest, factors) =
        many0(pair(preceded(multispace0, one_of("*/")), |i| parse_unary(i, depth))).parse(rest)?;
    let expr = fold_chain(input, first, factors, |acc, op, rhs| match op {
        '*' => acc * rhs,
        _ => acc / rhs,
    })?;
    Ok((rest, expr))
}

/// unary minus binds looser than `**`: `-x**2` is `-(x**2)`
fn parse_unary(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    if depth > MAX_NESTING {
        return Err(too_deep(input));
    }
    let (rest, sign) = opt(one_of("+-")).parse(input)?;
    match sign {
        Some('-') => {
            let (rest, operand) = parse_unary(rest, depth + 1)?;
            let negated = match operand {
                Expr::Const(c) => Expr::Const(-c),
                other => -other,
            };
            Ok((rest, negated))
        }
        Some(_) => parse_unary(rest, depth + 1),
        None => parse_power(input, depth),
    }
}

/// right associative: `x**2**3` is `x**(2**3)`
fn parse_power(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input, depth)?;
    let (input, exponent) =
        opt(preceded((multispace0, tag("**")), |i| parse_unary(i, depth + 1))).parse(input)?;
    let expr = match exponent {
        Some(exponent) => base.pow(exponent),
        None => base,
    };
    Ok((input, expr))
}

fn parse_atom(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        parse_number,
        |i| parse_call(i, depth),
        parse_symbol,
        |i| parse_group(i, depth),
    ))
    .parse(input)
}

/// finite literals only: `1e400` would render as `inf`
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    let mut number = map_res(recognize((mantissa, exponent)), |s: &str| s.parse::<f64>());
    let (rest, value) = number.parse(input)?;
    if !value.is_finite() {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::Float)));
    }
    Ok((rest, Expr::Const(value)))
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_call(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = (multispace0, char('(')).parse(input)?;
    let (input, argument) = parse_sum(input, depth + 1)?;
    let (after_second, second) =
        opt(preceded((multispace0, char(',')), |i| parse_sum(i, depth + 1))).parse(input)?;
    let (rest, _) = (multispace0, char(')')).parse(after_second)?;
    let arg = argument.boxed();
    let expr = match (name, second) {
        ("sin", None) => Expr::sin(arg),
        ("cos", None) => Expr::cos(arg),
        ("tan", None) => Expr::tg(arg),
        ("exp", None) => Expr::Exp(arg),
        ("sqrt", None) => Expr::sqrt(arg),
        ("abs", None) => Expr::abs(arg),
        ("log", None) => Expr::Ln(arg),
        // log(a, base) = ln(a) / ln(base)
        ("log", Some(base)) => Expr::Div(Box::new(Expr::Ln(arg)), Box::new(base.ln())),
        (_, Some(_)) => {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
        }
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    };
    Ok((rest, expr))
}

fn parse_symbol(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    match name {
        DECLARED_VARIABLE => Ok((rest, Expr::x())),
        "pi" => Ok((rest, Expr::Const(PI))),
        "e" => Ok((rest, Expr::Const(E))),
        _ => Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    }
}

fn parse_group(input: &str, depth: usize) -> IResult<&str, Expr> {
    delimited(char('('), |i| parse_sum(i, depth + 1), (multispace0, char(')'))).parse(input)
}
