#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// turns user text into a validated symbolic expression over x
///
///# Example
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x^2 - 4*x + 4").unwrap();
/// assert_eq!(parsed_expression.to_string(), "x**2 - 4 * x + 4");
/// // only x, pi, e and sin, cos, tan, log (ln), exp, sqrt, abs are accepted
/// assert!(Expr::parse_expression("y + 1").is_err());
/// assert!(Expr::parse_expression("sinh(x)").is_err());
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// 1) the expression tree and its canonical textual rendering
/// 2) exact derivatives of any order
/// 3) rule based antiderivatives and definite integrals
///# Example#
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x**2 - 4*x + 4").unwrap();
/// let df = f.n_th_derivative1D("x", 1).unwrap();
/// println!("f'(x) = {}", df);
/// let big_f = f.antiderivative("x").unwrap();
/// println!("F(x) = {} + C", big_f);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
/// indefinite and definite integration, `Integral` and `IntegrationError`
pub mod symbolic_integration;
/// algebraic simplification and collection of like terms
pub mod symbolic_simplify;
///________________________________________________________________________________________________________________________________________________
/// compiled numeric closures and the `Evaluator` used by the sampler
/// Example#
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// use RustedCalculus::symbolic::symbolic_lambdify::Evaluator;
/// let f = Expr::parse_expression("1/x").unwrap();
/// let evaluator = Evaluator::new(&f);
/// assert_eq!(evaluator.call(4.0), 0.25);
/// assert!(evaluator.eval_checked(0.0).is_err());
/// ```
pub mod symbolic_lambdify;
/// typeset rendering
pub mod symbolic_latex;
///______________________________________________________________________________________________________________________________________________
/// small numeric helpers: grids, central differences
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
