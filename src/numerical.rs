/// evaluation of a compiled expression on an evenly spaced grid; pointwise failures become NaN
///  Example#1
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// use RustedCalculus::symbolic::symbolic_lambdify::Evaluator;
/// use RustedCalculus::numerical::sampler::sample;
/// let f = Expr::parse_expression("1/x").unwrap();
/// let set = sample(&Evaluator::new(&f), -10.0, 10.0, 1000).unwrap();
/// // the sample nearest to the pole is blanked, the rest of the curve survives
/// assert_eq!(set.nan_count(), 1);
/// ```
pub mod sampler;
/// function, derivative and integral curves over one range, with graceful degradation
///  Example#1
/// ```
/// use RustedCalculus::symbolic::symbolic_engine::Expr;
/// use RustedCalculus::numerical::plot_data::{assemble, PlotOptions};
/// let f = Expr::parse_expression("x**2 - 4*x + 4").unwrap();
/// let bundle = assemble(&f, -10.0, 10.0, &PlotOptions::default()).unwrap();
/// assert_eq!(bundle.integral.as_ref().unwrap().first_finite(), Some(0.0));
/// println!("{}", bundle.summary_table());
/// ```
pub mod plot_data;
/// symbolic results checked against finite differences and Gauss-Legendre quadrature
pub mod cross_check;
