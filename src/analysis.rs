/// function families and their canned explanations
pub mod function_classes;
///____________________________________________________________________________________________________________________________
/// lexical classification of the input text into a function family
///# Example
/// ```
/// use RustedCalculus::analysis::classifier::classify;
/// use RustedCalculus::analysis::function_classes::FunctionClass;
/// assert_eq!(classify("sin(x) + cos(x)"), FunctionClass::Trigonometric);
/// // lexical, not structural
/// assert_eq!(classify("x/2"), FunctionClass::Rational);
/// ```
pub mod classifier;
///____________________________________________________________________________________________________________________________
/// closest calculus concept for a free-text query (term-frequency cosine) and keyword answers
///# Example
/// ```
/// use RustedCalculus::analysis::concepts::describe_concept;
/// println!("{}", describe_concept("what are derivatives?"));
/// ```
pub mod concepts;
/// symmetry, periodicity and polynomial roots; the analysis report and suggestions
pub mod insights;
