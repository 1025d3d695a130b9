pub mod ast;
pub mod cache;
pub mod error;
pub mod functions;
pub mod sweep;

pub use ast::{ASTNode, Argument, Bindings, Evaluator, Operator, Overlay, Parser};
pub use cache::ExpressionCache;
pub use error::{EquationError, EvalError, ParseError};
pub use functions::{FunctionKind, FunctionRegistry};
pub use sweep::{evaluate_batch, sweep, sweep_with_rng, SweepRange};

use std::collections::HashMap;

/// Parses `expression`, treating `variables` as the only legal variable names.
pub fn parse<I, S>(expression: &str, variables: I) -> Result<ASTNode, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Parser::new(variables).parse(expression)
}

/// Evaluates a parsed tree. Trees that call `random` need
/// [`ASTNode::evaluate_with_rng`] instead.
pub fn evaluate<B: Bindings + ?Sized>(ast: &ASTNode, bindings: &B) -> Result<f64, EvalError> {
    Evaluator::new().evaluate(ast, bindings)
}

/// Parses and evaluates in one go; every key of `context` is a declared variable.
pub fn evaluate_expression(
    expression: &str,
    context: &HashMap<String, f64>,
) -> Result<f64, EquationError> {
    let ast = parse(expression, context.keys().cloned())?;
    Ok(evaluate(&ast, context)?)
}
