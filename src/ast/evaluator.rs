use crate::ast::{ASTNode, Bindings};
use crate::error::EvalError;
use crate::functions::special;
use rand::RngCore;

/// Walks a tree and computes its value.
///
/// Every node kind is pure except `random`, which draws from the generator
/// supplied through [`Evaluator::with_rng`]. Keeping the generator here rather
/// than in the tree lets one parsed formula be evaluated concurrently from
/// several threads, each with its own source.
#[derive(Default)]
pub struct Evaluator<'r> {
    rng: Option<&'r mut dyn RngCore>,
}

impl<'r> Evaluator<'r> {
    /// An evaluator without a random source; `random(..)` fails with
    /// [`EvalError::MissingRandomSource`].
    pub fn new() -> Self {
        Self { rng: None }
    }

    pub fn with_rng(rng: &'r mut dyn RngCore) -> Self {
        Self { rng: Some(rng) }
    }

    pub fn has_rng(&self) -> bool {
        self.rng.is_some()
    }

    /// Evaluates `ast` against `bindings`.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` with IEEE-754 semantics; callers must check for `inf`/`NaN`.
    /// * `Err(EvalError::UnboundVariable)` if a variable is missing from `bindings`.
    pub fn evaluate<B: Bindings + ?Sized>(
        &mut self,
        ast: &ASTNode,
        bindings: &B,
    ) -> Result<f64, EvalError> {
        match ast {
            ASTNode::Constant(value) => Ok(*value),

            ASTNode::Variable(name) => bindings
                .value_of(name)
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate(left, bindings)?;
                let right_value = self.evaluate(right, bindings)?;
                Ok(operator.apply(left_value, right_value))
            }

            ASTNode::Function { kind, operand } => {
                let value = self.evaluate(operand, bindings)?;
                match kind.apply(value) {
                    Some(result) => Ok(result),
                    None => {
                        let rng = self
                            .rng
                            .as_deref_mut()
                            .ok_or(EvalError::MissingRandomSource)?;
                        Ok(special::random_below(value, rng))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Argument, Operator};
    use crate::functions::FunctionKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn x_plus_one() -> ASTNode {
        ASTNode::binary(
            Operator::Add,
            ASTNode::variable("x"),
            ASTNode::constant(1.0),
        )
    }

    #[test]
    fn test_direct_ast_binary_operation() {
        let context = HashMap::from([("x".to_string(), 41.0)]);
        let result = Evaluator::new().evaluate(&x_plus_one(), &context).unwrap();
        assert_eq!(result, 42.0);
    }

    #[test]
    fn test_same_tree_different_bindings() {
        let ast = x_plus_one();
        let mut evaluator = Evaluator::new();
        for x in [-1.0, 0.0, 2.5] {
            let args = vec![Argument::new("x", x)];
            assert_eq!(evaluator.evaluate(&ast, &args).unwrap(), x + 1.0);
        }
    }

    #[test]
    fn test_unbound_variable() {
        let result = Evaluator::new().evaluate(&x_plus_one(), &HashMap::<String, f64>::new());
        assert_eq!(result, Err(EvalError::UnboundVariable("x".to_string())));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let ast = ASTNode::binary(
            Operator::Divide,
            ASTNode::constant(1.0),
            ASTNode::variable("x"),
        );
        let context = HashMap::from([("x".to_string(), 0.0)]);
        assert_eq!(ast.evaluate(&context).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_log_of_negative_is_nan() {
        let ast = ASTNode::function(FunctionKind::Ln, ASTNode::constant(-1.0));
        assert!(ast.evaluate(&HashMap::<String, f64>::new()).unwrap().is_nan());
    }

    #[test]
    fn test_heaviside_evaluates_to_step() {
        let ast = ASTNode::function(FunctionKind::Heaviside, ASTNode::variable("x"));
        let mut evaluator = Evaluator::new();
        for (x, expected) in [(-2.0, 0.0), (0.0, 1.0), (3.5, 1.0)] {
            let context = HashMap::from([("x".to_string(), x)]);
            assert_eq!(evaluator.evaluate(&ast, &context).unwrap(), expected);
        }
    }

    #[test]
    fn test_random_needs_a_source() {
        let ast = ASTNode::function(FunctionKind::Random, ASTNode::constant(1.0));
        let context = HashMap::<String, f64>::new();
        assert_eq!(
            ast.evaluate(&context),
            Err(EvalError::MissingRandomSource)
        );
        assert!(!Evaluator::new().has_rng());
    }

    #[test]
    fn test_random_with_seeded_source() {
        let ast = ASTNode::function(FunctionKind::Random, ASTNode::variable("max"));
        let context = HashMap::from([("max".to_string(), 3.0)]);

        let mut rng = StdRng::seed_from_u64(1);
        let mut evaluator = Evaluator::with_rng(&mut rng);
        assert!(evaluator.has_rng());
        let draws: Vec<f64> = (0..20)
            .map(|_| evaluator.evaluate(&ast, &context).unwrap())
            .collect();
        assert!(draws.iter().all(|value| (0.0..3.0).contains(value)));

        let mut again = StdRng::seed_from_u64(1);
        let first = ast.evaluate_with_rng(&context, &mut again).unwrap();
        assert_eq!(first, draws[0]);
    }

    #[test]
    fn test_unbound_variable_inside_random_is_reported_first() {
        let ast = ASTNode::function(FunctionKind::Random, ASTNode::variable("max"));
        let result = ast.evaluate(&HashMap::<String, f64>::new());
        assert_eq!(result, Err(EvalError::UnboundVariable("max".to_string())));
    }
}
