use crate::ast::{ASTNode, Bindings, Evaluator, Overlay};
use crate::error::EvalError;
use log::debug;
use rand::RngCore;
use rayon::prelude::*;

/// Evenly spaced sample points from `start` to `end`, both ends included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, points: usize) -> Self {
        Self { start, end, points }
    }

    /// A single point yields `start`; zero points yield nothing.
    pub fn values(&self) -> Vec<f64> {
        match self.points {
            0 => Vec::new(),
            1 => vec![self.start],
            n => {
                let step = (self.end - self.start) / (n - 1) as f64;
                (0..n).map(|i| self.start + i as f64 * step).collect()
            }
        }
    }
}

/// Evaluates `ast` at each point of `range`, binding `variable` to the point
/// and every other name through `fixed`.
///
/// Points are evaluated in parallel; results keep the order of
/// [`SweepRange::values`]. Trees that call `random` are rejected with
/// [`EvalError::MissingRandomSource`]; use [`sweep_with_rng`] for those.
pub fn sweep<B>(
    ast: &ASTNode,
    variable: &str,
    range: &SweepRange,
    fixed: &B,
) -> Result<Vec<(f64, f64)>, EvalError>
where
    B: Bindings + Sync + ?Sized,
{
    if !ast.is_deterministic() {
        return Err(EvalError::MissingRandomSource);
    }

    debug!(
        "Sweeping [{}] over {} = {}..{} ({} points)",
        ast, variable, range.start, range.end, range.points
    );

    range
        .values()
        .into_par_iter()
        .map(|value| {
            let bindings = Overlay {
                name: variable,
                value,
                base: fixed,
            };
            ast.evaluate(&bindings).map(|result| (value, result))
        })
        .collect()
}

/// Sequential sweep drawing `random` values from `rng` in point order.
pub fn sweep_with_rng<B>(
    ast: &ASTNode,
    variable: &str,
    range: &SweepRange,
    fixed: &B,
    rng: &mut dyn RngCore,
) -> Result<Vec<(f64, f64)>, EvalError>
where
    B: Bindings + ?Sized,
{
    let mut evaluator = Evaluator::with_rng(rng);
    range
        .values()
        .into_iter()
        .map(|value| {
            let bindings = Overlay {
                name: variable,
                value,
                base: fixed,
            };
            evaluator
                .evaluate(ast, &bindings)
                .map(|result| (value, result))
        })
        .collect()
}

/// Evaluates one tree against many independent binding sets in parallel.
pub fn evaluate_batch<B>(ast: &ASTNode, contexts: &[B]) -> Vec<Result<f64, EvalError>>
where
    B: Bindings + Sync,
{
    debug!("Evaluating [{}] over {} contexts", ast, contexts.len());
    contexts
        .par_iter()
        .map(|context| ast.evaluate(context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Argument, Parser};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_range_values() {
        assert_eq!(SweepRange::new(0.0, 1.0, 5).values(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(SweepRange::new(3.0, 9.0, 1).values(), vec![3.0]);
        assert!(SweepRange::new(0.0, 1.0, 0).values().is_empty());
        assert_eq!(SweepRange::new(1.0, -1.0, 3).values(), vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_sweep_keeps_order() {
        let ast = Parser::new(["v", "k"]).parse("k*v").unwrap();
        let fixed = HashMap::from([("k".to_string(), 2.0)]);
        let points = sweep(&ast, "v", &SweepRange::new(0.0, 100.0, 101), &fixed).unwrap();

        assert_eq!(points.len(), 101);
        for (i, (v, result)) in points.iter().enumerate() {
            assert_eq!(*v, i as f64);
            assert_eq!(*result, 2.0 * i as f64);
        }
    }

    #[test]
    fn test_swept_variable_shadows_fixed() {
        let ast = Parser::new(["v"]).parse("v + 1").unwrap();
        let fixed = vec![Argument::new("v", 1000.0)];
        let points = sweep(&ast, "v", &SweepRange::new(0.0, 1.0, 2), &fixed).unwrap();
        assert_eq!(points, vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_sweep_reports_unbound_variable() {
        let ast = Parser::new(["v", "k"]).parse("k*v").unwrap();
        let fixed = HashMap::<String, f64>::new();
        let result = sweep(&ast, "v", &SweepRange::new(0.0, 1.0, 3), &fixed);
        assert_eq!(result, Err(EvalError::UnboundVariable("k".to_string())));
    }

    #[test]
    fn test_sweep_rejects_random() {
        let ast = Parser::new(["v"]).parse("v + random(1)").unwrap();
        let fixed = HashMap::<String, f64>::new();
        let result = sweep(&ast, "v", &SweepRange::new(0.0, 1.0, 3), &fixed);
        assert_eq!(result, Err(EvalError::MissingRandomSource));
    }

    #[test]
    fn test_sweep_with_rng_is_reproducible() {
        let ast = Parser::new(["v"]).parse("v + random(1)").unwrap();
        let fixed = HashMap::<String, f64>::new();
        let range = SweepRange::new(0.0, 4.0, 5);

        let first = sweep_with_rng(&ast, "v", &range, &fixed, &mut StdRng::seed_from_u64(7)).unwrap();
        let second = sweep_with_rng(&ast, "v", &range, &fixed, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first, second);
        for (v, result) in first {
            assert!(result >= v && result < v + 1.0);
        }
    }

    #[test]
    fn test_evaluate_batch() {
        let ast = Parser::new(["x"]).parse("x^2").unwrap();
        let contexts: Vec<HashMap<String, f64>> = (0..10)
            .map(|i| HashMap::from([("x".to_string(), i as f64)]))
            .collect();
        let results = evaluate_batch(&ast, &contexts);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), (i * i) as f64);
        }

        let missing = evaluate_batch(&ast, &[HashMap::<String, f64>::new()]);
        assert_eq!(missing[0], Err(EvalError::UnboundVariable("x".to_string())));
    }
}
