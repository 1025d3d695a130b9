use log::debug;
use neuroeq_rs::{ASTNode, ExpressionCache, FunctionKind, Operator, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::num::NonZeroUsize;

fn main() {
    pretty_env_logger::init();

    // exp(-x / 15) built by hand
    let by_hand = ASTNode::function(
        FunctionKind::Exp,
        ASTNode::binary(
            Operator::Divide,
            ASTNode::binary(
                Operator::Multiply,
                ASTNode::constant(-1.0),
                ASTNode::variable("x"),
            ),
            ASTNode::constant(15.0),
        ),
    );
    println!("Built: {}", by_hand);

    let capacity = NonZeroUsize::new(16).unwrap();
    let mut cache = ExpressionCache::new(Parser::new(["x"]), capacity);
    let parsed = cache.get_or_parse("exp(-x/15)").unwrap();
    debug!("cached trees: {}", cache.len());
    println!("Parsed: {} (equal to built: {})", parsed, *parsed == by_hand);
    println!("Variables: {:?}", parsed.variables());

    let context = HashMap::from([("x".to_string(), 30.0)]);
    match parsed.evaluate(&context) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }

    let noisy = cache.get_or_parse("x + random(0.5)").unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..3 {
        match noisy.evaluate_with_rng(&context, &mut rng) {
            Ok(result) => println!("Noisy: {}", result),
            Err(err) => println!("Error: {}", err),
        }
    }
}
