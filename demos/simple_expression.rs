use neuroeq_rs::evaluate_expression;
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let context: HashMap<String, f64> = [("v".to_string(), -65.0), ("celsius".to_string(), 6.3)]
        .iter()
        .cloned()
        .collect();

    let expression = "= 0.1*(v+40)/(1-exp(-(v+40)/10)) * 3^((celsius-6.3)/10)";

    match evaluate_expression(expression, &context) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }
}
