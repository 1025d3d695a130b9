use neuroeq_rs::{evaluate_batch, sweep, Argument, Parser, SweepRange};
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let parser = Parser::new(["v", "vhalf", "slope"]);
    let ast = parser.parse("1/(1+exp((vhalf - v)/slope))").unwrap();

    let fixed = vec![Argument::new("vhalf", -40.0), Argument::new("slope", 5.0)];
    let points = sweep(&ast, "v", &SweepRange::new(-80.0, 0.0, 9), &fixed).unwrap();
    for (v, steady_state) in points {
        println!("v = {:>6.1}  m_inf = {:.4}", v, steady_state);
    }

    let contexts = vec![
        HashMap::from([
            ("v".to_string(), -65.0),
            ("vhalf".to_string(), -40.0),
            ("slope".to_string(), 5.0),
        ]),
        HashMap::from([("v".to_string(), -20.0)]),
    ];
    for (i, result) in evaluate_batch(&ast, &contexts).iter().enumerate() {
        match result {
            Ok(value) => println!("Result {}: {}", i, value),
            Err(err) => println!("Result {}: {}", i, err),
        }
    }
}
