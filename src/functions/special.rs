use super::{FunctionKind, FunctionRegistry};
use rand::{Rng, RngCore};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("heaviside", FunctionKind::Heaviside);
    registry.register("H", FunctionKind::Heaviside);
    registry.register("random", FunctionKind::Random);
}

/// 0 for `x < 0`, 1 otherwise. NaN stays NaN.
pub fn heaviside(x: f64) -> f64 {
    if x.is_nan() {
        x
    } else if x < 0.0 {
        0.0
    } else {
        1.0
    }
}

/// Uniform draw in `[0, bound)` taken from `rng`.
pub fn random_below(bound: f64, rng: &mut dyn RngCore) -> f64 {
    rng.random::<f64>() * bound
}
