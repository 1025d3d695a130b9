use super::{FunctionKind, FunctionRegistry};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register("sin", FunctionKind::Sin);
    registry.register("cos", FunctionKind::Cos);
    registry.register("tan", FunctionKind::Tan);
    registry.register("exp", FunctionKind::Exp);
    registry.register("ln", FunctionKind::Ln);
    registry.register("log", FunctionKind::Log);
    registry.register("sqrt", FunctionKind::Sqrt);
}

/// Elementary functions follow IEEE-754: `ln(-1)` is NaN, `ln(0)` is `-inf`.
/// Returns `None` for kinds registered by [`super::special`].
pub(crate) fn apply(kind: FunctionKind, x: f64) -> Option<f64> {
    let value = match kind {
        FunctionKind::Sin => x.sin(),
        FunctionKind::Cos => x.cos(),
        FunctionKind::Tan => x.tan(),
        FunctionKind::Exp => x.exp(),
        FunctionKind::Ln => x.ln(),
        FunctionKind::Log => x.log10(),
        FunctionKind::Sqrt => x.sqrt(),
        FunctionKind::Heaviside | FunctionKind::Random => return None,
    };
    Some(value)
}
