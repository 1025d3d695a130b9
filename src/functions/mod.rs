pub mod elementary;
pub mod special;

use crate::ast::ASTNode;
use crate::error::ParseError;
use std::collections::HashMap;
use std::fmt;

/// The closed set of single-argument functions a formula may call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Sin,
    Cos,
    Tan,
    Exp,
    /// Natural logarithm.
    Ln,
    /// Base-10 logarithm.
    Log,
    Sqrt,
    /// Step function: 0 below zero, 1 otherwise.
    Heaviside,
    /// Uniform draw in `[0, operand)`. The only impure function: it consumes
    /// the random source handed to the evaluator.
    Random,
}

impl FunctionKind {
    /// Spelling used when a tree is rendered back to text.
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Sin => "sin",
            FunctionKind::Cos => "cos",
            FunctionKind::Tan => "tan",
            FunctionKind::Exp => "exp",
            FunctionKind::Ln => "ln",
            FunctionKind::Log => "log",
            FunctionKind::Sqrt => "sqrt",
            FunctionKind::Heaviside => "heaviside",
            FunctionKind::Random => "random",
        }
    }

    pub fn is_deterministic(&self) -> bool {
        !matches!(self, FunctionKind::Random)
    }

    /// Applies a deterministic function. Returns `None` only for
    /// [`FunctionKind::Random`], which needs a random source and is handled by
    /// the evaluator.
    pub fn apply(&self, x: f64) -> Option<f64> {
        match self {
            FunctionKind::Heaviside => Some(special::heaviside(x)),
            FunctionKind::Random => None,
            kind => elementary::apply(*kind, x),
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps function-name tokens to the node they build.
///
/// Several names may map to the same kind (`H` and `heaviside`), so lookups
/// by the parser go through [`FunctionRegistry::names_longest_first`] to keep
/// prefix matching unambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionKind>,
    ordered: Vec<String>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    /// `sin cos tan exp ln log sqrt`.
    pub fn basic() -> Self {
        let mut registry = Self::new();
        elementary::register(&mut registry);
        registry
    }

    /// Every built-in function, including `heaviside`/`H` and `random`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_functions(&mut registry);
        registry
    }

    /// Registers `name` as a spelling of `kind`, replacing any previous binding.
    /// Empty names are ignored.
    pub fn register(&mut self, name: &str, kind: FunctionKind) {
        if name.is_empty() {
            return;
        }
        if self.functions.insert(name.to_string(), kind).is_none() {
            self.ordered.push(name.to_string());
            self.ordered
                .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
    }

    pub fn get(&self, name: &str) -> Option<FunctionKind> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, longest first; ties are broken alphabetically.
    pub fn names_longest_first(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Builds the `Function` node `name(operand)`.
    pub fn resolve(&self, name: &str, operand: ASTNode) -> Result<ASTNode, ParseError> {
        let kind = self
            .get(name)
            .ok_or_else(|| ParseError::UnknownFunction(name.to_string()))?;
        Ok(ASTNode::function(kind, operand))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn register_functions(registry: &mut FunctionRegistry) {
    elementary::register(registry);
    special::register(registry);
}
