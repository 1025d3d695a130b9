use crate::error::EvalError;
use crate::functions::FunctionKind;
use rand::RngCore;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

mod argument;
mod evaluator;
mod parser;

pub use argument::*;
pub use evaluator::Evaluator;
pub use parser::Parser;

/// A parsed formula.
///
/// Trees are built once by the [`Parser`] and are immutable afterwards. Every
/// child is owned by exactly one parent, so a tree is always finite and acyclic.
///
/// Equality is structural: same shape, same operators and functions, same
/// variable names and bit-identical constants. `Hash` agrees with it, so trees
/// can key maps and caches.
#[derive(Debug, Clone)]
pub enum ASTNode {
    Constant(f64),
    /// Resolved against the bindings at evaluation time, never at parse time.
    Variable(String),
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    Function {
        kind: FunctionKind,
        operand: Box<ASTNode>,
    },
}

impl ASTNode {
    pub fn constant(value: f64) -> Self {
        ASTNode::Constant(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        ASTNode::Variable(name.into())
    }

    pub fn binary(operator: Operator, left: ASTNode, right: ASTNode) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn function(kind: FunctionKind, operand: ASTNode) -> Self {
        ASTNode::Function {
            kind,
            operand: Box::new(operand),
        }
    }

    /// Evaluates the tree against `bindings`.
    ///
    /// Fails with [`EvalError::MissingRandomSource`] if the tree calls `random`;
    /// use [`ASTNode::evaluate_with_rng`] for those.
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> Result<f64, EvalError> {
        Evaluator::new().evaluate(self, bindings)
    }

    /// Evaluates the tree, drawing `random(..)` values from `rng`.
    pub fn evaluate_with_rng<B: Bindings + ?Sized>(
        &self,
        bindings: &B,
        rng: &mut dyn RngCore,
    ) -> Result<f64, EvalError> {
        Evaluator::with_rng(rng).evaluate(self, bindings)
    }

    /// Renders the tree back to text that reparses to an equal tree.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }

    /// Names of every variable the tree refers to.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            ASTNode::Constant(_) => {}
            ASTNode::Variable(name) => {
                names.insert(name.as_str());
            }
            ASTNode::BinaryOperation { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            ASTNode::Function { operand, .. } => operand.collect_variables(names),
        }
    }

    /// False if any node in the tree calls `random`.
    pub fn is_deterministic(&self) -> bool {
        match self {
            ASTNode::Constant(_) | ASTNode::Variable(_) => true,
            ASTNode::BinaryOperation { left, right, .. } => {
                left.is_deterministic() && right.is_deterministic()
            }
            ASTNode::Function { kind, operand } => {
                kind.is_deterministic() && operand.is_deterministic()
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let ASTNode::BinaryOperation { .. } = self {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl PartialEq for ASTNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ASTNode::Constant(a), ASTNode::Constant(b)) => a.to_bits() == b.to_bits(),
            (ASTNode::Variable(a), ASTNode::Variable(b)) => a == b,
            (
                ASTNode::BinaryOperation {
                    left: l1,
                    operator: o1,
                    right: r1,
                },
                ASTNode::BinaryOperation {
                    left: l2,
                    operator: o2,
                    right: r2,
                },
            ) => o1 == o2 && l1 == l2 && r1 == r2,
            (
                ASTNode::Function {
                    kind: k1,
                    operand: a1,
                },
                ASTNode::Function {
                    kind: k2,
                    operand: a2,
                },
            ) => k1 == k2 && a1 == a2,
            _ => false,
        }
    }
}

impl Eq for ASTNode {}

impl Hash for ASTNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ASTNode::Constant(value) => value.to_bits().hash(state),
            ASTNode::Variable(name) => name.hash(state),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                operator.hash(state);
                left.hash(state);
                right.hash(state);
            }
            ASTNode::Function { kind, operand } => {
                kind.hash(state);
                operand.hash(state);
            }
        }
    }
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Rust never prints f64 in exponent form, and the shortest
            // representation parses back to the same bits.
            ASTNode::Constant(value) if value.is_sign_negative() => write!(f, "({})", value),
            ASTNode::Constant(value) => write!(f, "{}", value),
            ASTNode::Variable(name) => f.write_str(name),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", operator)?;
                right.fmt_operand(f)
            }
            ASTNode::Function { kind, operand } => write!(f, "{}({})", kind, operand),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    /// IEEE-754 arithmetic: `x / 0` is `inf` (or NaN), never an error.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
            Operator::Power => left.powf(right),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Power => '^',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Operator {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Subtract),
            '*' => Ok(Operator::Multiply),
            '/' => Ok(Operator::Divide),
            '^' => Ok(Operator::Power),
            other => Err(other),
        }
    }
}
