use thiserror::Error;

/// Failures raised while turning formula text into an [`ASTNode`](crate::ASTNode).
///
/// Positions are 0-based character columns into the text handed to the parser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unbalanced parentheses at column {position}")]
    UnbalancedParentheses { position: usize },
    #[error("missing operand at column {position}")]
    MissingOperand { position: usize },
    #[error("unknown identifier '{name}' at column {position}")]
    UnknownIdentifier { name: String, position: usize },
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("function '{name}' at column {position} has no parenthesised argument")]
    MissingArgument { name: String, position: usize },
    #[error("malformed number '{literal}' at column {position}")]
    MalformedNumber { literal: String, position: usize },
    #[error("unexpected character '{character}' at column {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("expression nested deeper than {limit} levels at column {position}")]
    TooDeep { limit: usize, position: usize },
}

/// Failures raised while evaluating an already parsed tree.
///
/// Floating point domain problems (division by zero, `ln` of a negative
/// number, ...) are not errors: they come back as `inf`/`NaN`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("variable '{0}' is not bound in the supplied arguments")]
    UnboundVariable(String),
    #[error("random() needs a random source but none was supplied")]
    MissingRandomSource,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquationError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
