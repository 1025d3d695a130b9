use crate::ast::{ASTNode, Operator};
use crate::error::ParseError;
use crate::functions::FunctionRegistry;
use log::{debug, trace};

/// Deepest nesting of parentheses, function arguments and unary minus a
/// formula may use.
pub const MAX_DEPTH: usize = 256;

/// Turns formula text into an [`ASTNode`].
///
/// The parser knows the legal variable names up front; identifiers are matched
/// by prefix against those names and the registered functions, always taking
/// the longest candidate, so `t1` wins over `t` regardless of declaration order.
///
/// Precedence, tightest first:
///
/// 1. function application, parentheses
/// 2. implicit multiplication by adjacency (`2x`, `3(v + 1)`)
/// 3. unary minus
/// 4. `^`
/// 5. `*` `/`
/// 6. `+` `-`
///
/// Binary operators are left-associative within a level.
#[derive(Debug, Clone)]
pub struct Parser {
    variables: Vec<String>,
    functions: FunctionRegistry,
}

impl Parser {
    /// Creates a parser accepting `variables`, with the standard function set.
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut variables: Vec<String> = variables
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        variables.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        variables.dedup();

        Self {
            variables,
            functions: FunctionRegistry::standard(),
        }
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Declared variable names, longest first.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parses `text` into a tree, failing atomically on any input that cannot
    /// be consumed completely.
    pub fn parse(&self, text: &str) -> Result<ASTNode, ParseError> {
        debug!(
            "Parsing expression: [{}] with variables: {:?}",
            text, self.variables
        );

        let trimmed = text.trim_start();
        let mut base = text.len() - trimmed.len();
        let mut body = trimmed.trim_end();
        if let Some(rest) = body.strip_prefix('=') {
            let rest_trimmed = rest.trim_start();
            base += body.len() - rest_trimmed.len();
            body = rest_trimmed;
        }
        if body.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut state = ParseState {
            parser: self,
            text,
            src: body,
            base,
            pos: 0,
            depth: 0,
        };
        let ast = state.expression()?;
        state.finish()?;

        debug!("Parsed [{}] as: {}", text, ast);
        Ok(ast)
    }
}

struct ParseState<'p, 't> {
    parser: &'p Parser,
    /// The caller's original text, used for error columns.
    text: &'t str,
    /// The segment being parsed; a parenthesised interior ends at its `)`.
    src: &'t str,
    /// Byte offset of `src` within `text`.
    base: usize,
    pos: usize,
    depth: usize,
}

impl<'p, 't> ParseState<'p, 't> {
    fn expression(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.term()?;
        while let Some(operator) = self.operator_among(&[Operator::Add, Operator::Subtract]) {
            let right = self.term()?;
            node = ASTNode::binary(operator, node, right);
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.power()?;
        while let Some(operator) = self.operator_among(&[Operator::Multiply, Operator::Divide]) {
            let right = self.power()?;
            node = ASTNode::binary(operator, node, right);
        }
        Ok(node)
    }

    fn power(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.unary()?;
        while let Some(operator) = self.operator_among(&[Operator::Power]) {
            let right = self.unary()?;
            node = ASTNode::binary(operator, node, right);
        }
        Ok(node)
    }

    /// A leading `-` either belongs to a numeric literal standing on its own
    /// (`-3`, `2 ^ -0.5`) or negates the following operand as `(-1) * operand`.
    fn unary(&mut self) -> Result<ASTNode, ParseError> {
        self.skip_whitespace();
        if self.peek() != Some('-') {
            return self.implicit_product();
        }

        let minus = self.pos;
        self.bump();
        if matches!(self.peek(), Some(c) if starts_number(c)) {
            let value = self.number()?;
            self.skip_whitespace();
            if !matches!(self.peek(), Some(c) if starts_operand(c)) {
                trace!("Negative literal: -{}", value);
                return Ok(ASTNode::constant(-value));
            }
            self.pos = minus + 1;
        }

        trace!("Unary minus at column {}", self.column(minus));
        self.descend(minus)?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(ASTNode::binary(
            Operator::Multiply,
            ASTNode::constant(-1.0),
            operand,
        ))
    }

    /// Operands written next to each other multiply: `2x` is `2 * x`.
    fn implicit_product(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.primary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if starts_operand(c) => {
                    trace!("Implicit multiplication after {}", node);
                    let right = self.primary()?;
                    node = ASTNode::binary(Operator::Multiply, node, right);
                }
                _ => return Ok(node),
            }
        }
    }

    fn primary(&mut self) -> Result<ASTNode, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                let open = self.pos;
                let close = self.closing_parenthesis(open)?;
                let inner = self.segment(open + 1, close)?;
                self.pos = close + 1;
                Ok(inner)
            }
            Some(c) if starts_number(c) => Ok(ASTNode::constant(self.number()?)),
            Some(c) if starts_identifier(c) => self.identifier(),
            Some(c) if c == ')' || Operator::try_from(c).is_ok() => {
                Err(ParseError::MissingOperand {
                    position: self.column(self.pos),
                })
            }
            Some(c) => Err(ParseError::UnexpectedCharacter {
                character: c,
                position: self.column(self.pos),
            }),
            None => Err(ParseError::MissingOperand {
                position: self.column(self.pos),
            }),
        }
    }

    /// Digits and points, then an exponent only when `e`/`E` is followed by
    /// (optionally signed) digits. `1e-3` is one literal; in `2e - x` and
    /// `2exp(x)` the `e` is left for the identifier rules.
    fn number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if starts_number(c)) {
            self.bump();
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let src = self.src;
            let mut exponent = src[self.pos + 1..].chars();
            let mut width = 1;
            let mut next = exponent.next();
            if matches!(next, Some('+' | '-')) {
                width += 1;
                next = exponent.next();
            }
            if matches!(next, Some(c) if c.is_ascii_digit()) {
                self.pos += width;
                // Trailing points stay in the literal: `1e3.5` is malformed.
                while matches!(self.peek(), Some(c) if starts_number(c)) {
                    self.bump();
                }
            }
        }

        let src = self.src;
        let literal = &src[start..self.pos];
        trace!("Number literal: {}", literal);
        match literal.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::MalformedNumber {
                literal: literal.to_string(),
                position: self.column(start),
            }),
        }
    }

    /// Longest declared variable or registered function that prefixes the
    /// remaining text. A function only counts when a `(` follows its name; on
    /// equal length a function beats a variable.
    fn identifier(&mut self) -> Result<ASTNode, ParseError> {
        let parser = self.parser;
        let src = self.src;
        let start = self.pos;
        let rest = &src[start..];

        let mut bare_function = None;
        let mut function = None;
        for name in parser.functions.names_longest_first() {
            if !rest.starts_with(name) {
                continue;
            }
            if rest[name.len()..].trim_start().starts_with('(') {
                function = Some(name);
                break;
            }
            bare_function.get_or_insert(name);
        }

        let variable = parser
            .variables
            .iter()
            .map(String::as_str)
            .find(|name| rest.starts_with(*name));
        let function = function.filter(|f| variable.map_or(true, |v| f.len() >= v.len()));

        match (function, variable) {
            (Some(name), _) => {
                self.pos += name.len();
                self.skip_whitespace();
                let open = self.pos;
                let close = self.closing_parenthesis(open)?;
                let operand = self.segment(open + 1, close)?;
                self.pos = close + 1;
                trace!("Function {} applied to {}", name, operand);
                parser.functions.resolve(name, operand)
            }
            (None, Some(name)) => {
                self.pos += name.len();
                trace!("Variable: {}", name);
                Ok(ASTNode::variable(name))
            }
            (None, None) => match bare_function {
                Some(name) => Err(ParseError::MissingArgument {
                    name: name.to_string(),
                    position: self.column(start),
                }),
                None => {
                    let word: String = rest
                        .chars()
                        .take_while(|c| c.is_alphanumeric() || *c == '_')
                        .collect();
                    Err(ParseError::UnknownIdentifier {
                        name: word,
                        position: self.column(start),
                    })
                }
            },
        }
    }

    /// Parses `src[start..end]` as a complete, self-contained expression.
    fn segment(&self, start: usize, end: usize) -> Result<ASTNode, ParseError> {
        let depth = self.depth + 1;
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                position: self.column(start.saturating_sub(1)),
            });
        }
        let mut inner = ParseState {
            parser: self.parser,
            text: self.text,
            src: &self.src[..end],
            base: self.base,
            pos: start,
            depth,
        };
        let node = inner.expression()?;
        inner.finish()?;
        Ok(node)
    }

    fn descend(&mut self, at: usize) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                position: self.column(at),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Index of the `)` matching the `(` at `open`, by a depth-counting scan.
    fn closing_parenthesis(&self, open: usize) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for (offset, c) in self.src[open + 1..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => return Ok(open + 1 + offset),
                ')' => depth -= 1,
                _ => {}
            }
        }
        Err(ParseError::UnbalancedParentheses {
            position: self.column(open),
        })
    }

    /// Consumes the next operator if it is one of `allowed`.
    fn operator_among(&mut self, allowed: &[Operator]) -> Option<Operator> {
        self.skip_whitespace();
        let operator = Operator::try_from(self.peek()?).ok()?;
        if allowed.contains(&operator) {
            self.bump();
            Some(operator)
        } else {
            None
        }
    }

    /// Succeeds only if the whole segment has been consumed.
    fn finish(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(')') => Err(ParseError::UnbalancedParentheses {
                position: self.column(self.pos),
            }),
            Some(c) => Err(ParseError::UnexpectedCharacter {
                character: c,
                position: self.column(self.pos),
            }),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Character column of `pos` within the caller's text.
    fn column(&self, pos: usize) -> usize {
        self.text[..self.base + pos].chars().count()
    }
}

fn starts_number(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn starts_identifier(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn starts_operand(c: char) -> bool {
    starts_number(c) || starts_identifier(c) || c == '('
}
