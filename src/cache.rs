use crate::ast::{ASTNode, Parser};
use crate::error::ParseError;
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Parsed formulas keyed by their (trimmed) text.
///
/// Model files repeat the same rate expressions across many channels and
/// segments; the cache hands out a shared tree instead of reparsing.
pub struct ExpressionCache {
    parser: Parser,
    entries: LruCache<String, Arc<ASTNode>>,
}

impl ExpressionCache {
    /// Creates a cache holding at most `capacity` trees.
    pub fn new(parser: Parser, capacity: NonZeroUsize) -> Self {
        Self {
            parser,
            entries: LruCache::new(capacity),
        }
    }

    /// Returns the tree for `text`, parsing it on a miss. Failed parses are
    /// not remembered.
    pub fn get_or_parse(&mut self, text: &str) -> Result<Arc<ASTNode>, ParseError> {
        let key = text.trim();
        if let Some(ast) = self.entries.get(key) {
            debug!("Expression cache hit: [{}]", key);
            return Ok(Arc::clone(ast));
        }

        debug!("Expression cache miss: [{}]", key);
        let ast = Arc::new(self.parser.parse(key)?);
        self.entries.put(key.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(text.trim())
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.cap()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
