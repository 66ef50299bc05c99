//! Language front-end.
//!
//! The playground core is generic over [`Language`]: it only needs to create
//! a fresh evaluation context, parse source text, and evaluate the result
//! against a context that persists between runs. [`Lisp`] is the built-in
//! implementation served by the binary.

mod eval;
mod parser;

use std::fmt;

use thiserror::Error;

pub use eval::{Environment, Lisp, Value, MAX_DEPTH};
pub use parser::{parse, Expr, Program};

/// Source text could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    /// Byte offset into the source where the problem was detected.
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// A parsed program failed while evaluating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EvalError(pub String);

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Either stage of a run failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// An interpreted language that can back a playground.
pub trait Language: Send + Sync + 'static {
    /// Parsed form of a source text.
    type Ast: Send;
    /// Result of a successful evaluation.
    type Value: fmt::Display + Send;
    /// State threaded through successive evaluations of one session.
    type Context: Send + 'static;

    /// Human readable language name.
    fn name(&self) -> &str;

    /// Create an empty evaluation context.
    fn new_context(&self) -> Self::Context;

    fn parse(&self, source: &str) -> Result<Self::Ast, ParseError>;

    fn evaluate(
        &self,
        ast: &Self::Ast,
        context: &mut Self::Context,
    ) -> Result<Self::Value, EvalError>;

    /// Parse then evaluate `source` against `context`.
    fn run(&self, source: &str, context: &mut Self::Context) -> Result<Self::Value, RunError> {
        let ast = self.parse(source)?;
        Ok(self.evaluate(&ast, context)?)
    }
}
