//! Aggregation expressions.
//!
//! A rule's expression reduces the values matched for one counter to a single
//! number. Expressions are interpreted, never compiled to code: the grammar
//! is limited to aggregate calls over `values`, numeric literals, the four
//! arithmetic operators and parentheses.
//!
//! ```text
//! sum(values)
//! sum(values) / count(values)
//! values.Average() * 100
//! ```
//!
//! # Empty input
//!
//! `sum` and `count` of an empty sequence are `0`. `average`, `min` and `max`
//! of an empty sequence are `NaN`. Division follows IEEE 754, so dividing by
//! zero yields an infinity or `NaN` rather than an error.
//!
//! # Limits
//!
//! Expressions nested or chained more than 64 levels deep are rejected at
//! compile time.

mod parser;

use crate::error::{Error, Result};
use parser::{BinOp, ParseError, Syntax};

/// The placeholder every aggregate call must reduce.
pub const VALUES: &str = "values";

/// Aggregate functions over the matched values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Average,
    Min,
    Max,
    Count,
}

impl Reduction {
    /// Resolves a function name, case-insensitively. `avg` is an alias of `average`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sum" => Some(Reduction::Sum),
            "average" | "avg" => Some(Reduction::Average),
            "min" => Some(Reduction::Min),
            "max" => Some(Reduction::Max),
            "count" => Some(Reduction::Count),
            _ => None,
        }
    }

    /// Reduces `values` in order. See the module docs for the empty case.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Reduction::Sum => sum(values),
            Reduction::Count => values.len() as f64,
            _ if values.is_empty() => f64::NAN,
            Reduction::Average => sum(values) / values.len() as f64,
            Reduction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reduction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

// Starts from +0.0 so an empty sum renders as `0`, not `-0`.
fn sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Number(f64),
    Reduce(Reduction),
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, values: &[f64]) -> f64 {
        match self {
            Node::Number(n) => *n,
            Node::Reduce(reduction) => reduction.apply(values),
            Node::Neg(inner) => -inner.eval(values),
            Node::Binary(op, lhs, rhs) => {
                let (l, r) = (lhs.eval(values), rhs.eval(values));
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                }
            }
        }
    }
}

/// A validated expression, ready to be evaluated against any value sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parses and validates `source`. All errors surface here; evaluation never fails.
    pub fn compile(source: &str) -> Result<Self> {
        let syntax = parser::parse(source).map_err(|e| match e {
            ParseError::TooDeep => Error::compile(
                source,
                format!("expression nested too deeply (limit {})", parser::MAX_DEPTH),
            ),
            ParseError::Syntax(rest) if rest.trim().is_empty() => {
                Error::compile(source, "unexpected end of expression")
            }
            ParseError::Syntax(rest) => {
                Error::compile(source, format!("syntax error at `{}`", rest.trim()))
            }
        })?;
        let root = resolve(source, syntax)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Reduces `values` to one number. Deterministic for a given input order.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.root.eval(values)
    }
}

fn resolve(source: &str, syntax: Syntax<'_>) -> Result<Node> {
    match syntax {
        Syntax::Number(n) => Ok(Node::Number(n)),
        Syntax::Ident(name) if name == VALUES => Err(Error::compile(
            source,
            "`values` must be reduced by an aggregate function, e.g. sum(values)",
        )),
        Syntax::Ident(name) => Err(unknown_identifier(source, name)),
        Syntax::Call { function, argument } => {
            let reduction = reduction(source, function)?;
            match argument.as_deref() {
                Some(Syntax::Ident(name)) if *name == VALUES => Ok(Node::Reduce(reduction)),
                Some(Syntax::Ident(name)) => Err(unknown_identifier(source, name)),
                _ => Err(Error::compile(
                    source,
                    format!("`{function}` takes `values` as its only argument"),
                )),
            }
        }
        Syntax::Method { receiver, function } => {
            if receiver != VALUES {
                return Err(unknown_identifier(source, receiver));
            }
            Ok(Node::Reduce(reduction(source, function)?))
        }
        Syntax::Neg(inner) => Ok(Node::Neg(Box::new(resolve(source, *inner)?))),
        Syntax::Binary(op, lhs, rhs) => Ok(Node::Binary(
            op,
            Box::new(resolve(source, *lhs)?),
            Box::new(resolve(source, *rhs)?),
        )),
    }
}

fn reduction(source: &str, function: &str) -> Result<Reduction> {
    Reduction::from_name(function)
        .ok_or_else(|| Error::compile(source, format!("unknown function `{function}`")))
}

fn unknown_identifier(source: &str, name: &str) -> Error {
    Error::compile(source, format!("unknown identifier `{name}`"))
}
