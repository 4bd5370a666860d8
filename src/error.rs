//! Error types for the graph value engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("parse error at line {line}: {detail} near {excerpt}")]
    Parse {
        line: usize,
        excerpt: String,
        detail: String,
    },

    #[error("invalid input for type {target}: {input}")]
    InvalidInput { target: &'static str, input: String },

    #[error("{op} not defined for {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: &'static str, to: &'static str },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("{0}")]
    Domain(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} construction violated field layout: {1}")]
    Schema(&'static str, String),

    #[error("graph '{0}' not found")]
    GraphNotFound(String),

    #[error("label '{0}' not found")]
    LabelNotFound(String),

    #[error("integer overflow in {0}")]
    Overflow(&'static str),

    #[error("underflow in {0}")]
    Underflow(&'static str),

    #[error("internal invariant breached: {0}")]
    Internal(String),
}

impl GraphError {
    /// Get error code for the query engine boundary
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::Parse { .. } => "PARSE_ERROR",
            GraphError::InvalidInput { .. } => "PARSE_ERROR",
            GraphError::TypeMismatch { .. } => "TYPE_ERROR",
            GraphError::InvalidCast { .. } => "TYPE_ERROR",
            GraphError::LimitExceeded(_) => "LIMIT_EXCEEDED",
            GraphError::Domain(_) => "DOMAIN_ERROR",
            GraphError::DivisionByZero => "DOMAIN_ERROR",
            GraphError::Schema(_, _) => "SCHEMA_ERROR",
            GraphError::GraphNotFound(_) => "GRAPH_NOT_FOUND",
            GraphError::LabelNotFound(_) => "LABEL_NOT_FOUND",
            GraphError::Overflow(_) => "OVERFLOW",
            GraphError::Underflow(_) => "UNDERFLOW",
            GraphError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
