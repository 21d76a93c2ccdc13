//! relsym Symbolic Engine
//!
//! This crate provides the computer-algebra layer that relsym tensors are
//! built on: symbolic expressions, exact coefficients, parsing, canonical
//! normalization, simplification and n-dimensional symbolic arrays.
//!
//! # Architecture
//!
//! The symbolic engine uses a tree-based expression representation with:
//! - Compact coefficient representation (rational + float fallback)
//! - Shared, immutable expression nodes (`Arc`) that are cheap to clone
//! - Eager canonical form for arithmetic built with operators
//! - A staged normalization pipeline and a strategy-based `simplify`
//! - Row-major symbolic arrays of arbitrary rank

mod array;
mod coeff;
mod expr;
mod normalize;
mod parse;
mod print;
mod simplify;
mod symbol;

pub use array::{Nested, SymArray};
pub use coeff::Coefficient;
pub use expr::{ElemFunc, SymExpr, SymExprKind};
pub use normalize::{canonical, expand, NormPass, NormProof, NormStep, StagedNormalizer};
pub use parse::parse;
pub use simplify::simplify;
pub use symbol::{symbols, Symbol};

/// Error type for symbolic operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolicError {
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("ragged nested array: {0}")]
    RaggedArray(String),

    #[error("shape {shape:?} needs {expected} elements, got {found}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} indices, got {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("index {index} out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },
}

pub type Result<T> = std::result::Result<T, SymbolicError>;
