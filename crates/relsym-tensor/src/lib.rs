//! relsym Tensors
//!
//! Symbolic tensors whose components are `relsym_symbolic` expressions.
//!
//! - [`Tensor`]: a validated symbolic array of any rank with a per-index
//!   variance signature (`'l'` covariant, `'u'` contravariant)
//! - [`BaseRelativityTensor`]: a tensor over a coordinate system that keeps
//!   track of the free parameters and undefined functions in its components
//! - [`tensor_product`]: outer products with optional contraction
//! - [`TensorDocument`]: tensors described in TOML or JSON
//!
//! All tensors are immutable values; `simplify` and `subs` return new ones.

mod document;
mod error;
mod index;
mod product;
mod relativity;
mod tensor;

pub use document::TensorDocument;
pub use error::{Result, TensorError};
pub use index::{Index, IndexConfig};
pub use product::tensor_product;
pub use relativity::BaseRelativityTensor;
pub use tensor::{Tensor, TensorInput};

pub use relsym_symbolic::{parse, symbols, Nested, SymArray, SymExpr, Symbol};
