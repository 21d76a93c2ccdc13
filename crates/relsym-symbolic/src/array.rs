//! N-dimensional symbolic arrays
//!
//! `SymArray` stores its elements in row-major order together with a shape
//! vector. Rank 0 is a scalar with exactly one element.

use crate::expr::SymExpr;
use crate::symbol::Symbol;
use crate::{Result, SymbolicError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;

/// Nested-list input, the shape a user writes by hand: `[[a, b], [c, d]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Leaf(SymExpr),
    List(Vec<Nested>),
}

impl From<SymExpr> for Nested {
    fn from(e: SymExpr) -> Self {
        Nested::Leaf(e)
    }
}

impl From<&SymExpr> for Nested {
    fn from(e: &SymExpr) -> Self {
        Nested::Leaf(e.clone())
    }
}

impl From<i64> for Nested {
    fn from(n: i64) -> Self {
        Nested::Leaf(SymExpr::int(n))
    }
}

impl From<i32> for Nested {
    fn from(n: i32) -> Self {
        Nested::Leaf(SymExpr::int(n as i64))
    }
}

impl From<f64> for Nested {
    fn from(f: f64) -> Self {
        Nested::Leaf(SymExpr::float(f))
    }
}

impl<T: Into<Nested>> From<Vec<T>> for Nested {
    fn from(items: Vec<T>) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

fn infer_shape(nested: &Nested) -> Vec<usize> {
    match nested {
        Nested::Leaf(_) => Vec::new(),
        Nested::List(items) => {
            let mut shape = vec![items.len()];
            if let Some(first) = items.first() {
                shape.extend(infer_shape(first));
            }
            shape
        }
    }
}

fn flatten_into(
    nested: &Nested,
    shape: &[usize],
    depth: usize,
    out: &mut Vec<SymExpr>,
) -> Result<()> {
    match (nested, shape.split_first()) {
        (Nested::Leaf(e), None) => {
            out.push(e.clone());
            Ok(())
        }
        (Nested::List(items), Some((len, rest))) if items.len() == *len => items
            .iter()
            .try_for_each(|item| flatten_into(item, rest, depth + 1, out)),
        (Nested::List(items), Some((len, _))) => Err(SymbolicError::RaggedArray(format!(
            "expected {len} elements at depth {depth}, found {}",
            items.len()
        ))),
        (Nested::Leaf(_), Some(_)) => Err(SymbolicError::RaggedArray(format!(
            "expected a list at depth {depth}, found a scalar"
        ))),
        (Nested::List(_), None) => Err(SymbolicError::RaggedArray(format!(
            "expected a scalar at depth {depth}, found a list"
        ))),
    }
}

/// A row-major n-dimensional array of symbolic expressions
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymArray {
    shape: Vec<usize>,
    data: Vec<SymExpr>,
}

impl SymArray {
    /// Rank-0 array holding a single expression
    pub fn scalar(value: impl Into<SymExpr>) -> Self {
        SymArray {
            shape: Vec::new(),
            data: vec![value.into()],
        }
    }

    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<SymExpr>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(SymbolicError::ShapeMismatch {
                shape,
                expected,
                found: data.len(),
            });
        }
        Ok(SymArray { shape, data })
    }

    /// Build from nested lists. Every list at the same depth must have the
    /// same length.
    pub fn from_nested(nested: &Nested) -> Result<Self> {
        let shape = infer_shape(nested);
        let mut data = Vec::with_capacity(shape.iter().product());
        flatten_into(nested, &shape, 0, &mut data)?;
        Ok(SymArray { shape, data })
    }

    /// Build by evaluating `f` at every multi-index in row-major order.
    pub fn from_fn(shape: Vec<usize>, mut f: impl FnMut(&[usize]) -> SymExpr) -> Self {
        let len: usize = shape.iter().product();
        let data = (0..len).map(|flat| f(&unravel(&shape, flat))).collect();
        SymArray { shape, data }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in row-major order
    pub fn data(&self) -> &[SymExpr] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymExpr> {
        self.data.iter()
    }

    /// `(multi-index, element)` pairs in row-major order
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Vec<usize>, &SymExpr)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(flat, e)| (unravel(&self.shape, flat), e))
    }

    /// The single element of a rank-0 array
    pub fn as_scalar(&self) -> Option<&SymExpr> {
        if self.rank() == 0 {
            self.data.first()
        } else {
            None
        }
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.rank() {
            return Err(SymbolicError::RankMismatch {
                expected: self.rank(),
                found: index.len(),
            });
        }
        let mut flat = 0;
        for (axis, (&i, &size)) in index.iter().zip(&self.shape).enumerate() {
            if i >= size {
                return Err(SymbolicError::IndexOutOfBounds {
                    axis,
                    index: i,
                    size,
                });
            }
            flat = flat * size + i;
        }
        Ok(flat)
    }

    pub fn get(&self, index: &[usize]) -> Result<&SymExpr> {
        let flat = self.flat_index(index)?;
        Ok(&self.data[flat])
    }

    pub fn map(&self, f: impl FnMut(&SymExpr) -> SymExpr) -> SymArray {
        SymArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Element-wise `simplify`
    pub fn simplify(&self) -> SymArray {
        self.map(SymExpr::simplify)
    }

    pub fn substitute(&self, target: &SymExpr, value: &SymExpr) -> SymArray {
        self.map(|e| e.substitute(target, value))
    }

    /// Element-wise sequential substitution
    pub fn subs(&self, pairs: &[(SymExpr, SymExpr)]) -> SymArray {
        self.map(|e| e.subs(pairs))
    }

    pub fn free_vars(&self) -> BTreeSet<Symbol> {
        self.data.iter().flat_map(SymExpr::free_vars).collect()
    }

    pub fn undefined_functions(&self) -> BTreeSet<SymExpr> {
        self.data.iter().flat_map(SymExpr::undefined_functions).collect()
    }

    pub fn to_nested(&self) -> Nested {
        fn build(shape: &[usize], data: &[SymExpr]) -> Nested {
            match shape.split_first() {
                None => Nested::Leaf(data[0].clone()),
                Some((&len, rest)) => {
                    let stride: usize = rest.iter().product();
                    Nested::List(
                        (0..len)
                            .map(|i| build(rest, &data[i * stride..(i + 1) * stride]))
                            .collect(),
                    )
                }
            }
        }
        build(&self.shape, &self.data)
    }

    fn fmt_axis(&self, f: &mut fmt::Formatter<'_>, axis: usize, offset: usize) -> fmt::Result {
        if axis == self.rank() {
            return write!(f, "{}", self.data[offset]);
        }
        let stride: usize = self.shape[axis + 1..].iter().product();
        write!(f, "[")?;
        for i in 0..self.shape[axis] {
            if i > 0 {
                write!(f, ", ")?;
            }
            self.fmt_axis(f, axis + 1, offset + i * stride)?;
        }
        write!(f, "]")
    }
}

/// Row-major multi-index of a flat position
fn unravel(shape: &[usize], mut flat: usize) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &size) in index.iter_mut().zip(shape).rev() {
        if size > 0 {
            *slot = flat % size;
            flat /= size;
        }
    }
    index
}

impl From<SymExpr> for SymArray {
    fn from(e: SymExpr) -> Self {
        SymArray::scalar(e)
    }
}

impl TryFrom<Nested> for SymArray {
    type Error = SymbolicError;

    fn try_from(nested: Nested) -> Result<Self> {
        SymArray::from_nested(&nested)
    }
}

impl Index<&[usize]> for SymArray {
    type Output = SymExpr;

    /// Panics on a wrong number of indices or an out-of-bounds index; use
    /// `get` for a fallible lookup.
    fn index(&self, index: &[usize]) -> &SymExpr {
        match self.flat_index(index) {
            Ok(flat) => &self.data[flat],
            Err(e) => panic!("{e}"),
        }
    }
}

impl<const N: usize> Index<[usize; N]> for SymArray {
    type Output = SymExpr;

    fn index(&self, index: [usize; N]) -> &SymExpr {
        &self[&index[..]]
    }
}

impl fmt::Display for SymArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[]");
        }
        self.fmt_axis(f, 0, 0)
    }
}

impl fmt::Debug for SymArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymArray(shape={:?}, {})", self.shape, self)
    }
}
