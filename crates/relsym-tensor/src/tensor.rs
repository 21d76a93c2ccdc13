//! Validated symbolic tensors

use crate::error::Result;
use crate::index::IndexConfig;
use relsym_symbolic::{Nested, SymArray, SymExpr, Symbol};
use std::collections::BTreeSet;
use std::fmt;
use std::ops;

/// Anything a tensor can be built from, classified once at construction
#[derive(Debug, Clone)]
pub enum TensorInput {
    /// A number or expression; rank 0
    Scalar(SymExpr),
    /// Nested lists, validated into a rectangular array
    Nested(Nested),
    /// An existing array
    Array(SymArray),
}

impl TensorInput {
    fn into_array(self) -> Result<SymArray> {
        Ok(match self {
            TensorInput::Scalar(e) => SymArray::scalar(e),
            TensorInput::Nested(n) => SymArray::from_nested(&n)?,
            TensorInput::Array(a) => a,
        })
    }
}

impl From<SymExpr> for TensorInput {
    fn from(e: SymExpr) -> Self {
        TensorInput::Scalar(e)
    }
}

impl From<&SymExpr> for TensorInput {
    fn from(e: &SymExpr) -> Self {
        TensorInput::Scalar(e.clone())
    }
}

impl From<i64> for TensorInput {
    fn from(n: i64) -> Self {
        TensorInput::Scalar(SymExpr::int(n))
    }
}

impl From<i32> for TensorInput {
    fn from(n: i32) -> Self {
        TensorInput::Scalar(SymExpr::int(n as i64))
    }
}

impl From<f64> for TensorInput {
    fn from(f: f64) -> Self {
        TensorInput::Scalar(SymExpr::float(f))
    }
}

impl From<Nested> for TensorInput {
    fn from(n: Nested) -> Self {
        match n {
            Nested::Leaf(e) => TensorInput::Scalar(e),
            list => TensorInput::Nested(list),
        }
    }
}

impl<T: Into<Nested>> From<Vec<T>> for TensorInput {
    fn from(items: Vec<T>) -> Self {
        TensorInput::Nested(Nested::from(items))
    }
}

impl From<SymArray> for TensorInput {
    fn from(a: SymArray) -> Self {
        TensorInput::Array(a)
    }
}

impl From<&SymArray> for TensorInput {
    fn from(a: &SymArray) -> Self {
        TensorInput::Array(a.clone())
    }
}

/// A symbolic tensor: components, order, and index configuration.
///
/// The configuration always has exactly `order` indices.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    arr: SymArray,
    order: usize,
    config: IndexConfig,
    name: Option<String>,
}

impl Tensor {
    /// Tensor with every index lower
    pub fn new(arr: impl Into<TensorInput>) -> Result<Self> {
        let arr = arr.into().into_array()?;
        let config = IndexConfig::all_lower(arr.rank());
        Ok(Self::from_parts(arr, config))
    }

    /// Tensor with an explicit configuration string such as `"ul"`
    pub fn with_config(arr: impl Into<TensorInput>, config: &str) -> Result<Self> {
        let arr = arr.into().into_array()?;
        let config = IndexConfig::parse_for_order(config, arr.rank())?;
        Ok(Self::from_parts(arr, config))
    }

    /// Tensor with an already parsed configuration
    pub fn with_index_config(arr: impl Into<TensorInput>, config: IndexConfig) -> Result<Self> {
        let arr = arr.into().into_array()?;
        config.check_order(arr.rank())?;
        Ok(Self::from_parts(arr, config))
    }

    /// Tensor whose configuration comes from a dynamic value; non-strings
    /// are rejected.
    pub fn with_config_value(
        arr: impl Into<TensorInput>,
        config: &serde_json::Value,
    ) -> Result<Self> {
        let arr = arr.into().into_array()?;
        let config = IndexConfig::from_value(config, arr.rank())?;
        Ok(Self::from_parts(arr, config))
    }

    fn from_parts(arr: SymArray, config: IndexConfig) -> Self {
        log::debug!(
            "tensor of order {} with shape {:?}, config {:?}",
            arr.rank(),
            arr.shape(),
            config.to_string()
        );
        Tensor {
            order: arr.rank(),
            arr,
            config,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The component array
    pub fn tensor(&self) -> &SymArray {
        &self.arr
    }

    pub fn into_array(self) -> SymArray {
        self.arr
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn shape(&self) -> &[usize] {
        self.arr.shape()
    }

    pub fn get(&self, index: &[usize]) -> Result<&SymExpr> {
        Ok(self.arr.get(index)?)
    }

    /// Component-wise simplified array; `self` is unchanged.
    pub fn simplify(&self) -> SymArray {
        self.arr.simplify()
    }

    /// The same tensor with simplified components
    pub fn simplified(&self) -> Tensor {
        self.with_array(self.simplify())
    }

    /// Replace `target` by `value` in every component.
    pub fn subs(&self, target: impl Into<SymExpr>, value: impl Into<SymExpr>) -> Tensor {
        let (target, value) = (target.into(), value.into());
        self.with_array(self.arr.substitute(&target, &value))
    }

    /// Apply the pairs one after another to every component.
    pub fn subs_many(&self, pairs: &[(SymExpr, SymExpr)]) -> Tensor {
        self.with_array(self.arr.subs(pairs))
    }

    pub fn free_vars(&self) -> BTreeSet<Symbol> {
        self.arr.free_vars()
    }

    pub fn undefined_functions(&self) -> BTreeSet<SymExpr> {
        self.arr.undefined_functions()
    }

    /// Same configuration and name over new components of the same shape
    fn with_array(&self, arr: SymArray) -> Tensor {
        Tensor {
            arr,
            order: self.order,
            config: self.config.clone(),
            name: self.name.clone(),
        }
    }
}

impl ops::Index<&[usize]> for Tensor {
    type Output = SymExpr;

    fn index(&self, index: &[usize]) -> &SymExpr {
        &self.arr[index]
    }
}

impl<const N: usize> ops::Index<[usize; N]> for Tensor {
    type Output = SymExpr;

    fn index(&self, index: [usize; N]) -> &SymExpr {
        &self.arr[index]
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} ")?;
        }
        write!(f, "Tensor[{}] {}", self.config, self.arr)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("order", &self.order)
            .field("config", &format_args!("{:?}", self.config.to_string()))
            .field("name", &self.name)
            .field("arr", &format_args!("{}", self.arr))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TensorError;
    use relsym_symbolic::parse;

    fn p(s: &str) -> SymExpr {
        parse(s).unwrap()
    }

    #[test]
    fn test_default_config_is_all_lower() {
        let t = Tensor::new(vec![vec![p("x"), p("y")], vec![p("y"), p("x")]]).unwrap();
        assert_eq!(t.order(), 2);
        assert_eq!(t.config().to_string(), "ll");
    }

    #[test]
    fn test_scalar_inputs_have_order_zero() {
        for t in [
            Tensor::new(11.89).unwrap(),
            Tensor::new(p("y*z + 5")).unwrap(),
            Tensor::new(3).unwrap(),
        ] {
            assert_eq!(t.order(), 0);
            assert_eq!(t.tensor().rank(), 0);
            assert!(t.config().is_empty());
        }
    }

    #[test]
    fn test_config_errors() {
        let arr = vec![p("x"), p("y")];
        assert!(matches!(
            Tensor::with_config(arr.clone(), "a"),
            Err(TensorError::InvalidIndex { found: 'a', .. })
        ));
        assert!(matches!(
            Tensor::with_config(arr.clone(), "lu"),
            Err(TensorError::ConfigLength { expected: 1, found: 2, .. })
        ));
        assert!(matches!(
            Tensor::with_config_value(arr, &serde_json::json!(0)),
            Err(TensorError::ConfigNotString(_))
        ));
    }

    #[test]
    fn test_ragged_input_is_rejected() {
        let ragged = Nested::List(vec![Nested::from(vec![1, 2]), Nested::from(vec![3])]);
        assert!(matches!(Tensor::new(ragged), Err(TensorError::Symbolic(_))));
    }

    #[test]
    fn test_subs_keeps_config_and_name() {
        let t = Tensor::with_config(vec![p("a*x"), p("a + 1")], "u")
            .unwrap()
            .with_name("v");
        let s = t.subs(p("a"), 2);
        assert_eq!(s[[0]], p("2*x"));
        assert_eq!(s[[1]], SymExpr::int(3));
        assert_eq!(s.config(), t.config());
        assert_eq!(s.name(), Some("v"));
        // original untouched
        assert_eq!(t[[1]], p("a + 1"));
    }

    #[test]
    fn test_display_and_debug() {
        let t = Tensor::with_config(vec![p("x"), p("x**2")], "u").unwrap().with_name("A");
        assert_eq!(t.to_string(), "A Tensor[u] [x, x**2]");
        let debug = format!("{:?}", t);
        assert!(debug.starts_with("Tensor {"));
        assert!(debug.contains("config: \"u\""));
        assert!(!debug.contains("0x"));
    }
}
