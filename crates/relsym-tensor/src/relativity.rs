//! Tensors over a coordinate system

use crate::error::{Result, TensorError};
use crate::index::IndexConfig;
use crate::tensor::{Tensor, TensorInput};
use relsym_symbolic::{SymArray, SymExpr, Symbol};
use std::collections::BTreeSet;
use std::fmt;
use std::ops;

/// A tensor over coordinate symbols `syms`.
///
/// `variables` are the free symbols of the components that are not
/// coordinates; `functions` are the undefined function applications in the
/// components. Both are always inferred from the components. Explicitly
/// supplied sets are checked against the inferred ones.
#[derive(Clone, PartialEq)]
pub struct BaseRelativityTensor {
    tensor: Tensor,
    syms: Vec<Symbol>,
    variables: BTreeSet<Symbol>,
    functions: BTreeSet<SymExpr>,
}

impl BaseRelativityTensor {
    pub fn new(arr: impl Into<TensorInput>, syms: Vec<Symbol>, config: &str) -> Result<Self> {
        Ok(Self::from_tensor(Tensor::with_config(arr, config)?, syms))
    }

    pub fn with_index_config(
        arr: impl Into<TensorInput>,
        syms: Vec<Symbol>,
        config: IndexConfig,
    ) -> Result<Self> {
        Ok(Self::from_tensor(Tensor::with_index_config(arr, config)?, syms))
    }

    /// Wrap an existing tensor, inferring variables and functions.
    pub fn from_tensor(tensor: Tensor, syms: Vec<Symbol>) -> Self {
        let coords: BTreeSet<&Symbol> = syms.iter().collect();
        let variables: BTreeSet<Symbol> = tensor
            .free_vars()
            .into_iter()
            .filter(|s| !coords.contains(s))
            .collect();
        let functions = tensor.undefined_functions();
        log::debug!(
            "relativity tensor over {} coordinates: {} variables, {} functions",
            syms.len(),
            variables.len(),
            functions.len()
        );
        BaseRelativityTensor {
            tensor,
            syms,
            variables,
            functions,
        }
    }

    /// Check explicitly supplied variables against the inferred set.
    pub fn with_variables(self, variables: impl IntoIterator<Item = Symbol>) -> Result<Self> {
        let explicit: BTreeSet<Symbol> = variables.into_iter().collect();
        if explicit != self.variables {
            return Err(TensorError::VariablesMismatch {
                explicit: names(&explicit),
                inferred: names(&self.variables),
            });
        }
        Ok(self)
    }

    /// Check explicitly supplied functions against the inferred set.
    pub fn with_functions(self, functions: impl IntoIterator<Item = SymExpr>) -> Result<Self> {
        let explicit: BTreeSet<SymExpr> = functions.into_iter().collect();
        if explicit != self.functions {
            return Err(TensorError::FunctionsMismatch {
                explicit: names(&explicit),
                inferred: names(&self.functions),
            });
        }
        Ok(self)
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        BaseRelativityTensor {
            tensor: self.tensor.with_name(name),
            ..self
        }
    }

    /// Coordinate symbols, in order
    pub fn symbols(&self) -> &[Symbol] {
        &self.syms
    }

    pub fn variables(&self) -> &BTreeSet<Symbol> {
        &self.variables
    }

    pub fn functions(&self) -> &BTreeSet<SymExpr> {
        &self.functions
    }

    pub fn tensor(&self) -> &SymArray {
        self.tensor.tensor()
    }

    pub fn as_tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }

    pub fn order(&self) -> usize {
        self.tensor.order()
    }

    pub fn config(&self) -> &IndexConfig {
        self.tensor.config()
    }

    pub fn name(&self) -> Option<&str> {
        self.tensor.name()
    }

    pub fn get(&self, index: &[usize]) -> Result<&SymExpr> {
        self.tensor.get(index)
    }

    pub fn simplify(&self) -> SymArray {
        self.tensor.simplify()
    }

    pub fn simplified(&self) -> Self {
        self.rewrap(self.tensor.simplified())
    }

    pub fn subs(&self, target: impl Into<SymExpr>, value: impl Into<SymExpr>) -> Self {
        self.rewrap(self.tensor.subs(target, value))
    }

    pub fn subs_many(&self, pairs: &[(SymExpr, SymExpr)]) -> Self {
        self.rewrap(self.tensor.subs_many(pairs))
    }

    /// Same coordinates over new components; sets are re-inferred.
    pub(crate) fn rewrap(&self, tensor: Tensor) -> Self {
        Self::from_tensor(tensor, self.syms.clone())
    }
}

fn names<T: ToString>(items: &BTreeSet<T>) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl ops::Index<&[usize]> for BaseRelativityTensor {
    type Output = SymExpr;

    fn index(&self, index: &[usize]) -> &SymExpr {
        &self.tensor[index]
    }
}

impl<const N: usize> ops::Index<[usize; N]> for BaseRelativityTensor {
    type Output = SymExpr;

    fn index(&self, index: [usize; N]) -> &SymExpr {
        &self.tensor[index]
    }
}

impl fmt::Display for BaseRelativityTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coords: Vec<_> = self.syms.iter().map(Symbol::name).collect();
        write!(f, "{} over ({})", self.tensor, coords.join(", "))
    }
}

impl fmt::Debug for BaseRelativityTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRelativityTensor")
            .field("tensor", &self.tensor)
            .field("syms", &self.syms.iter().map(Symbol::name).collect::<Vec<_>>())
            .field("variables", &names(&self.variables))
            .field("functions", &names(&self.functions))
            .finish()
    }
}
