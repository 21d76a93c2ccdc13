//! Tensors described in TOML or JSON
//!
//! ```toml
//! name = "schwarzschild"
//! config = "ll"
//! coords = ["t", "r", "theta", "phi"]
//! components = [
//!     ["1 - a/r", 0, 0, 0],
//!     [0, "-1/((1 - a/r)*c**2)", 0, 0],
//!     [0, 0, "-r**2/c**2", 0],
//!     [0, 0, 0, "-r**2*sin(theta)**2/c**2"],
//! ]
//! ```
//!
//! Components are nested arrays of expression strings or numbers. `config`
//! must be a string when present; it defaults to all lower indices.

use crate::error::{Result, TensorError};
use crate::index::IndexConfig;
use crate::relativity::BaseRelativityTensor;
use crate::tensor::Tensor;
use log::{debug, info};
use relsym_symbolic::{parse, Nested, SymArray, SymExpr, Symbol};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<String>>,
    pub components: Value,
}

impl TensorDocument {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a document, choosing the format by file extension. Files
    /// without a known extension are tried as TOML, then JSON.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let doc = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            _ => {
                if let Ok(doc) = Self::from_toml_str(&content) {
                    doc
                } else if let Ok(doc) = Self::from_json_str(&content) {
                    doc
                } else {
                    return Err(TensorError::UnsupportedFormat(path.display().to_string()));
                }
            }
        };
        info!("Loaded tensor document from: {}", path.display());
        Ok(doc)
    }

    /// Save a document, choosing the format by file extension.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(TensorError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };
        fs::write(path, content)?;
        info!("Tensor document saved to: {}", path.display());
        Ok(())
    }

    /// Describe an existing tensor. Components holding an infinite or NaN
    /// number cannot be written back as text and are rejected.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self> {
        Ok(TensorDocument {
            name: tensor.name().map(str::to_string),
            config: Some(Value::String(tensor.config().to_string())),
            coords: None,
            variables: None,
            functions: None,
            components: to_value(&tensor.tensor().to_nested())?,
        })
    }

    pub fn from_relativity_tensor(tensor: &BaseRelativityTensor) -> Result<Self> {
        Ok(TensorDocument {
            coords: Some(tensor.symbols().iter().map(|s| s.name.clone()).collect()),
            variables: Some(tensor.variables().iter().map(|s| s.name.clone()).collect()),
            functions: Some(tensor.functions().iter().map(ToString::to_string).collect()),
            ..Self::from_tensor(tensor.as_tensor())?
        })
    }

    /// Parsed component array
    pub fn components(&self) -> Result<SymArray> {
        Ok(SymArray::from_nested(&to_nested(&self.components)?)?)
    }

    pub fn to_tensor(&self) -> Result<Tensor> {
        let arr = self.components()?;
        let config = match &self.config {
            Some(value) => IndexConfig::from_value(value, arr.rank())?,
            None => IndexConfig::all_lower(arr.rank()),
        };
        debug!("tensor document {:?}: config {}", self.name, config);
        let tensor = Tensor::with_index_config(arr, config)?;
        Ok(match &self.name {
            Some(name) => tensor.with_name(name),
            None => tensor,
        })
    }

    /// A relativity tensor over `coords`. Listed `variables` and
    /// `functions` must match those found in the components.
    pub fn to_relativity_tensor(&self) -> Result<BaseRelativityTensor> {
        let coords = self.coords.as_ref().ok_or(TensorError::MissingCoordinates)?;
        let syms = coords.iter().map(|c| Symbol::new(c.as_str())).collect();
        let mut tensor = BaseRelativityTensor::from_tensor(self.to_tensor()?, syms);
        if let Some(variables) = &self.variables {
            tensor = tensor.with_variables(variables.iter().map(|v| Symbol::new(v.as_str())))?;
        }
        if let Some(functions) = &self.functions {
            let parsed = functions
                .iter()
                .map(|f| parse_function(f))
                .collect::<Result<Vec<_>>>()?;
            tensor = tensor.with_functions(parsed)?;
        }
        Ok(tensor)
    }
}

/// A bare name such as `f3` denotes the undefined function itself.
fn parse_function(text: &str) -> Result<SymExpr> {
    let parsed = parse(text)?;
    Ok(match parsed.as_var() {
        Some(sym) => SymExpr::undef(sym.name(), vec![]),
        None => parsed,
    })
}

fn to_nested(value: &Value) -> Result<Nested> {
    match value {
        Value::Array(items) => Ok(Nested::List(
            items.iter().map(to_nested).collect::<Result<_>>()?,
        )),
        Value::String(s) => parse(s).map(Nested::Leaf).map_err(|e| TensorError::InvalidComponent {
            component: format!("{s:?}"),
            reason: e.to_string(),
        }),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Nested::from(i)),
            (None, Some(f)) => Ok(Nested::from(f)),
            (None, None) => Err(TensorError::InvalidComponent {
                component: n.to_string(),
                reason: "number out of range".to_string(),
            }),
        },
        other => Err(TensorError::InvalidComponent {
            component: other.to_string(),
            reason: "expected an expression string, a number or an array".to_string(),
        }),
    }
}

fn to_value(nested: &Nested) -> Result<Value> {
    match nested {
        Nested::Leaf(e) if has_non_finite(e) => Err(TensorError::InvalidComponent {
            component: e.to_string(),
            reason: "non-finite number".to_string(),
        }),
        Nested::Leaf(e) => Ok(match e.as_coeff().and_then(|c| c.as_integer()) {
            Some(n) => Value::from(n),
            None => Value::String(e.to_string()),
        }),
        Nested::List(items) => Ok(Value::Array(
            items.iter().map(to_value).collect::<Result<_>>()?,
        )),
    }
}

fn has_non_finite(expr: &SymExpr) -> bool {
    let mut found = false;
    expr.walk(&mut |node| {
        if node.as_coeff().is_some_and(|c| !c.to_f64().is_finite()) {
            found = true;
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_document() {
        let doc = TensorDocument::from_json_str(
            r#"{"config": "ul", "components": [["x", 0], [1, "y**2"]]}"#,
        )
        .unwrap();
        let t = doc.to_tensor().unwrap();
        assert_eq!(t.config().to_string(), "ul");
        assert_eq!(t[[1, 1]], parse("y**2").unwrap());
        assert!(t.name().is_none());
    }

    #[test]
    fn test_non_string_config_rejected() {
        let doc = TensorDocument::from_json_str(r#"{"config": 0, "components": [1, 2]}"#).unwrap();
        assert!(matches!(doc.to_tensor(), Err(TensorError::ConfigNotString(_))));
    }

    #[test]
    fn test_invalid_component() {
        let doc = TensorDocument::from_json_str(r#"{"components": ["x +", true]}"#).unwrap();
        assert!(matches!(
            doc.to_tensor(),
            Err(TensorError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_relativity_requires_coords() {
        let doc = TensorDocument::from_json_str(r#"{"components": ["r"]}"#).unwrap();
        assert!(matches!(
            doc.to_relativity_tensor(),
            Err(TensorError::MissingCoordinates)
        ));
    }

    #[test]
    fn test_non_finite_component_rejected() {
        let huge = parse("2**100000*x").unwrap();
        let t = Tensor::new(vec![huge, SymExpr::var("y")]).unwrap();
        assert!(matches!(
            TensorDocument::from_tensor(&t),
            Err(TensorError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_bare_function_names() {
        assert_eq!(parse_function("f3").unwrap(), SymExpr::undef("f3", vec![]));
        assert_eq!(
            parse_function("f2(c)").unwrap(),
            SymExpr::undef("f2", vec![SymExpr::var("c")])
        );
    }
}
