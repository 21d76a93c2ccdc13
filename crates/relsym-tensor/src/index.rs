//! Index variance and index configurations

use crate::error::{Result, TensorError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Variance of a single tensor index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// Covariant, written `'l'`
    Lower,
    /// Contravariant, written `'u'`
    Upper,
}

impl Index {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'l' => Some(Index::Lower),
            'u' => Some(Index::Upper),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Index::Lower => 'l',
            Index::Upper => 'u',
        }
    }

    /// The opposite variance, the only one a contraction partner may have
    pub fn flip(self) -> Self {
        match self {
            Index::Lower => Index::Upper,
            Index::Upper => Index::Lower,
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Lower => f.write_str("lower"),
            Index::Upper => f.write_str("upper"),
        }
    }
}

/// A validated index configuration such as `"ll"` or `"ul"`.
///
/// The empty configuration belongs to scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IndexConfig(Vec<Index>);

impl IndexConfig {
    pub fn new(indices: Vec<Index>) -> Self {
        IndexConfig(indices)
    }

    pub fn all_lower(order: usize) -> Self {
        IndexConfig(vec![Index::Lower; order])
    }

    /// Parse a configuration string. Every character must be `'l'` or `'u'`.
    pub fn parse(config: &str) -> Result<Self> {
        config
            .chars()
            .enumerate()
            .map(|(position, found)| {
                Index::from_char(found).ok_or_else(|| TensorError::InvalidIndex {
                    config: config.to_string(),
                    position,
                    found,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(IndexConfig)
    }

    /// Parse a configuration string and check it has one index per order.
    pub fn parse_for_order(config: &str, order: usize) -> Result<Self> {
        let parsed = Self::parse(config)?;
        parsed.check_order(order)?;
        Ok(parsed)
    }

    /// Parse a configuration held in a dynamic value, e.g. from a tensor
    /// document. Anything other than a string is rejected.
    pub fn from_value(value: &serde_json::Value, order: usize) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse_for_order(s, order),
            other => Err(TensorError::ConfigNotString(value_kind(other))),
        }
    }

    pub fn check_order(&self, order: usize) -> Result<()> {
        if self.len() != order {
            return Err(TensorError::ConfigLength {
                config: self.to_string(),
                expected: order,
                found: self.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<Index> {
        self.0.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Index> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Index] {
        &self.0
    }

    /// Configuration of an outer product: `self` followed by `other`
    pub fn concat(&self, other: &IndexConfig) -> IndexConfig {
        IndexConfig(self.0.iter().chain(&other.0).copied().collect())
    }

    /// The configuration with the index at `position` removed
    pub fn without(&self, position: usize) -> IndexConfig {
        IndexConfig(
            self.0
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != position)
                .map(|(_, idx)| *idx)
                .collect(),
        )
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl FromStr for IndexConfig {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self> {
        IndexConfig::parse(s)
    }
}

impl fmt::Display for IndexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|idx| write!(f, "{}", idx.as_char()))
    }
}

impl Serialize for IndexConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IndexConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        IndexConfig::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid() {
        let config = IndexConfig::parse("ul").unwrap();
        assert_eq!(config.as_slice(), &[Index::Upper, Index::Lower]);
        assert_eq!(config.to_string(), "ul");
        assert!(IndexConfig::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_any_invalid_character_rejects_config() {
        let err = IndexConfig::parse("al").unwrap_err();
        assert!(matches!(
            err,
            TensorError::InvalidIndex { position: 0, found: 'a', .. }
        ));
        assert!(matches!(
            IndexConfig::parse("llxu"),
            Err(TensorError::InvalidIndex { position: 2, found: 'x', .. })
        ));
        assert!(IndexConfig::parse("L").is_err());
    }

    #[test]
    fn test_length_must_match_order() {
        assert!(IndexConfig::parse_for_order("ll", 2).is_ok());
        assert!(matches!(
            IndexConfig::parse_for_order("lll", 2),
            Err(TensorError::ConfigLength { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn test_non_string_value_rejected() {
        assert!(matches!(
            IndexConfig::from_value(&json!(0), 2),
            Err(TensorError::ConfigNotString("a number"))
        ));
        assert!(matches!(
            IndexConfig::from_value(&json!(["l", "l"]), 2),
            Err(TensorError::ConfigNotString(_))
        ));
        assert_eq!(
            IndexConfig::from_value(&json!("lu"), 2).unwrap(),
            IndexConfig::new(vec![Index::Lower, Index::Upper])
        );
    }

    #[test]
    fn test_flip_swaps_variance() {
        assert_eq!(Index::Lower.flip(), Index::Upper);
        assert_eq!(Index::Upper.flip().flip(), Index::Upper);
    }

    #[test]
    fn test_concat_and_without() {
        let a = IndexConfig::parse("ul").unwrap();
        let b = IndexConfig::parse("u").unwrap();
        assert_eq!(a.concat(&b).to_string(), "ulu");
        assert_eq!(a.concat(&b).without(1).to_string(), "uu");
    }

    #[test]
    fn test_serde_as_string() {
        let config = IndexConfig::parse("lu").unwrap();
        assert_eq!(serde_json::to_string(&config).unwrap(), "\"lu\"");
        let back: IndexConfig = serde_json::from_str("\"lu\"").unwrap();
        assert_eq!(back, config);
        assert!(serde_json::from_str::<IndexConfig>("\"lq\"").is_err());
    }
}
