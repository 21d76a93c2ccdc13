//! Symbolic variables

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named symbolic variable such as a coordinate `r` or a parameter `M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// Create symbols from a whitespace and/or comma separated list of names.
///
/// `symbols("t r theta phi")` yields four symbols in that order.
pub fn symbols(names: &str) -> Vec<Symbol> {
    names
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(Symbol::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_splitting() {
        let syms = symbols("t r theta phi");
        let names: Vec<_> = syms.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["t", "r", "theta", "phi"]);

        assert_eq!(symbols("a, b ,c").len(), 3);
        assert!(symbols("  ").is_empty());
    }
}
