use crate::index::Index;
use relsym_symbolic::SymbolicError;

/// Errors raised while building or combining tensors
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    #[error("config must be a string, got {0}")]
    ConfigNotString(&'static str),

    #[error("invalid index '{found}' at position {position} in config {config:?}, expected l or u")]
    InvalidIndex {
        config: String,
        position: usize,
        found: char,
    },

    #[error("config {config:?} has {found} indices but the tensor has order {expected}")]
    ConfigLength {
        config: String,
        expected: usize,
        found: usize,
    },

    #[error("explicit variables {explicit:?} differ from inferred variables {inferred:?}")]
    VariablesMismatch {
        explicit: Vec<String>,
        inferred: Vec<String>,
    },

    #[error("explicit functions {explicit:?} differ from inferred functions {inferred:?}")]
    FunctionsMismatch {
        explicit: Vec<String>,
        inferred: Vec<String>,
    },

    #[error("coordinate symbols differ: {left:?} vs {right:?}")]
    CoordinateMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("contraction index {index} out of range for a tensor of order {order}")]
    ContractionIndex { index: usize, order: usize },

    #[error("cannot contract two indices that are both {0}")]
    ContractionVariance(Index),

    #[error("contracted dimensions differ: {left} vs {right}")]
    ContractionDimension { left: usize, right: usize },

    #[error("invalid component {component}: {reason}")]
    InvalidComponent { component: String, reason: String },

    #[error("tensor document has no coordinates")]
    MissingCoordinates,

    #[error("unsupported tensor document format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Symbolic(#[from] SymbolicError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TensorError>;
