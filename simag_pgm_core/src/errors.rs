//! Error types returned by factor construction, the factor algebra and
//! the inference queries.
//!
//! Every failure is local and synchronous: it is returned at the point of
//! detection and aborts the current query.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferenceError>;

#[derive(Debug, Error)]
pub enum InferenceError {
    /// The shape of a factor or of the network does not allow the operation.
    #[error("simag: structural error: {0}")]
    Structural(#[from] StructuralErr),

    /// A label is not part of the declared domain of the variable.
    #[error("simag: value `{value}` is not in the domain of `{var}`")]
    Domain { var: String, value: String },

    /// Normalization failed, the evidence has zero-probability support.
    #[error("simag: arithmetic error: {0}")]
    Arithmetic(String),

    #[error("simag: configuration error: {0}")]
    Configuration(#[from] ConfigErr),

    #[error("simag: failed reading network file: {0}")]
    Io(#[from] std::io::Error),

    #[error("simag: failed parsing network file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum StructuralErr {
    #[error("variable `{var}` not in factor scope")]
    MissingScopeVar { var: String },

    #[error("cardinality of `{var}` differs between factors ({left} != {right})")]
    CardinalityMismatch {
        var: String,
        left: usize,
        right: usize,
    },

    #[error("assignment does not provide a value for `{var}`")]
    MissingAssignment { var: String },

    #[error("no factors left to join")]
    EmptyFactorList,

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("variable `{0}` declared more than once")]
    DuplicateVariable(String),

    #[error("variable `{0}` is both queried and observed")]
    QueryIsEvidence(String),

    #[error("a query requires at least one variable")]
    EmptyQuery,

    #[error("factor over {scope:?} requires {expected} values, found {found}")]
    ValuesLength {
        scope: Vec<String>,
        expected: usize,
        found: usize,
    },

    #[error("the network contains a cycle")]
    Cycle,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigErr {
    #[error("`{var}` has an empty domain")]
    EmptyDomain { var: String },

    #[error("label `{label}` repeated in the domain of `{var}`")]
    DuplicateLabel { var: String, label: String },

    #[error("`{var}` depends on undeclared parent `{parent}`")]
    UnknownParent { var: String, parent: String },

    #[error("`{var}` lists `{parent}` as a parent more than once or depends on itself")]
    RepeatedParent { var: String, parent: String },

    #[error("`{var}` has an unconditional table but declares parents, or the reverse")]
    CptKind { var: String },

    #[error("`{var}` expected a probability vector of length {expected}, found {found}")]
    RowLength {
        var: String,
        expected: usize,
        found: usize,
    },

    #[error("probability vector of `{var}` sums to {sum}")]
    RowSum { var: String, sum: f64 },

    #[error("`{var}` has a probability outside [0, 1]: {value}")]
    ProbabilityRange { var: String, value: f64 },

    #[error("`{var}` has no probability vector for parent outcomes {key:?}")]
    MissingRow { var: String, key: Vec<String> },

    #[error("`{var}` has a probability vector for unknown parent outcomes {key:?}")]
    UnexpectedRow { var: String, key: Vec<String> },

    #[error("malformed network data: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub(crate) fn domain(var: &str, value: &str) -> InferenceError {
        InferenceError::Domain {
            var: var.to_owned(),
            value: value.to_owned(),
        }
    }
}
