// Error types for rekord

use std::fmt;
use thiserror::Error;

/// Errors across the record layers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),
    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),
    #[error("Comparison error: {0}")]
    Compare(#[from] NotComparable),
    #[error("Hash error: {0}")]
    Hash(#[from] UnhashableError),
}

/// Invalid declarations, detected while building a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("'{0}' is not a valid identifier")]
    InvalidName(String),
    #[error("field '{field}' is declared more than once in record '{record}'")]
    DuplicateField { record: String, field: String },
    #[error("non-default argument '{field}' follows default argument '{after}' in record '{record}'")]
    NonDefaultAfterDefault {
        record: String,
        field: String,
        after: String,
    },
    #[error("field '{0}' cannot specify both default and default_factory")]
    DefaultAndFactory(String),
    #[error("mutable default {kind} for field '{field}' is not allowed: use default_factory")]
    MutableDefault { field: String, kind: &'static str },
    #[error("class variable '{0}' cannot use default_factory")]
    ClassVarFactory(String),
    #[error("class variable '{field}' in record '{record}' shadows an inherited field")]
    ClassVarShadowsField { record: String, field: String },
    #[error("cannot inherit {} record '{record}' from {} record '{ancestor}'", frozen_word(.frozen), ancestor_word(.frozen))]
    FrozenInheritance {
        record: String,
        ancestor: String,
        frozen: bool,
    },
}

fn frozen_word(frozen: &bool) -> &'static str {
    if *frozen {
        "frozen"
    } else {
        "non-frozen"
    }
}

fn ancestor_word(frozen: &bool) -> &'static str {
    frozen_word(&!*frozen)
}

/// Argument binding failures while constructing an instance
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("{record}() takes {expected} positional arguments but {given} were given")]
    TooManyArguments {
        record: String,
        expected: usize,
        given: usize,
    },
    #[error("{record}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { record: String, name: String },
    #[error("{record}() got multiple values for argument '{name}'")]
    MultipleValues { record: String, name: String },
    #[error("{record}() missing required arguments: {}", .names.join(", "))]
    MissingArguments { record: String, names: Vec<String> },
    #[error("field '{name}' of record '{record}' is not an init field and cannot be replaced")]
    NotInitField { record: String, name: String },
    #[error("post-init hook failed: {0}")]
    PostInit(#[from] MutationError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// The attempted mutation of a frozen instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Assign,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Assign => write!(f, "assign to"),
            Mutation::Delete => write!(f, "delete"),
        }
    }
}

/// Raised when a frozen instance is mutated after construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {mutation} field '{field}' of frozen record '{record}'")]
pub struct FrozenInstanceError {
    pub record: String,
    pub field: String,
    pub mutation: Mutation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("'{record}' has no attribute '{name}'")]
    Unknown { record: String, name: String },
    #[error("'{record}' attribute '{name}' is not set")]
    Unset { record: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Frozen(#[from] FrozenInstanceError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Ordering between two operands that do not support it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ordering not supported between instances of '{left}' and '{right}'")]
pub struct NotComparable {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhashable type: '{type_name}'")]
pub struct UnhashableError {
    pub type_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_messages() {
        let err = FrozenInstanceError {
            record: "Point".to_string(),
            field: "x".to_string(),
            mutation: Mutation::Delete,
        };
        assert_eq!(err.to_string(), "cannot delete field 'x' of frozen record 'Point'");

        let err = ConfigurationError::FrozenInheritance {
            record: "Child".to_string(),
            ancestor: "Base".to_string(),
            frozen: true,
        };
        assert_eq!(
            err.to_string(),
            "cannot inherit frozen record 'Child' from non-frozen record 'Base'"
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: RecordError = ConstructionError::MissingArguments {
            record: "Point".to_string(),
            names: vec!["x".to_string(), "y".to_string()],
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Construction error: Point() missing required arguments: x, y"
        );
    }
}
