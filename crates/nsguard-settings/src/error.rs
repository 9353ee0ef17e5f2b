use nsguard_domain::{AmbiguityError, PatternError};

/// Everything that can make a declaration unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown {field}: {value} (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("max_issue_count must be at least 1")]
    ZeroMaxIssueCount,

    #[error("invalid namespace pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("invalid excluded_files glob: {pattern}")]
    InvalidExclusion {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("rule '{from} -> {to}' is declared more than once")]
    DuplicateRule { from: String, to: String },

    #[error(transparent)]
    Ambiguous(#[from] AmbiguityError),
}

impl ConfigError {
    /// The two rules involved, when this is an ambiguity failure.
    pub fn ambiguity(&self) -> Option<&AmbiguityError> {
        match self {
            ConfigError::Ambiguous(e) => Some(e),
            _ => None,
        }
    }
}
