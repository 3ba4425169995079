use thiserror::Error;

/// Core error type shared across schemashift crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Two enumerations share a canonical name but declare different values.
    #[error("enum {name} redefined as [{incoming}], first declared as [{existing}]")]
    EnumConflict {
        name: String,
        existing: String,
        incoming: String,
    },
    /// The assembled model set violates internal invariants.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Convenience alias for results returned by schemashift crates.
pub type Result<T> = std::result::Result<T, Error>;
