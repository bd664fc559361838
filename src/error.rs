use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    /// A traversal path (include model, order chain, or route) that does not
    /// resolve and has no literal fallback.
    UnknownPath(String),
    /// A create/update payload that fails the entity's field constraints.
    Validation(String),
    /// A request missing a required component (no docsToAdd, empty change
    /// set, include nesting too deep, malformed options).
    BadRequest(String),
    /// Schema graph or route table invalid at startup. Fatal.
    Configuration(String),
    /// Any failure surfaced by the persistence adapter.
    Persistence(String),
}

impl Error {
    /// Stable kind string for the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownPath(_) => "UnknownPath",
            Error::Validation(_) => "ValidationError",
            Error::BadRequest(_) => "BadRequest",
            Error::Configuration(_) => "ConfigurationError",
            Error::Persistence(_) => "PersistenceError",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownPath(path) => write!(f, "Unknown path: {}", path),
            Error::Validation(err) => write!(f, "Validation error: {}", err),
            Error::BadRequest(err) => write!(f, "Bad request: {}", err),
            Error::Configuration(err) => write!(f, "Configuration error: {}", err),
            Error::Persistence(err) => write!(f, "Persistence error: {}", err),
        }
    }
}

impl std::error::Error for Error {}
