//! # Error Handling
//!
//! Error types for the meshplane filter-chain core, built with `thiserror`.
//!
//! Filter-chain rendering is total for almost every input. The variants here
//! cover configuration loading and the few builder contracts a caller can
//! violate (an outbound listener without any usable destination).

/// Custom result type for meshplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for meshplane
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input violates a builder contract
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        context: String,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a serialization error with context
    pub fn serialization<E, S>(source: E, context: S) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        S: Into<String>,
    {
        Self::Serialization { source: Box::new(source), context: context.into() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err, "YAML")
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err, "JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_field_carries_field_name() {
        let err = Error::validation_field("no positive weights", "routes");
        match err {
            Error::Validation { ref field, .. } => assert_eq!(field.as_deref(), Some("routes")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Validation error: no positive weights");
    }

    #[test]
    fn yaml_errors_convert() {
        let parse: std::result::Result<Vec<u32>, _> = serde_yaml::from_str("{not: a list");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization { ref context, .. } if context == "YAML"));
    }
}
