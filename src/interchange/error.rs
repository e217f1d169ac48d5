//! Error types for diagram interchange.

use thiserror::Error;

/// Errors raised while reading or writing diagram markup
#[derive(Debug, Error)]
pub enum DiagramError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The diagram body is deflate-compressed instead of plain mxGraph XML.
    #[error("compressed diagrams are not supported; export uncompressed XML")]
    Compressed,

    /// Missing required element or attribute.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid element or attribute content.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },
}

impl DiagramError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "element",
            name: name.into(),
        }
    }

    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "attribute",
            name: name.into(),
        }
    }

    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "attribute",
            message: message.into(),
        }
    }
}
