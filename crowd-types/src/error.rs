//! Error types for the mechanical layer.

use thiserror::Error;

/// Errors surfaced by the mechanical layer.
///
/// Every failure falls into one of three categories: a malformed input
/// record, a reference to an id nothing declares, or a non-finite quantity
/// derived from otherwise well-formed inputs. A rejected call never leaves
/// the agent table partially updated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrowdError {
    /// Malformed or missing required field in an input record.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Description of the configuration problem.
        reason: String,
    },

    /// An input record references an id that was never declared.
    #[error("unknown {kind} id: {id}")]
    Reference {
        /// The kind of entity the id was supposed to name.
        kind: &'static str,
        /// The offending id, as given by the caller.
        id: String,
    },

    /// A non-finite or unphysical value was derived from the inputs.
    #[error("non-finite value for {quantity}")]
    Numeric {
        /// The quantity that failed to evaluate.
        quantity: String,
    },
}

impl CrowdError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a reference error for an unknown id.
    #[must_use]
    pub fn reference(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Reference {
            kind,
            id: id.into(),
        }
    }

    /// Create a numeric error.
    #[must_use]
    pub fn numeric(quantity: impl Into<String>) -> Self {
        Self::Numeric {
            quantity: quantity.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Check if this is a reference error.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    /// Check if this is a numeric error.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }
}
