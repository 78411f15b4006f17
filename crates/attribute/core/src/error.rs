//! Error infrastructure for attribute-core.
//!
//! All fallible engine operations return [`AttributeError`]. Benign races
//! (double dispose, removing an element that is not attached, removing from
//! an already emptied override table) are not errors and never reach this type.

use std::sync::Arc;

use crate::definition::AttributeDefinition;

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid input for this holder, should not be retried without changes.
    ///
    /// Examples: forcing a value on a read-only lightweight attribute
    Validation,

    /// Programming error: an operation was used on a holder that cannot support it.
    Internal,

    /// Content/configuration defect that must be fixed at authoring time.
    ///
    /// Examples: power-up without target attribute, cyclic class rules
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

/// Errors raised by attribute systems, power-up resolution and holders.
#[derive(Clone, Debug, thiserror::Error)]
pub enum AttributeError {
    /// A required configuration reference was never set.
    #[error("{what} is not initialized ({context})")]
    NotInitialized {
        what: &'static str,
        context: String,
    },

    /// The holder intentionally does not implement this operation.
    #[error("{operation} is not supported by {holder} attribute holders")]
    Unsupported {
        operation: &'static str,
        holder: &'static str,
    },

    /// The attribute cannot be forced to a value on this holder.
    #[error("attribute {} cannot be set on this holder", attribute.designation())]
    ReadOnly { attribute: Arc<AttributeDefinition> },

    /// Declared relationships reference each other in a loop.
    #[error("relationship rules form a cycle through attribute {}", attribute.designation())]
    CyclicRelationship { attribute: Arc<AttributeDefinition> },
}

impl AttributeError {
    pub(crate) fn not_initialized(what: &'static str, context: impl Into<String>) -> Self {
        Self::NotInitialized {
            what,
            context: context.into(),
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotInitialized { .. } | Self::CyclicRelationship { .. } => ErrorSeverity::Fatal,
            Self::Unsupported { .. } => ErrorSeverity::Internal,
            Self::ReadOnly { .. } => ErrorSeverity::Validation,
        }
    }

    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotInitialized { .. } => "ATTRIBUTE_NOT_INITIALIZED",
            Self::Unsupported { .. } => "ATTRIBUTE_UNSUPPORTED",
            Self::ReadOnly { .. } => "ATTRIBUTE_READ_ONLY",
            Self::CyclicRelationship { .. } => "ATTRIBUTE_CYCLIC_RELATIONSHIP",
        }
    }
}

pub type Result<T> = std::result::Result<T, AttributeError>;
