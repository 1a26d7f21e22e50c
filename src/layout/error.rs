//! Error types for the layout engine

use thiserror::Error;

use super::storage::StorageMode;
use crate::parser::ast::Span;

/// Errors that can occur while declaring or installing constraints
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Two related views live in disconnected trees. This is a programming
    /// error in the declaration and must be treated as unrecoverable.
    #[error("no common ancestor between {first} and {second}")]
    NoCommonAncestor { first: String, second: String },

    /// Reference to a view name that the scene does not define
    #[error("undefined view '{name}'")]
    UndefinedIdentifier {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    /// `superview` segment on a view without one
    #[error("'{path}' has no superview")]
    NoSuperview { path: String, span: Span },

    /// Statement whose sides cannot be related
    #[error("invalid statement: {reason}")]
    InvalidStatement { reason: String, span: Span },

    /// Storage mode the host cannot honour
    #[error("storage mode '{}' does not match the host, which supports '{}'", .requested.name(), .supported.name())]
    UnsupportedMode {
        requested: StorageMode,
        supported: StorageMode,
    },

    /// Declaration naming a view the session has no proxy for
    #[error("view '{0}' is not part of this layout session")]
    UnboundView(String),
}

impl LayoutError {
    /// Create a structural error naming the two unrelated views
    pub fn no_common_ancestor(first: impl std::fmt::Debug, second: impl std::fmt::Debug) -> Self {
        Self::NoCommonAncestor {
            first: format!("{:?}", first),
            second: format!("{:?}", second),
        }
    }

    /// Create an undefined identifier error with suggestions
    pub fn undefined(name: impl Into<String>, span: Span, suggestions: Vec<String>) -> Self {
        Self::UndefinedIdentifier {
            name: name.into(),
            span,
            suggestions,
        }
    }

    pub fn no_superview(path: impl Into<String>, span: Span) -> Self {
        Self::NoSuperview {
            path: path.into(),
            span,
        }
    }

    pub fn invalid(reason: impl Into<String>, span: Span) -> Self {
        Self::InvalidStatement {
            reason: reason.into(),
            span,
        }
    }

    pub fn unsupported_mode(requested: StorageMode, supported: StorageMode) -> Self {
        Self::UnsupportedMode {
            requested,
            supported,
        }
    }

    /// True for errors that signal a broken view tree rather than a bad statement
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::NoCommonAncestor { .. })
    }

    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::UndefinedIdentifier { span, .. } => Some(span),
            Self::NoSuperview { span, .. } => Some(span),
            Self::InvalidStatement { span, .. } => Some(span),
            Self::NoCommonAncestor { .. }
            | Self::UnsupportedMode { .. }
            | Self::UnboundView(_) => None,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UndefinedIdentifier { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}
