//! Common error infrastructure for roster-core.
//!
//! Command-specific errors (`PlayerError`, `DefinitionError`,
//! `AssignmentError`) live next to the commands that raise them. This module
//! provides the classification shared by all of them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each command family has its own error type
//! - **Typed Rejections**: Conflicts are values, never panics
//! - **Severity Classification**: Errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: A conflict with current state; the caller may retry differently
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Conflict with the current arrangement.
    ///
    /// Examples: target slot occupied, swap against stale slot contents
    Recoverable,

    /// Invalid input.
    ///
    /// Examples: unknown player, slot index outside the team
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// Examples: player present in two slots after a move.
    /// These indicate bugs and should be investigated.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all roster-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Return a stable `snake_case` code from [`RosterError::error_code`]
pub trait RosterError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used for rejection outcomes surfaced to the UI and for logging.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
