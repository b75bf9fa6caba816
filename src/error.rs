use thiserror::Error;

/// Distinguishable failure conditions for navigation operations.
///
/// These are all usage errors: the caller's navigation logic is wrong and the
/// stack refuses the operation synchronously rather than corrupting its
/// ordering invariants. Exit vetoes and invalidated pending pushes are not
/// errors; they are reported through [`ExitOutcome`](crate::ExitOutcome) and
/// [`MakeCurrentOutcome`](crate::MakeCurrentOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    /// The screen already holds a parent link and cannot be pushed again
    #[error("screen has already entered a stack")]
    AlreadyEntered,

    /// The screen still has a living attached child; exit must proceed leaf-first
    #[error("screen has a living attached child")]
    HasChild,

    /// The screen is not attached to the stack
    #[error("screen is not attached")]
    NotAttached,

    /// The operation is not valid in the current stack state
    /// (second push onto a pending parent, exiting the root, ...)
    #[error("operation is not valid in the current stack state")]
    InvalidOperation,

    /// A load-state transition was issued twice
    #[error("load state transition already issued")]
    InvalidState,

    /// The screen id does not belong to this stack
    #[error("unknown screen id")]
    UnknownScreen,
}

/// Result alias for navigation operations
pub type NavResult<T> = Result<T, NavError>;
