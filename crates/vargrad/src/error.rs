//! Error types for vargrad.

use thiserror::Error;

/// Errors from the dense tensor collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },
}

/// Coarse classification of autograd failures, for hosts that surface
/// diagnostics by category rather than by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller passed something malformed (absent data, wrong arity).
    InvalidArgument,
    /// A structural invariant of the graph no longer holds.
    InvariantViolation,
    /// A saved value was invalidated by an in-place mutation.
    InplaceModification,
}

/// Errors raised by the gradient-accumulation and save/unpack protocols.
///
/// Every failure aborts the current forward or backward step; none is
/// retried or downgraded internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutogradError {
    /// Variable construction was given no tensor data.
    #[error("variable data must not be absent")]
    MissingData,

    /// Leaf accumulator was handed the wrong number of gradients.
    #[error("incorrect number of gradients: expected 1, got {actual}")]
    GradientArity { actual: usize },

    /// Leaf accumulator invoked on a non-leaf or a mutated leaf.
    #[error("leaf variable was used in an inplace operation")]
    LeafUsedInplace,

    /// A saved snapshot's source was mutated after capture.
    #[error(
        "one of the variables needed for gradient computation \
         has been modified by an inplace operation"
    )]
    InplaceModified,

    /// Tensor-level failure during accumulation.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl AutogradError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingData | Self::GradientArity { .. } | Self::Tensor(_) => {
                ErrorKind::InvalidArgument
            }
            Self::LeafUsedInplace => ErrorKind::InvariantViolation,
            Self::InplaceModified => ErrorKind::InplaceModification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(AutogradError::MissingData.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            AutogradError::GradientArity { actual: 0 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            AutogradError::LeafUsedInplace.kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            AutogradError::InplaceModified.kind(),
            ErrorKind::InplaceModification
        );
        assert_eq!(
            AutogradError::Tensor(TensorError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
            .kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_display_names_the_failure() {
        let msg = AutogradError::InplaceModified.to_string();
        assert!(msg.contains("inplace operation"));
    }
}
