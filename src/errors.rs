use thiserror::Error;

/// A result type for design generation
pub type Result<T> = std::result::Result<T, LhsError>;

/// An error raised while building a field, an orthogonal array or a design
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LhsError {
    /// When a request parameter is non positive, inconsistent or not finite
    #[error("Invalid Argument: {0}")]
    InvalidParameter(String),
    /// When the requested Galois field order is not handled
    #[error("GF({q}) is not supported: {reason}")]
    UnsupportedField {
        /// Requested field order
        q: u32,
        /// Why the field cannot be built
        reason: String,
    },
    /// When no orthogonal array exists for the requested parameters
    #[error("Orthogonal array construction error: {0}")]
    Construction(String),
    /// When two operands have incompatible shapes
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },
    /// When a matrix element is accessed outside its bounds
    #[error("Index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    OutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Number of rows of the matrix
        rows: usize,
        /// Number of columns of the matrix
        cols: usize,
    },
    /// When a generated design does not satisfy the latin hypercube property
    #[error("Invalid hypercube: {0}")]
    InvalidDesign(String),
    /// When an ndarray cannot hold the matrix shape
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}

impl LhsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LhsError::InvalidParameter(message.into())
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        LhsError::Construction(message.into())
    }

    pub(crate) fn unsupported_field(q: u32, reason: impl Into<String>) -> Self {
        LhsError::UnsupportedField {
            q,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LhsError::invalid("n and k must be integers > 0, n=0 k=2");
        assert_eq!(
            err.to_string(),
            "Invalid Argument: n and k must be integers > 0, n=0 k=2"
        );

        let err = LhsError::OutOfRange {
            row: 3,
            col: 0,
            rows: 2,
            cols: 2,
        };
        assert!(err.to_string().contains("(3, 0)"));
        assert!(err.to_string().contains("2x2"));

        let err = LhsError::unsupported_field(6, "not a prime power");
        assert!(err.to_string().contains("GF(6)"));
    }
}
