use thiserror::Error;

/// Errors raised by read-side queries on a [`crate::BooleanIndex`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("The specified document does not exist")]
    UnknownDocument,

    #[error("The specified term does not exist")]
    UnknownTerm,
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(IndexError::UnknownDocument.to_string(), "The specified document does not exist");
        assert_eq!(IndexError::UnknownTerm.to_string(), "The specified term does not exist");
    }
}
