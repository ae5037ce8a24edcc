use thiserror::Error;

/// Raised when an override payload names more than one target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverrideShapeError {
    #[error("Override {0} names more than one target")]
    MultipleTargets(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_shape_error_display() {
        assert_eq!(
            OverrideShapeError::MultipleTargets(12).to_string(),
            "Override 12 names more than one target"
        );
    }
}
