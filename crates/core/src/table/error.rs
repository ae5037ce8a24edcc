use thiserror::Error;

/// Errors raised while reading tabular input.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: invalid value '{value}' in column '{column}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Table has no rows")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cell_display() {
        let error = TableError::InvalidCell {
            row: 3,
            column: "Date".to_string(),
            value: "soon".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Row 3: invalid value 'soon' in column 'Date'"
        );
    }

    #[test]
    fn test_missing_column_display() {
        assert_eq!(
            TableError::MissingColumn("Topic".to_string()).to_string(),
            "Missing column: Topic"
        );
    }
}
