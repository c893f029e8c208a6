//! Typed errors for the two simulation file formats.

use thiserror::Error;

/// Failure to read a value out of a primary or companion file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("file has no records")]
    Empty,

    #[error("last record has no column {column}")]
    MissingColumn { column: usize },

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid number '{token}': {source}")]
    InvalidNumber {
        token: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("state code {0} is not a finite number")]
    NonFiniteState(f64),
}

/// Parse one whitespace-separated token as a float.
pub fn parse_number(token: &str) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .map_err(|source| ParseError::InvalidNumber {
            token: token.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5").unwrap(), 12.5);
        assert_eq!(parse_number("-3").unwrap(), -3.0);
        assert_eq!(parse_number("1e-3").unwrap(), 0.001);
    }

    #[test]
    fn test_parse_number_error_names_token() {
        let err = parse_number("abc").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn test_field_count_message() {
        let err = ParseError::FieldCount {
            expected: 4,
            found: 3,
        };
        assert_eq!(err.to_string(), "expected 4 fields, found 3");
    }
}
