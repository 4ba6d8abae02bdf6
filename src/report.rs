//! Validation outcome types

use serde::{Deserialize, Serialize};

/// A single data-level validation error
///
/// Appended during recursive descent and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Dot-joined path to the offending value (empty for root-level errors)
    pub property: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Schema keyword that produced the error
    pub keyword: String,
}

impl ErrorRecord {
    pub fn new(
        property: impl Into<String>,
        message: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            keyword: keyword.into(),
        }
    }
}

/// The outcome of a validate call
///
/// `valid` is true iff `errors` is empty. Error order is deterministic:
/// depth-first over the data, keywords in table order at each node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ErrorRecord>,
}

impl ValidationResult {
    /// Build a result from the accumulated error list
    pub fn from_errors(errors: Vec<ErrorRecord>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_is_valid() {
        let result = ValidationResult::from_errors(Vec::new());
        assert!(result.valid);
        assert!(result.is_valid());
    }

    #[test]
    fn test_errors_mean_invalid() {
        let result = ValidationResult::from_errors(vec![ErrorRecord::new(
            "payment.amount",
            "expected integer, got number",
            "type",
        )]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property, "payment.amount");
    }

    #[test]
    fn test_serializes_to_json() {
        let result = ValidationResult::from_errors(vec![ErrorRecord::new(
            "usage",
            "string too long",
            "maxLength",
        )]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["keyword"], "maxLength");
    }
}
