//! Diagnostic collection for configuration checks
//!
//! Collects errors and warnings instead of stopping at the first problem,
//! so a whole file can be reported at once.
//!
//! # Example
//!
//! ```rust
//! use expense_tracker_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("general.descriptor", "android/app/build.gradle.kts")
//!     .range("platform.min_sdk_version", 21, 1, 100)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create a finding without expected/actual values
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attach the expected value
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the actual value
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::ConfigValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(
                ValidationError::new(field, "REQUIRED", "Field is required")
                    .with_expected("non-empty value")
                    .with_actual("empty"),
            );
        }
        self
    }

    /// Validate against a regex pattern
    pub fn pattern(mut self, field: &str, value: &str, pattern: &str, description: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    self.result.add_error(
                        ValidationError::new(field, "PATTERN", format!("Must match {}", description))
                            .with_expected(description)
                            .with_actual(value),
                    );
                }
            }
            Err(_) => {
                self.result.add_error(ValidationError::new(
                    field,
                    "INTERNAL",
                    "Invalid validation pattern",
                ));
            }
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.result.add_error(
                ValidationError::new(
                    field,
                    "ONE_OF",
                    format!("Must be one of: {}", allowed.join(", ")),
                )
                .with_expected(allowed.join(", "))
                .with_actual(value),
            );
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(
                ValidationError::new(field, "RANGE", format!("Must be between {} and {}", min, max))
                    .with_expected(format!("{} - {}", min, max))
                    .with_actual(value.to_string()),
            );
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result
                .add_error(ValidationError::new(field, "CUSTOM", message));
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result
                .add_warning(ValidationError::new(field, "WARNING", message));
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("general.descriptor", "  ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_pattern_validation() {
        let result = Validator::new()
            .pattern("name", "Upload Key", r"^[A-Za-z][A-Za-z0-9_]*$", "an identifier")
            .validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "PATTERN");
        assert_eq!(result.errors()[0].actual.as_deref(), Some("Upload Key"));
    }

    #[test]
    fn test_invalid_pattern_is_internal_error() {
        let result = Validator::new().pattern("name", "x", "(", "broken").validate();
        assert_eq!(result.errors()[0].code, "INTERNAL");
    }

    #[test]
    fn test_one_of_validation() {
        let result = Validator::new()
            .one_of("logging.level", "loud", &["error", "warn", "info"])
            .validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "ONE_OF");
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("platform.min_sdk_version", 150, 1, 100).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_warn_if_does_not_fail() {
        let result = Validator::new()
            .warn_if("release.allow_debug_signing", true, "debug signing allowed")
            .validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_to_result_joins_messages() {
        let err = Validator::new()
            .required("a", "")
            .custom("b", || Some("broken".to_string()))
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("a: Field is required"));
        assert!(err.message.contains("b: broken"));
    }

    #[test]
    fn test_merge() {
        let mut first = Validator::new().required("a", "").validate();
        let second = Validator::new().warn_if("b", true, "careful").validate();
        first.merge(second);
        assert_eq!(first.errors().len(), 1);
        assert_eq!(first.warnings().len(), 1);
    }
}
