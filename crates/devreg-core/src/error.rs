//! Error types shared by the registry and its stores

use thiserror::Error;

use crate::device::{DeviceField, DeviceId};

/// Failure reported by a [`crate::DeviceStore`] implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Store backend error: {0}")]
    Backend(String),
    /// An update named an id the store no longer holds
    #[error("Device {0} no longer exists")]
    Vanished(DeviceId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required field absent or null
    Missing,
    /// Required string is empty
    Empty,
    /// Timestamp lies after the current time
    InFuture,
    /// Supplied value has the wrong type for the field
    WrongType(String),
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("is mandatory"),
            Self::Empty => f.write_str("must not be empty"),
            Self::InFuture => f.write_str("must not be in the future"),
            Self::WrongType(expected) => write!(f, "must be {expected}"),
        }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: DeviceField,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn new(field: DeviceField, kind: ViolationKind) -> Self {
        Self { field, kind }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}

/// Non-empty set of violations found in one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn single(field: DeviceField, kind: ViolationKind) -> Self {
        Self(vec![FieldViolation::new(field, kind)])
    }

    /// Returns `None` when there is nothing to report
    pub fn from_violations(violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self(violations))
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn contains(&self, field: DeviceField, kind: &ViolationKind) -> bool {
        self.0.iter().any(|v| v.field == field && &v.kind == kind)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Outcome of a failed registry operation
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Device not found with id: {0}")]
    NotFound(DeviceId),

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid field: {0}")]
    IllegalArgument(String),

    #[error("{operation}")]
    Service {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl RegistryError {
    pub fn service(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Service { operation, source }
    }
}

impl From<ValidationErrors> for RegistryError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_message_lists_every_field() {
        let errors = ValidationErrors::from_violations(vec![
            FieldViolation::new(DeviceField::Name, ViolationKind::Empty),
            FieldViolation::new(DeviceField::Brand, ViolationKind::Missing),
        ])
        .unwrap();
        assert_eq!(
            RegistryError::Validation(errors).to_string(),
            "Validation error: name must not be empty; brand is mandatory"
        );
    }

    #[test]
    fn test_empty_violations_are_not_an_error() {
        assert!(ValidationErrors::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn test_service_error_keeps_source() {
        let err = RegistryError::service("Error adding device")(StoreError::Backend(
            "disk full".to_string(),
        ));
        assert_eq!(err.to_string(), "Error adding device");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("Store backend error: disk full")
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            RegistryError::NotFound(DeviceId(3)).to_string(),
            "Device not found with id: 3"
        );
    }
}
