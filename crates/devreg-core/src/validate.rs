//! Structural validation of device candidates and patches
//!
//! All functions here are pure: the caller supplies "now" so that future
//! timestamps can be detected without touching a clock.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::device::{Device, DeviceDraft, DeviceField};
use crate::error::{FieldViolation, RegistryError, ValidationErrors, ViolationKind};

/// A draft that passed [`validate_draft`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub name: String,
    pub brand: String,
    /// `None` when the caller left the time for the registry to fill in
    pub creation_time: Option<DateTime<Utc>>,
}

/// Check a create/full-update candidate, collecting every violation
pub fn validate_draft(
    draft: DeviceDraft,
    now: DateTime<Utc>,
) -> Result<ValidDraft, ValidationErrors> {
    let mut violations = Vec::new();

    let name = required_string(DeviceField::Name, draft.name, &mut violations);
    let brand = required_string(DeviceField::Brand, draft.brand, &mut violations);
    if let Some(time) = draft.creation_time {
        if let Some(v) = check_time(time, now) {
            violations.push(v);
        }
    }

    match ValidationErrors::from_violations(violations) {
        Some(errors) => Err(errors),
        None => Ok(ValidDraft {
            name: name.unwrap_or_default(),
            brand: brand.unwrap_or_default(),
            creation_time: draft.creation_time,
        }),
    }
}

fn required_string(
    field: DeviceField,
    value: Option<String>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        None => {
            violations.push(FieldViolation::new(field, ViolationKind::Missing));
            None
        }
        Some(s) if s.is_empty() => {
            violations.push(FieldViolation::new(field, ViolationKind::Empty));
            None
        }
        Some(s) => Some(s),
    }
}

fn check_time(time: DateTime<Utc>, now: DateTime<Utc>) -> Option<FieldViolation> {
    (time > now).then(|| FieldViolation::new(DeviceField::CreationTime, ViolationKind::InFuture))
}

/// One typed assignment from a partial update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchField {
    Name(String),
    Brand(String),
    CreationTime(DateTime<Utc>),
}

impl PatchField {
    pub fn field(&self) -> DeviceField {
        match self {
            Self::Name(_) => DeviceField::Name,
            Self::Brand(_) => DeviceField::Brand,
            Self::CreationTime(_) => DeviceField::CreationTime,
        }
    }

    fn apply(self, device: &mut Device) {
        match self {
            Self::Name(name) => device.name = name,
            Self::Brand(brand) => device.brand = brand,
            Self::CreationTime(time) => device.creation_time = time,
        }
    }
}

/// A fully parsed partial update
///
/// Built only by [`parse_patch`], so holding one means every entry named a
/// known field with a value of the right type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePatch {
    fields: Vec<PatchField>,
}

impl DevicePatch {
    pub fn fields(&self) -> &[PatchField] {
        &self.fields
    }

    /// Apply every entry; unsupplied fields keep their value
    pub fn apply_to(self, device: &mut Device) {
        for field in self.fields {
            field.apply(device);
        }
    }
}

/// Turn a raw field map into a typed patch
///
/// Entries are checked in map order and the first problem wins: an unknown
/// key yields [`RegistryError::IllegalArgument`], a value of the wrong type
/// yields [`RegistryError::Validation`].
pub fn parse_patch(map: Map<String, Value>) -> Result<DevicePatch, RegistryError> {
    let mut fields = Vec::with_capacity(map.len());

    for (key, value) in map {
        let field = DeviceField::from_name(&key).ok_or(RegistryError::IllegalArgument(key))?;
        let parsed = match field {
            DeviceField::Name => PatchField::Name(string_value(field, value)?),
            DeviceField::Brand => PatchField::Brand(string_value(field, value)?),
            DeviceField::CreationTime => PatchField::CreationTime(time_value(value)?),
        };
        fields.push(parsed);
    }

    Ok(DevicePatch { fields })
}

fn string_value(field: DeviceField, value: Value) -> Result<String, ValidationErrors> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ValidationErrors::single(
            field,
            ViolationKind::WrongType("a string".to_string()),
        )),
    }
}

fn time_value(value: Value) -> Result<DateTime<Utc>, ValidationErrors> {
    let wrong_type = || {
        ValidationErrors::single(
            DeviceField::CreationTime,
            ViolationKind::WrongType("an RFC 3339 timestamp".to_string()),
        )
    };
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| wrong_type()),
        _ => Err(wrong_type()),
    }
}

/// Apply the draft rules to the fields a patch actually supplies
pub fn validate_patch(patch: &DevicePatch, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
    let violations = patch
        .fields()
        .iter()
        .filter_map(|f| match f {
            PatchField::Name(s) | PatchField::Brand(s) if s.is_empty() => {
                Some(FieldViolation::new(f.field(), ViolationKind::Empty))
            }
            PatchField::CreationTime(t) => check_time(*t, now),
            _ => None,
        })
        .collect();

    match ValidationErrors::from_violations(violations) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}
