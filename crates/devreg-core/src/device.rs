//! Device record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a device, assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// The id that follows this one in store assignment order
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Store-assigned identifier, immutable after creation
    pub id: DeviceId,
    /// Human-readable name
    pub name: String,
    /// Manufacturer brand, matched exactly by brand search
    pub brand: String,
    /// When the device was registered
    pub creation_time: DateTime<Utc>,
}

/// A device as handed to [`crate::DeviceStore::save`]
///
/// `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: Option<DeviceId>,
    pub name: String,
    pub brand: String,
    pub creation_time: DateTime<Utc>,
}

impl DeviceRecord {
    /// Create an unsaved record with no id
    pub fn new(name: String, brand: String, creation_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name,
            brand,
            creation_time,
        }
    }

    /// Attach the id the store assigned
    pub fn with_id(self, id: DeviceId) -> Device {
        Device {
            id,
            name: self.name,
            brand: self.brand,
            creation_time: self.creation_time,
        }
    }
}

impl From<Device> for DeviceRecord {
    fn from(device: Device) -> Self {
        Self {
            id: Some(device.id),
            name: device.name,
            brand: device.brand,
            creation_time: device.creation_time,
        }
    }
}

/// Caller-supplied candidate for create and full update
///
/// Every field is optional on the wire so that a missing `name` or `brand`
/// is reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

impl DeviceDraft {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            brand: Some(brand.into()),
            creation_time: None,
        }
    }

    pub fn created_at(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = Some(creation_time);
        self
    }
}

/// The mutable fields of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceField {
    Name,
    Brand,
    CreationTime,
}

impl DeviceField {
    pub const ALL: [DeviceField; 3] = [Self::Name, Self::Brand, Self::CreationTime];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
            Self::CreationTime => "creationTime",
        }
    }

    /// Look up a field by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for DeviceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
