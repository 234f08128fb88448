//! Data models for Waypost
//!
//! An [`AddressRecord`] is a labeled free-text address. Its `details` may
//! embed coordinates in the `Lat: x, Lng: y` form understood by
//! [`codec`](crate::codec). Records are immutable: replacing a location
//! means deleting and re-creating it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{self, Coordinates};
use crate::error::{Field, ValidationError};

/// Identifier assigned by the store at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(u64);

impl AddressId {
    /// Largest id any backend can hold (SQLite integers are signed 64-bit)
    pub const MAX: AddressId = AddressId(i64::MAX as u64);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AddressId {
    type Err = ValidationError;

    /// Accepts plain decimal digits naming an integer in `1..=AddressId::MAX`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidId(raw.to_string());

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        match raw.parse::<u64>() {
            Ok(value) if (1..=Self::MAX.0).contains(&value) => Ok(Self(value)),
            _ => Err(invalid()),
        }
    }
}

/// A saved address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    id: AddressId,
    label: String,
    details: String,
}

impl AddressRecord {
    /// Only the store and storage backends build records
    pub(crate) fn new(id: AddressId, label: String, details: String) -> Self {
        Self { id, label, details }
    }

    pub fn id(&self) -> AddressId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Coordinates embedded in the details string, if any
    pub fn coordinates(&self) -> Option<Coordinates> {
        codec::decode(&self.details)
    }

    /// Map marker for this record, if its details carry coordinates
    pub fn marker(&self) -> Option<Marker> {
        self.coordinates().map(|coords| Marker {
            id: self.id,
            label: self.label.clone(),
            latitude: coords.latitude,
            longitude: coords.longitude,
        })
    }
}

/// Input for [`AddressStore::create`](crate::store::AddressStore::create)
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub label: String,
    pub details: String,
}

impl NewAddress {
    pub fn new(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            details: details.into(),
        }
    }

    /// An address whose details are the encoded coordinates
    pub fn at(label: impl Into<String>, coordinates: Coordinates) -> Self {
        Self::new(label, coordinates.to_details())
    }

    /// Check that both fields have non-whitespace content
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.label.trim().is_empty() {
            missing.push(Field::Label);
        }
        if self.details.trim().is_empty() {
            missing.push(Field::Details);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }
}

/// A record reduced to what a map needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: AddressId,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}
