//! Coordinate codec
//!
//! Converts between a [`Coordinates`] pair and the textual form embedded in
//! an address's `details` string:
//!
//! ```text
//! Lat: 12.34, Lng: 56.78
//! ```
//!
//! The details string is part of the wire contract. Anything that needs
//! structured coordinates re-parses it with [`decode`]; nothing stores
//! latitude and longitude as separate fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Signed decimal, comma, signed decimal. The decimal point is mandatory.
static DETAILS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Lat:\s*(-?[0-9]+\.[0-9]+),\s*Lng:\s*(-?[0-9]+\.[0-9]+)")
        .expect("coordinate pattern is valid")
});

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Extract coordinates from a details string
    pub fn from_details(details: &str) -> Option<Self> {
        decode(details)
    }

    /// Render as a details string
    pub fn to_details(&self) -> String {
        encode(self.latitude, self.longitude)
    }

    /// Whether the pair lies inside the usual WGS84 ranges
    ///
    /// Informational only: stored records are never rejected on this basis.
    pub fn is_on_earth(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Find the first `Lat: <float>, Lng: <float>` pattern in `details`
///
/// Returns `None` when the pattern is absent. That means "coordinates
/// unavailable", not a failure.
pub fn decode(details: &str) -> Option<Coordinates> {
    let captures = DETAILS_PATTERN.captures(details)?;
    let latitude = captures.get(1)?.as_str().parse().ok()?;
    let longitude = captures.get(2)?.as_str().parse().ok()?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// Format a pair as `Lat: <latitude>, Lng: <longitude>`
///
/// Uses the shortest decimal form that reads back to the same `f64`, so
/// `decode(&encode(x, y))` returns exactly `(x, y)` for finite inputs.
pub fn encode(latitude: f64, longitude: f64) -> String {
    format!(
        "Lat: {}, Lng: {}",
        format_degrees(latitude),
        format_degrees(longitude)
    )
}

/// `Display` for `f64` prints integral values without a decimal point,
/// which the pattern would not match.
fn format_degrees(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}
