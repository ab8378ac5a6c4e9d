//! Inbound telemetry wire format.
//!
//! Samples arrive from an external push or replay transport at arbitrary,
//! possibly bursty intervals. This module only defines the wire shape and
//! its validity rules; turning a sample into motion is the store's job.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CAR ID
// ============================================================================

/// Stable identifier for a car, assigned by the telemetry source.
///
/// Typically a chassis number or driver abbreviation ("44", "HAM"). The id
/// is opaque to this crate; it only needs to be stable across samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(String);

impl CarId {
    /// Creates a CarId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id carries no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CarId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TELEMETRY SAMPLE (Input)
// ============================================================================

/// The wire format received from the telemetry transport - one position
/// report for one car.
///
/// Only the id and within-lap distance are mandatory; everything else is
/// passed through to the rendering layer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Car identifier
    pub id: CarId,

    /// Completed lap count (0 when the feed omits it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lap: Option<u32>,

    /// Distance traveled within the current lap
    #[serde(rename = "lapDistanceWithinLap")]
    pub lap_distance: f64,

    /// Heading in degrees, if the feed provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,

    /// Speed (unit defined by the feed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Aggregate tire wear [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tire_wear: Option<f64>,

    /// Per-corner tire temperatures (legacy underscore wire keys)
    #[serde(default, rename = "tireTemp_fl", skip_serializing_if = "Option::is_none")]
    pub tire_temp_fl: Option<f64>,

    #[serde(default, rename = "tireTemp_fr", skip_serializing_if = "Option::is_none")]
    pub tire_temp_fr: Option<f64>,

    #[serde(default, rename = "tireTemp_rl", skip_serializing_if = "Option::is_none")]
    pub tire_temp_rl: Option<f64>,

    #[serde(default, rename = "tireTemp_rr", skip_serializing_if = "Option::is_none")]
    pub tire_temp_rr: Option<f64>,

    /// Predicted laps until tire performance cliff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_laps_to_cliff: Option<f64>,
}

impl TelemetrySample {
    /// Creates a minimal sample with only the mandatory fields.
    pub fn new(id: impl Into<CarId>, lap: Option<u32>, lap_distance: f64) -> Self {
        Self {
            id: id.into(),
            lap,
            lap_distance,
            heading: None,
            speed: None,
            tire_wear: None,
            tire_temp_fl: None,
            tire_temp_fr: None,
            tire_temp_rl: None,
            tire_temp_rr: None,
            predicted_laps_to_cliff: None,
        }
    }

    /// Checks the sample's validity rules.
    ///
    /// A sample with an empty id or a non-finite distance can't be placed
    /// on the track and must be rejected before it reaches the store.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.id.is_empty() {
            return Err(TelemetryError::MissingId);
        }
        if !self.lap_distance.is_finite() {
            return Err(TelemetryError::InvalidDistance(self.lap_distance));
        }
        Ok(())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons a telemetry sample is rejected by the ingest path.
///
/// Rejections are safe no-ops on the store: one malformed sample must never
/// halt animation for the other cars.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelemetryError {
    #[error("sample is missing a car id")]
    MissingId,

    #[error("sample distance is not finite: {0}")]
    InvalidDistance(f64),

    #[error("no track centerline is loaded")]
    TrackNotLoaded,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_wire_names() {
        let json = r#"{
            "id": "44",
            "lap": 12,
            "lapDistanceWithinLap": 1534.2,
            "heading": 87.5,
            "speed": 301.0,
            "tireWear": 0.42,
            "tireTemp_fl": 98.1,
            "tireTemp_rr": 101.4,
            "predictedLapsToCliff": 6.5
        }"#;

        let sample: TelemetrySample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.id.as_str(), "44");
        assert_eq!(sample.lap, Some(12));
        assert_eq!(sample.lap_distance, 1534.2);
        assert_eq!(sample.tire_temp_fl, Some(98.1));
        assert_eq!(sample.tire_temp_fr, None);
        assert_eq!(sample.predicted_laps_to_cliff, Some(6.5));
    }

    #[test]
    fn test_sample_optional_fields_default() {
        let json = r#"{ "id": "GAS", "lapDistanceWithinLap": 10.0 }"#;

        let sample: TelemetrySample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.lap, None);
        assert_eq!(sample.heading, None);
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let sample = TelemetrySample::new("", Some(1), 50.0);
        assert_eq!(sample.validate(), Err(TelemetryError::MissingId));
    }

    #[test]
    fn test_validate_rejects_non_finite_distance() {
        let sample = TelemetrySample::new("44", Some(1), f64::NAN);
        assert!(matches!(
            sample.validate(),
            Err(TelemetryError::InvalidDistance(_))
        ));

        let sample = TelemetrySample::new("44", Some(1), f64::INFINITY);
        assert!(sample.validate().is_err());
    }

    #[test]
    fn test_car_id_display() {
        let id = CarId::from("HAM");
        assert_eq!(id.to_string(), "HAM");
        assert!(!id.is_empty());
    }
}
