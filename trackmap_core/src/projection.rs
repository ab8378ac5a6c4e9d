//! Pixel-space projection of car state for the rendering layer.

use crate::car_store::CarState;
use crate::telemetry::CarId;
use serde::Serialize;

/// One car as the rendering layer consumes it: pixel coordinates plus the
/// passthrough telemetry copied out of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarData {
    /// Car identifier
    pub id: CarId,

    /// X position in pixels
    pub x: f64,

    /// Y position in pixels
    pub y: f64,

    /// Heading in degrees
    pub heading: f64,

    /// True when this car is the one the viewer has selected
    pub selected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tire_wear: Option<f64>,

    #[serde(rename = "tireTemp_fl", skip_serializing_if = "Option::is_none")]
    pub tire_temp_fl: Option<f64>,

    #[serde(rename = "tireTemp_fr", skip_serializing_if = "Option::is_none")]
    pub tire_temp_fr: Option<f64>,

    #[serde(rename = "tireTemp_rl", skip_serializing_if = "Option::is_none")]
    pub tire_temp_rl: Option<f64>,

    #[serde(rename = "tireTemp_rr", skip_serializing_if = "Option::is_none")]
    pub tire_temp_rr: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_laps_to_cliff: Option<f64>,
}

/// Projects one car's normalized state into pixel space.
///
/// Pure: scales `x`/`y` by the view dimensions and copies everything else
/// through unchanged.
pub fn project(car: &CarState, width: f64, height: f64, selected: bool) -> CarData {
    CarData {
        id: car.id.clone(),
        x: car.x * width,
        y: car.y * height,
        heading: car.heading,
        selected,
        lap: car.lap,
        speed: car.speed,
        tire_wear: car.tire_wear,
        tire_temp_fl: car.tire_temp_fl,
        tire_temp_fr: car.tire_temp_fr,
        tire_temp_rl: car.tire_temp_rl,
        tire_temp_rr: car.tire_temp_rr,
        predicted_laps_to_cliff: car.predicted_laps_to_cliff,
    }
}
