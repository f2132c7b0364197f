//! Finishing orders and fastest laps.
//!
//! Positions and car indices are required and strictly numeric; a results
//! block with a malformed value fails the whole parse rather than silently
//! dropping a car.

use serde::{Deserialize, Serialize};

/// One row of a session's running or final order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
pub struct ResultsPosition {
    pub position: i32,
    pub class_position: i32,
    pub car_idx: i32,
    #[serde(default)]
    pub lap: Option<i32>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub fastest_lap: Option<i32>,
    #[serde(default)]
    pub fastest_time: Option<f64>,
    #[serde(default)]
    pub last_time: Option<f64>,
    #[serde(default)]
    pub laps_led: Option<i32>,
    #[serde(default)]
    pub laps_complete: Option<i32>,
    #[serde(default)]
    pub joker_laps_complete: Option<i32>,
    #[serde(default)]
    pub laps_driven: Option<f64>,
    #[serde(default)]
    pub incidents: Option<i32>,
    #[serde(default)]
    pub reason_out_id: Option<i32>,
    #[serde(default)]
    pub reason_out_str: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
pub struct ResultsFastestLap {
    pub car_idx: i32,
    pub fastest_lap: i32,
    pub fastest_time: f64,
}

/// Qualifying result carried into a race session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
pub struct SessionResult {
    pub position: i32,
    pub class_position: i32,
    pub car_idx: i32,
    #[serde(default)]
    pub fastest_lap: Option<i32>,
    #[serde(default)]
    pub fastest_time: Option<f64>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct QualifyResultsInfo {
    pub results: Vec<SessionResult>,
}

impl QualifyResultsInfo {
    /// Qualifying result for a car, if it set one.
    pub fn for_car(&self, car_idx: i32) -> Option<&SessionResult> {
        self.results.iter().find(|result| result.car_idx == car_idx)
    }
}
