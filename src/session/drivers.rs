//! Entry list and the local driver's car parameters.

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct DriverInfo {
    /// Car index of the local driver.
    pub driver_car_idx: Option<i32>,
    #[serde(rename = "DriverUserID")]
    pub driver_user_id: Option<i32>,
    pub pace_car_idx: Option<i32>,
    pub driver_head_pos_x: Option<f64>,
    pub driver_head_pos_y: Option<f64>,
    pub driver_head_pos_z: Option<f64>,
    pub driver_car_is_electric: Option<i32>,
    #[serde(rename = "DriverCarIdleRPM")]
    pub driver_car_idle_rpm: Option<f64>,
    pub driver_car_red_line: Option<f64>,
    pub driver_car_eng_cylinder_count: Option<i32>,
    pub driver_car_fuel_kg_per_ltr: Option<f64>,
    pub driver_car_fuel_max_ltr: Option<f64>,
    pub driver_car_max_fuel_pct: Option<f64>,
    pub driver_car_gear_num_forward: Option<i32>,
    pub driver_car_gear_neutral: Option<i32>,
    pub driver_car_gear_reverse: Option<i32>,
    #[serde(rename = "DriverCarSLFirstRPM")]
    pub shift_light_first_rpm: Option<f64>,
    #[serde(rename = "DriverCarSLShiftRPM")]
    pub shift_light_shift_rpm: Option<f64>,
    #[serde(rename = "DriverCarSLLastRPM")]
    pub shift_light_last_rpm: Option<f64>,
    #[serde(rename = "DriverCarSLBlinkRPM")]
    pub shift_light_blink_rpm: Option<f64>,
    pub driver_car_version: Option<String>,
    pub driver_pit_trk_pct: Option<f64>,
    pub driver_car_est_lap_time: Option<f64>,
    pub driver_setup_name: Option<String>,
    pub driver_setup_is_modified: Option<i32>,
    pub driver_setup_load_type_name: Option<String>,
    pub driver_setup_passed_tech: Option<i32>,
    pub driver_incident_count: Option<i32>,
    pub drivers: Vec<Driver>,
}

impl DriverInfo {
    pub fn driver(&self, car_idx: i32) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.car_idx == car_idx)
    }

    /// The entry the local driver is in.
    pub fn local_driver(&self) -> Option<&Driver> {
        self.driver(self.driver_car_idx?)
    }

    /// Entries that race; spectators and the pace car are skipped.
    pub fn competitors(&self) -> impl Iterator<Item = &Driver> {
        self.drivers
            .iter()
            .filter(|driver| driver.is_spectator != Some(1) && driver.car_is_pace_car != Some(1))
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    pub car_idx: i32,
    pub user_name: String,
    pub abbrev_name: Option<String>,
    pub initials: Option<String>,
    #[serde(rename = "UserID")]
    pub user_id: Option<i32>,
    #[serde(rename = "TeamID")]
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    /// Display number; may carry leading zeros.
    pub car_number: Option<String>,
    pub car_number_raw: Option<i32>,
    pub car_path: Option<String>,
    #[serde(rename = "CarClassID")]
    pub car_class_id: Option<i32>,
    #[serde(rename = "CarID")]
    pub car_id: Option<i32>,
    pub car_is_pace_car: Option<i32>,
    #[serde(rename = "CarIsAI")]
    pub car_is_ai: Option<i32>,
    pub car_is_electric: Option<i32>,
    pub car_screen_name: Option<String>,
    pub car_screen_name_short: Option<String>,
    pub car_class_short_name: Option<String>,
    pub car_class_rel_speed: Option<i32>,
    pub car_class_license_level: Option<i32>,
    pub car_class_max_fuel_pct: Option<String>,
    pub car_class_weight_penalty: Option<String>,
    pub car_class_power_adjust: Option<String>,
    pub car_class_dry_tire_set_limit: Option<String>,
    pub car_class_color: Option<String>,
    pub car_class_est_lap_time: Option<f64>,
    #[serde(rename = "IRating")]
    pub irating: Option<i32>,
    pub lic_level: Option<i32>,
    pub lic_sub_level: Option<i32>,
    pub lic_string: Option<String>,
    pub lic_color: Option<String>,
    pub is_spectator: Option<i32>,
    pub car_design_str: Option<String>,
    pub helmet_design_str: Option<String>,
    pub suit_design_str: Option<String>,
    pub body_type: Option<i32>,
    pub face_type: Option<i32>,
    pub helmet_type: Option<i32>,
    pub car_number_design_str: Option<String>,
    #[serde(rename = "CarSponsor_1")]
    pub car_sponsor_1: Option<i32>,
    #[serde(rename = "CarSponsor_2")]
    pub car_sponsor_2: Option<i32>,
    pub club_name: Option<String>,
    #[serde(rename = "ClubID")]
    pub club_id: Option<i32>,
    pub division_name: Option<String>,
    #[serde(rename = "DivisionID")]
    pub division_id: Option<i32>,
    pub cur_driver_incident_count: Option<i32>,
    pub team_incident_count: Option<i32>,
}
