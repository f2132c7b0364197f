//! The local car's garage setup.
//!
//! Almost every value here is for display and is kept exactly as the writer
//! rendered it, units included (`2421 N`, `-1/16"`, `152 kPa`). Plain numbers
//! stay text too, so `0.50` is not normalised to `0.5`.

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CarSetup {
    /// Bumped by the writer each time the setup is changed in the garage.
    pub update_count: i32,
    pub tires_aero: Option<TiresAero>,
    pub chassis: Option<Chassis>,
    pub brakes_drive_unit: Option<BrakesDriveUnit>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TiresAero {
    pub left_front_tire: Option<Tire>,
    pub left_rear_tire: Option<Tire>,
    pub right_front_tire: Option<Tire>,
    pub right_rear_tire: Option<Tire>,
    pub aero_settings: Option<AeroSettings>,
}

impl TiresAero {
    /// Tires in LF, RF, LR, RR order.
    pub fn tires(&self) -> [Option<&Tire>; 4] {
        [
            self.left_front_tire.as_ref(),
            self.right_front_tire.as_ref(),
            self.left_rear_tire.as_ref(),
            self.right_rear_tire.as_ref(),
        ]
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Tire {
    pub starting_pressure: Option<String>,
    pub last_hot_pressure: Option<String>,
    /// Outer, middle, inner carcass temperatures.
    #[serde(rename = "LastTempsOMI")]
    pub last_temps_omi: Option<String>,
    #[serde(rename = "LastTempsIMO")]
    pub last_temps_imo: Option<String>,
    pub tread_remaining: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AeroSettings {
    pub rear_wing_setting: Option<String>,
    #[serde(rename = "OfDivePlanes")]
    pub dive_planes: Option<String>,
    pub wing_gurney_setting: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Chassis {
    pub front: Option<Front>,
    pub left_front: Option<ChassisCorner>,
    pub left_rear: Option<ChassisCorner>,
    pub right_front: Option<ChassisCorner>,
    pub right_rear: Option<ChassisCorner>,
    pub rear: Option<Rear>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Front {
    pub arb_size: Option<String>,
    pub toe_in: Option<String>,
    pub steering_ratio: Option<String>,
    pub display_page: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Rear {
    pub arb_size: Option<String>,
    pub cross_weight: Option<String>,
}

/// Suspension settings for one corner of the car.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct ChassisCorner {
    pub corner_weight: Option<String>,
    pub ride_height: Option<String>,
    pub shock_defl: Option<String>,
    pub spring_perch_offset: Option<String>,
    pub spring_rate: Option<String>,
    pub ls_comp_damping: Option<String>,
    pub hs_comp_damping: Option<String>,
    pub hs_rbd_damping: Option<String>,
    pub camber: Option<String>,
    pub spring_defl: Option<String>,
    pub toe_in: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct BrakesDriveUnit {
    pub brake_spec: Option<BrakeSpec>,
    pub fuel: Option<Fuel>,
    pub engine: Option<Engine>,
    pub gear_ratios: Option<GearRatio>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct BrakeSpec {
    pub pad_compound: Option<String>,
    pub brake_pressure_bias: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Fuel {
    pub fuel_level: Option<String>,
}

/// Engine mapping. The throttle shape is a map index, so it must be numeric.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Engine {
    pub boost_level_cal: Option<String>,
    pub throttle_shape_tps: Option<i32>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct GearRatio {
    pub gear_stack: Option<String>,
    pub speed_in_first: Option<String>,
    pub speed_in_second: Option<String>,
    pub speed_in_third: Option<String>,
    pub speed_in_fourth: Option<String>,
    pub speed_in_fifth: Option<String>,
    pub speed_in_sixth: Option<String>,
}

impl GearRatio {
    /// Top speed per gear, first to sixth, as displayed.
    pub fn speeds(&self) -> impl Iterator<Item = &str> {
        [
            &self.speed_in_first,
            &self.speed_in_second,
            &self.speed_in_third,
            &self.speed_in_fourth,
            &self.speed_in_fifth,
            &self.speed_in_sixth,
        ]
        .into_iter()
        .map_while(|speed| speed.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_values_keep_their_text() {
        let corner: ChassisCorner = serde_yaml_ng::from_str(
            "CornerWeight: 2421 N\nRideHeight: 0.50\nCamber: -2.8 deg\nToeIn: -1/16\"\nSpringRate: 1200\n",
        )
        .unwrap();
        assert_eq!(corner.corner_weight.as_deref(), Some("2421 N"));
        assert_eq!(corner.ride_height.as_deref(), Some("0.50"));
        assert_eq!(corner.camber.as_deref(), Some("-2.8 deg"));
        assert_eq!(corner.toe_in.as_deref(), Some("-1/16\""));
        assert_eq!(corner.spring_rate.as_deref(), Some("1200"));
        assert_eq!(corner.shock_defl, None);
    }

    #[test]
    fn throttle_shape_must_be_numeric() {
        let engine: Engine =
            serde_yaml_ng::from_str("BoostLevelCal: 3 (BOOST)\nThrottleShapeTps: 2\n").unwrap();
        assert_eq!(engine.boost_level_cal.as_deref(), Some("3 (BOOST)"));
        assert_eq!(engine.throttle_shape_tps, Some(2));

        let bad = serde_yaml_ng::from_str::<Engine>("ThrottleShapeTps: linear\n");
        assert!(bad.is_err());
    }

    #[test]
    fn gear_speeds_stop_at_first_gap() {
        let gears = GearRatio {
            speed_in_first: Some("98.6 km/h".into()),
            speed_in_second: Some("134.1 km/h".into()),
            speed_in_fourth: Some("201.0 km/h".into()),
            ..GearRatio::default()
        };
        assert_eq!(gears.speeds().collect::<Vec<_>>(), vec!["98.6 km/h", "134.1 km/h"]);
    }
}
