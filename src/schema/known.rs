//! Variables consumers rely on, with the shape the writer is expected to publish.

use crate::lut::Lut;
use crate::{Result, TelemetryError, VariableSchema, VariableType};

/// Expected type and element count of a well-known variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownVariable {
    pub data_type: VariableType,
    pub count: usize,
}

/// Number of car slots in per-car (`CarIdx*`) arrays.
pub const MAX_CARS: usize = 64;

const fn per_car(data_type: VariableType) -> KnownVariable {
    KnownVariable { data_type, count: MAX_CARS }
}

const fn scalar(data_type: VariableType) -> KnownVariable {
    KnownVariable { data_type, count: 1 }
}

pub const KNOWN_VARIABLES: Lut<&str, KnownVariable, 21> = Lut::from_sorted([
    ("CarIdxClassPosition", per_car(VariableType::Int32)),
    ("CarIdxEstTime", per_car(VariableType::Float32)),
    ("CarIdxF2Time", per_car(VariableType::Float32)),
    ("CarIdxGear", per_car(VariableType::Int32)),
    ("CarIdxLap", per_car(VariableType::Int32)),
    ("CarIdxLapCompleted", per_car(VariableType::Int32)),
    ("CarIdxLapDistPct", per_car(VariableType::Float32)),
    ("CarIdxOnPitRoad", per_car(VariableType::Bool)),
    ("CarIdxPosition", per_car(VariableType::Int32)),
    ("CarIdxRPM", per_car(VariableType::Float32)),
    ("CarIdxTrackSurface", per_car(VariableType::Int32)),
    ("Gear", scalar(VariableType::Int32)),
    ("Lap", scalar(VariableType::Int32)),
    ("RPM", scalar(VariableType::Float32)),
    ("SessionFlags", scalar(VariableType::BitField)),
    ("SessionNum", scalar(VariableType::Int32)),
    ("SessionState", scalar(VariableType::Int32)),
    ("SessionTime", scalar(VariableType::Float64)),
    ("SessionTimeOfDay", scalar(VariableType::Float32)),
    ("SessionTimeRemain", scalar(VariableType::Float64)),
    ("Speed", scalar(VariableType::Float32)),
]);

impl VariableSchema {
    /// Verify that every well-known variable this schema publishes has the
    /// expected type and count. Variables the writer omits are not checked.
    pub fn check_known(&self) -> Result<()> {
        for (name, expected) in KNOWN_VARIABLES.iter() {
            let Some(info) = self.get(name) else { continue };
            if info.data_type != expected.data_type || info.count != expected.count {
                return Err(TelemetryError::malformed_schema(
                    *name,
                    format!(
                        "expected {:?} x{}, found {:?} x{}",
                        expected.data_type, expected.count, info.data_type, info.count
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariableInfo;

    #[test]
    fn table_lookups() {
        assert_eq!(KNOWN_VARIABLES.lookup("Speed"), Some(&scalar(VariableType::Float32)));
        assert_eq!(KNOWN_VARIABLES.get("CarIdxLapDistPct").unwrap().count, MAX_CARS);
        assert!(KNOWN_VARIABLES.get("PitSvFuel").is_err());
    }

    #[test]
    fn matching_and_absent_variables_pass() {
        let schema = VariableSchema::new(
            vec![
                VariableInfo::scalar("SessionTime", VariableType::Float64, 0),
                VariableInfo::array("CarIdxLapDistPct", VariableType::Float32, 8, MAX_CARS),
                VariableInfo::scalar("Throttle", VariableType::Float32, 8 + 4 * MAX_CARS),
            ],
            12 + 4 * MAX_CARS,
        )
        .unwrap();
        assert!(schema.check_known().is_ok());
    }

    #[test]
    fn wrong_shape_is_reported() {
        let schema = VariableSchema::new(
            vec![VariableInfo::scalar("SessionTime", VariableType::Float32, 0)],
            4,
        )
        .unwrap();
        let err = schema.check_known().unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedSchema { variable, .. } if variable == "SessionTime"));
    }
}
