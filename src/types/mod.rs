//! Core types for telemetry variables and their values.
//!
//! - [`VariableType`] maps the writer's six wire type codes to element sizes
//! - [`VariableInfo`] / [`VariableSchema`] describe where each variable lives in a sample
//! - [`VarData`] reads typed values out of a sample with type and bounds checks
//! - [`BitField`] wraps flag-set variables
//!
//! ```rust
//! use paddock::types::{VariableInfo, VariableSchema, VariableType};
//!
//! let schema = VariableSchema::new(
//!     vec![VariableInfo::scalar("RPM", VariableType::Float32, 0)],
//!     4,
//! ).unwrap();
//! let sample = 4500.0f32.to_le_bytes();
//!
//! let rpm: f32 = schema.extract(&sample, "RPM").unwrap();
//! assert_eq!(rpm, 4500.0);
//! ```

mod bitfield;
mod schema;
mod var_data;
mod variable_type;

pub use bitfield::BitField;
pub use schema::{VariableInfo, VariableSchema};
pub use var_data::{ScalarVar, VarData, extract};
pub use variable_type::VariableType;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelemetryError;

    use proptest::prelude::*;

    const ALL_TYPES: [VariableType; 6] = [
        VariableType::Char,
        VariableType::Bool,
        VariableType::Int32,
        VariableType::BitField,
        VariableType::Float32,
        VariableType::Float64,
    ];

    prop_compose! {
        fn arb_variable_info(buf_len: usize)(
            name in "[A-Za-z][A-Za-z0-9_]{0,30}",
            data_type in prop::sample::select(ALL_TYPES.to_vec()),
            offset in 0..buf_len,
            count in 1..8usize,
            units in "[a-zA-Z/%]{0,6}",
        ) -> VariableInfo {
            VariableInfo {
                name,
                data_type,
                offset,
                count,
                count_as_time: false,
                units,
                description: String::new(),
            }
        }
    }

    proptest! {
        #[test]
        fn schema_accepts_exactly_the_in_bounds_variables(
            infos in prop::collection::vec(arb_variable_info(256), 1..24),
        ) {
            let mut unique = std::collections::BTreeMap::new();
            for info in infos {
                unique.entry(info.name.clone()).or_insert(info);
            }
            let infos: Vec<_> = unique.into_values().collect();
            let all_fit = infos.iter().all(|info| info.offset + info.byte_len() <= 256);

            match VariableSchema::new(infos.clone(), 256) {
                Ok(schema) => {
                    prop_assert!(all_fit);
                    for info in &infos {
                        prop_assert_eq!(schema.lookup(&info.name).ok(), Some(info));
                    }
                }
                Err(TelemetryError::MalformedSchema { .. }) => prop_assert!(!all_fit),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        #[test]
        fn f32_reads_what_was_written(value in any::<f32>(), offset in 0..100usize) {
            let mut data = vec![0u8; offset + 8];
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            let info = VariableInfo::scalar("Speed", VariableType::Float32, offset);

            let parsed = extract::<f32>(&data, &info);
            prop_assert_eq!(parsed.map(f32::to_bits).ok(), Some(value.to_bits()));
        }

        #[test]
        fn bitfield_reads_all_patterns(value in any::<u32>(), bit in 0..32u32) {
            let data = value.to_le_bytes();
            let info = VariableInfo::scalar("SessionFlags", VariableType::BitField, 0);
            let flags = BitField::from_bytes(&data, &info).expect("in bounds");
            prop_assert_eq!(flags.value(), value);
            prop_assert_eq!(flags.is_set(bit), value & (1 << bit) != 0);
        }
    }

    #[test]
    fn lookup_missing_is_not_found() {
        let schema = VariableSchema::new(
            vec![VariableInfo::scalar("Speed", VariableType::Float32, 0)],
            4,
        )
        .unwrap();
        assert!(matches!(schema.lookup("Rpm"), Err(TelemetryError::NotFound { key }) if key == "Rpm"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = VariableSchema::new(
            vec![
                VariableInfo::scalar("Gear", VariableType::Int32, 0),
                VariableInfo::scalar("Gear", VariableType::Int32, 4),
            ],
            8,
        );
        assert!(matches!(result, Err(TelemetryError::MalformedSchema { variable, .. }) if variable == "Gear"));
    }

    #[test]
    fn wrong_type_is_type_mismatch() {
        let info = VariableInfo::scalar("Gear", VariableType::Int32, 0);
        let data = 3i32.to_le_bytes();
        assert!(matches!(f32::from_bytes(&data, &info), Err(TelemetryError::TypeMismatch { .. })));
        assert_eq!(i32::from_bytes(&data, &info).unwrap(), 3);

        let flags = VariableInfo::scalar("SessionFlags", VariableType::BitField, 0);
        assert!(matches!(i32::from_bytes(&data, &flags), Err(TelemetryError::TypeMismatch { .. })));
        assert_eq!(u32::from_bytes(&data, &flags).unwrap(), 3);
    }

    #[test]
    fn short_sample_is_memory_error() {
        let info = VariableInfo::scalar("SessionTime", VariableType::Float64, 4);
        let data = [0u8; 8];
        assert!(matches!(f64::from_bytes(&data, &info), Err(TelemetryError::Memory { offset: 4 })));
    }

    #[test]
    fn arrays_read_every_element() {
        let info = VariableInfo::array("CarIdxPosition", VariableType::Int32, 0, 3);
        let data: Vec<u8> = [3i32, 1, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(Vec::<i32>::from_bytes(&data, &info).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn char_arrays_stop_at_nul() {
        let info = VariableInfo::array("Label", VariableType::Char, 0, 8);
        let data = *b"P1\0xxxxx";
        assert_eq!(String::from_bytes(&data, &info).unwrap(), "P1");
    }

    #[test]
    fn bitfield_helpers() {
        let flags = BitField::new(0b1010);
        assert!(flags.is_set(1) && flags.is_set(3));
        assert!(!flags.is_set(0) && !flags.is_set(40));
        assert!(flags.has_all(0b1010) && !flags.has_all(0b1011));
        assert_eq!(flags.set_bits().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(flags.to_string(), "0x0000000a");
    }
}
