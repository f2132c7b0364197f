//! Checked extraction of typed values from a sample.

use super::{BitField, VariableInfo, VariableType};
use crate::{Result, TelemetryError};

/// Types that can be read out of a sample for a given variable.
pub trait VarData: Sized {
    /// Read this type for `info` from `data`.
    ///
    /// Fails with [`TelemetryError::TypeMismatch`] when the declared type does
    /// not fit `Self`, and [`TelemetryError::Memory`] when the variable extends
    /// past the end of `data`.
    fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self>;
}

/// Single-element reads that can be repeated across an array variable.
pub trait ScalarVar: VarData {
    /// Read element `index` of the variable.
    fn read_element(data: &[u8], info: &VariableInfo, index: usize) -> Result<Self>;
}

fn element_bytes<'a>(data: &'a [u8], info: &VariableInfo, index: usize) -> Result<&'a [u8]> {
    let size = info.data_type.size();
    let start = info.offset.saturating_add(index.saturating_mul(size));
    if index >= info.count {
        return Err(TelemetryError::Memory { offset: start });
    }
    data.get(start..start.saturating_add(size)).ok_or(TelemetryError::Memory { offset: start })
}

fn expect_type(info: &VariableInfo, accepted: &[VariableType], wanted: &str) -> Result<()> {
    if accepted.contains(&info.data_type) {
        Ok(())
    } else {
        Err(TelemetryError::TypeMismatch {
            details: format!("'{}' is {:?}, requested {}", info.name, info.data_type, wanted),
        })
    }
}

macro_rules! scalar_var {
    ($ty:ty, [$($accepted:ident),+], |$bytes:ident| $decode:expr) => {
        impl ScalarVar for $ty {
            fn read_element(data: &[u8], info: &VariableInfo, index: usize) -> Result<Self> {
                expect_type(info, &[$(VariableType::$accepted),+], stringify!($ty))?;
                let $bytes = element_bytes(data, info, index)?;
                Ok($decode)
            }
        }

        impl VarData for $ty {
            fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self> {
                Self::read_element(data, info, 0)
            }
        }
    };
}

scalar_var!(f32, [Float32], |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]));
scalar_var!(f64, [Float64], |b| f64::from_le_bytes([
    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
]));
scalar_var!(i32, [Int32], |b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]));
scalar_var!(u32, [BitField], |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]));
scalar_var!(bool, [Bool], |b| b[0] != 0);
scalar_var!(u8, [Char], |b| b[0]);
scalar_var!(BitField, [BitField], |b| BitField(u32::from_le_bytes([b[0], b[1], b[2], b[3]])));

/// Every element of an array variable (`count` elements).
impl<T: ScalarVar> VarData for Vec<T> {
    fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self> {
        (0..info.count).map(|index| T::read_element(data, info, index)).collect()
    }
}

/// Character arrays, read up to the first NUL.
impl VarData for String {
    fn from_bytes(data: &[u8], info: &VariableInfo) -> Result<Self> {
        expect_type(info, &[VariableType::Char], "String")?;
        let end = info.offset.saturating_add(info.count);
        let bytes = data.get(info.offset..end).ok_or(TelemetryError::Memory { offset: info.offset })?;
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }
}

/// Read `T` for `info` out of a sample.
pub fn extract<T: VarData>(sample: &[u8], info: &VariableInfo) -> Result<T> {
    T::from_bytes(sample, info)
}
