//! Variable-header decoding.
//!
//! Each variable header is 144 bytes:
//!
//! ```text
//! offset  field
//!      0  type           i32 wire code
//!      4  offset         i32 byte offset within a sample
//!      8  count          i32 elements
//!     12  count_as_time  u8
//!     16  name[32]
//!     48  desc[64]
//!    112  unit[32]
//! ```

use std::collections::HashSet;

use tracing::debug;

use super::header::{VAR_HEADER_SIZE, c_string, read_i32_le};
use crate::{Result, TelemetryError, VariableInfo, VariableSchema, VariableType};

const NAME: std::ops::Range<usize> = 16..48;
const DESC: std::ops::Range<usize> = 48..112;
const UNIT: std::ops::Range<usize> = 112..144;

/// Decode `num_vars` headers from `raw` into a schema over samples of `extent` bytes.
///
/// Fails with [`TelemetryError::MalformedSchema`] if a header has an unknown
/// type code, a negative offset, a non-positive count, an empty name, a
/// repeated name, or extends past `extent`.
pub fn decode(raw: &[u8], num_vars: usize, extent: usize) -> Result<VariableSchema> {
    let variables = table(raw, num_vars)?
        .chunks_exact(VAR_HEADER_SIZE)
        .enumerate()
        .map(|(index, entry)| decode_entry(index, entry))
        .collect::<Result<Vec<_>>>()?;

    let schema = VariableSchema::new(variables, extent)?;
    debug!(variables = schema.len(), buf_len = extent, "decoded variable schema");
    Ok(schema)
}

/// Decode every usable header, returning the rejected ones alongside.
///
/// A damaged entry only costs that variable; the rest of the table stays
/// readable. Of repeated names the first wins. A truncated table is still an
/// error.
pub fn decode_partial(
    raw: &[u8],
    num_vars: usize,
    extent: usize,
) -> Result<(VariableSchema, Vec<TelemetryError>)> {
    let table = table(raw, num_vars)?;
    let mut seen = HashSet::new();
    let mut variables = Vec::with_capacity(num_vars);
    let mut rejected = Vec::new();
    for (index, entry) in table.chunks_exact(VAR_HEADER_SIZE).enumerate() {
        match decode_entry(index, entry).and_then(|info| within_extent(info, extent)) {
            Ok(info) if seen.insert(info.name.clone()) => variables.push(info),
            Ok(info) => rejected
                .push(TelemetryError::malformed_schema(&info.name, "duplicate variable name")),
            Err(err) => rejected.push(err),
        }
    }
    drop(seen);

    let schema = VariableSchema::new(variables, extent)?;
    debug!(
        variables = schema.len(),
        rejected = rejected.len(),
        buf_len = extent,
        "decoded variable schema"
    );
    Ok((schema, rejected))
}

fn table(raw: &[u8], num_vars: usize) -> Result<&[u8]> {
    let table_len = num_vars
        .checked_mul(VAR_HEADER_SIZE)
        .ok_or_else(|| TelemetryError::malformed_schema("header", "variable count overflows"))?;
    raw.get(..table_len).ok_or_else(|| {
        TelemetryError::malformed_schema(
            "header",
            format!("variable table truncated: need {table_len} bytes, have {}", raw.len()),
        )
    })
}

fn within_extent(info: VariableInfo, extent: usize) -> Result<VariableInfo> {
    match info.offset.checked_add(info.byte_len()) {
        Some(end) if end <= extent => Ok(info),
        _ => Err(TelemetryError::malformed_schema(
            &info.name,
            format!("extends past sample length {extent}"),
        )),
    }
}

/// Like [`decode`], but also rejects a variable whose name exists in
/// `previous` with a different type.
pub fn decode_against(
    previous: &VariableSchema,
    raw: &[u8],
    num_vars: usize,
    extent: usize,
) -> Result<VariableSchema> {
    let schema = decode(raw, num_vars, extent)?;
    for info in schema.iter() {
        if let Some(old) = previous.get(&info.name) {
            if old.data_type != info.data_type {
                return Err(TelemetryError::malformed_schema(
                    &info.name,
                    format!("type changed from {:?} to {:?}", old.data_type, info.data_type),
                ));
            }
        }
    }
    Ok(schema)
}

fn decode_entry(index: usize, entry: &[u8]) -> Result<VariableInfo> {
    let name = c_string(&entry[NAME]);
    if name.is_empty() {
        return Err(TelemetryError::malformed_schema(format!("#{index}"), "empty variable name"));
    }

    let code = read_i32_le(entry, 0).unwrap_or(-1);
    let offset = read_i32_le(entry, 4).unwrap_or(-1);
    let count = read_i32_le(entry, 8).unwrap_or(0);

    let data_type = VariableType::from_code(code, &name)?;
    let offset = usize::try_from(offset)
        .map_err(|_| TelemetryError::malformed_schema(&name, format!("negative offset {offset}")))?;
    if count <= 0 {
        return Err(TelemetryError::malformed_schema(&name, format!("non-positive count {count}")));
    }

    Ok(VariableInfo {
        name,
        data_type,
        offset,
        count: count as usize,
        count_as_time: entry[12] != 0,
        units: c_string(&entry[UNIT]),
        description: c_string(&entry[DESC]),
    })
}

/// Lay out one variable header the way the writer does. Text fields are
/// truncated to leave room for a terminating NUL.
pub fn encode_var_header(info: &VariableInfo) -> [u8; VAR_HEADER_SIZE] {
    let mut entry = [0u8; VAR_HEADER_SIZE];
    entry[0..4].copy_from_slice(&info.data_type.code().to_le_bytes());
    entry[4..8].copy_from_slice(&(info.offset as i32).to_le_bytes());
    entry[8..12].copy_from_slice(&(info.count as i32).to_le_bytes());
    entry[12] = u8::from(info.count_as_time);
    for (range, text) in [(NAME, &info.name), (DESC, &info.description), (UNIT, &info.units)] {
        let len = text.len().min(range.len() - 1);
        entry[range.start..range.start + len].copy_from_slice(&text.as_bytes()[..len]);
    }
    entry
}
