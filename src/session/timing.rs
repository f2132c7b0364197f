//! Track sector boundaries.

use serde::{Deserialize, Serialize};

use crate::{Result, TelemetryError};

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SplitTimeInfo {
    pub sectors: Vec<Sector>,
}

/// Start of a timing sector as a fraction of lap distance.
///
/// Both keys are required; a sector missing either fails the parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
pub struct Sector {
    pub sector_num: i32,
    pub sector_start_pct: f64,
}

impl SplitTimeInfo {
    /// Sector containing the given lap fraction.
    pub fn sector_at(&self, lap_pct: f64) -> Option<&Sector> {
        self.sectors.iter().rev().find(|sector| sector.sector_start_pct <= lap_pct)
    }

    /// Check ordering and range of the sector table.
    ///
    /// `line_of` maps an entry index to its line in the source text, so the
    /// error points at the offending entry.
    pub(crate) fn validate(&self, line_of: impl Fn(usize) -> usize) -> Result<()> {
        let mut previous: Option<&Sector> = None;
        for (index, sector) in self.sectors.iter().enumerate() {
            let pct = sector.sector_start_pct;
            let reason = if !(0.0..1.0).contains(&pct) {
                Some(format!("sector {} starts at {pct}, outside [0, 1)", sector.sector_num))
            } else if let Some(prev) = previous.filter(|prev| sector.sector_num <= prev.sector_num) {
                Some(format!("sector number {} does not follow {}", sector.sector_num, prev.sector_num))
            } else if let Some(prev) =
                previous.filter(|prev| pct <= prev.sector_start_pct)
            {
                Some(format!(
                    "sector {} starts at {pct}, not after sector {} at {}",
                    sector.sector_num, prev.sector_num, prev.sector_start_pct
                ))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(TelemetryError::parse_error(line_of(index), reason));
            }
            previous = Some(sector);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sectors(entries: &[(i32, f64)]) -> SplitTimeInfo {
        SplitTimeInfo {
            sectors: entries
                .iter()
                .map(|&(sector_num, sector_start_pct)| Sector { sector_num, sector_start_pct })
                .collect(),
        }
    }

    #[test]
    fn ordered_sectors_pass() {
        let info = sectors(&[(0, 0.0), (1, 0.33), (2, 0.66)]);
        assert!(info.validate(|i| i + 1).is_ok());
        assert_eq!(info.sector_at(0.5).map(|s| s.sector_num), Some(1));
        assert_eq!(info.sector_at(0.99).map(|s| s.sector_num), Some(2));
    }

    #[test]
    fn violations_report_the_entry_line() {
        let cases = [
            sectors(&[(0, 0.0), (1, 0.5), (2, 0.4)]),
            sectors(&[(0, 0.0), (1, 0.5), (1, 0.7)]),
            sectors(&[(0, 0.0), (1, 0.5), (2, 1.0)]),
            sectors(&[(0, 0.0), (1, 0.5), (2, 0.5)]),
        ];
        for info in cases {
            match info.validate(|i| 10 + 2 * i) {
                Err(TelemetryError::Parse { line, .. }) => assert_eq!(line, 14),
                other => panic!("expected parse error, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_start_is_rejected() {
        let info = sectors(&[(0, -0.1)]);
        assert!(matches!(info.validate(|_| 3), Err(TelemetryError::Parse { line: 3, .. })));
    }
}
