//! # Session description parsing
//!
//! Besides the numeric samples, the writer publishes a YAML document describing
//! the session: track and weather, the session list with results, the entry
//! list, camera groups, sector boundaries, and the local car's setup. The
//! document is regenerated whenever anything in it changes, marked by the
//! header's session generation counter.
//!
//! ```text
//!  session text ──► preprocess ──► serde_yaml_ng ──► validate ──► SessionDescription
//!                   (yaml.rs)                        (sectors)
//! ```
//!
//! The writer's text is not strictly valid YAML (free-text names are emitted
//! unquoted), so [`parse`] repairs it first. Unknown keys are ignored and
//! absent optional keys take their defaults. Numeric fields that programs act
//! on (sector boundaries, result positions) are strict; display-only setup
//! values keep their text.
//!
//! ```rust
//! let description = paddock::session::parse(
//!     "SplitTimeInfo:\n Sectors:\n - SectorNum: 0\n   SectorStartPct: 0.000000\n",
//! )?;
//! assert_eq!(description.split_time_info.unwrap().sectors.len(), 1);
//! # Ok::<(), paddock::TelemetryError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Result, TelemetryError};

pub mod cache;
pub mod camera;
pub mod drivers;
pub mod results;
pub mod sessions;
pub mod setup;
pub mod timing;
pub mod weekend;
pub mod yaml;

pub use cache::SessionCache;
pub use camera::{Camera, CameraInfo, Group};
pub use drivers::{Driver, DriverInfo};
pub use results::{QualifyResultsInfo, ResultsFastestLap, ResultsPosition, SessionResult};
pub use sessions::{Session, SessionList};
pub use setup::{
    AeroSettings, BrakeSpec, BrakesDriveUnit, CarSetup, Chassis, ChassisCorner, Engine, Front,
    Fuel, GearRatio, Rear, Tire, TiresAero,
};
pub use timing::{Sector, SplitTimeInfo};
pub use weekend::{TelemetryOptions, WeekendInfo, WeekendOptions};

/// The parsed session document.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionDescription {
    pub weekend_info: WeekendInfo,
    /// The session list. The document calls this block `SessionInfo`.
    pub session_info: SessionList,
    pub qualify_results_info: Option<QualifyResultsInfo>,
    pub camera_info: Option<CameraInfo>,
    pub driver_info: Option<DriverInfo>,
    pub split_time_info: Option<SplitTimeInfo>,
    pub car_setup: Option<CarSetup>,
}

impl SessionDescription {
    pub fn sectors(&self) -> &[Sector] {
        self.split_time_info.as_ref().map_or(&[], |info| info.sectors.as_slice())
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.session_info.current()
    }
}

/// Parse session text into a [`SessionDescription`].
///
/// Failures are [`TelemetryError::Parse`] carrying the 1-based line of the
/// problem, or 0 when the position is unknown.
pub fn parse(text: &str) -> Result<SessionDescription> {
    let cleaned = yaml::preprocess(text);
    if cleaned.trim().is_empty() {
        return Err(TelemetryError::parse_error(0, "session text is empty"));
    }

    let description: SessionDescription = serde_yaml_ng::from_str(&cleaned)?;
    if let Some(split) = &description.split_time_info {
        split.validate(|index| sector_entry_line(&cleaned, index))?;
    }

    trace!(
        bytes = text.len(),
        sessions = description.session_info.sessions.len(),
        sectors = description.sectors().len(),
        "parsed session description"
    );
    Ok(description)
}

/// Line (1-based) where the `index`-th sector entry starts, or 0.
fn sector_entry_line(text: &str, index: usize) -> usize {
    let mut lines = text.split('\n').enumerate();
    if !lines.by_ref().any(|(_, line)| line.trim_end() == "SplitTimeInfo:") {
        return 0;
    }
    lines
        .take_while(|(_, line)| {
            line.trim().is_empty() || line.starts_with(char::is_whitespace) || line.starts_with('-')
        })
        .filter(|(_, line)| line.trim_start().starts_with("- "))
        .nth(index)
        .map_or(0, |(number, _)| number + 1)
}
