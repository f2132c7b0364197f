//! Synthetic fixtures for tests and benchmarks.
//!
//! Everything here builds in memory: a standard variable layout, samples that
//! fill it, a simulated writer image, a capture, and session text in the
//! writer's dialect (unquoted free-text names included).

use crate::ibt::CaptureBuilder;
use crate::memory::{InMemoryRegion, SharedRegion, SimulatedWriter};
use crate::provider::RegionOpener;
use crate::schema::known::MAX_CARS;
use crate::{Result, TelemetryError, VariableInfo, VariableType};

/// Session text the way the writer emits it, with names it leaves unquoted.
pub const SAMPLE_SESSION: &str = "\
---
WeekendInfo:
 TrackName: okayama full
 TrackID: 166
 TrackLength: 3.70 km
 TrackDisplayName: Okayama International Circuit
 TrackCity: Mimasaka
 TrackCountry: Japan
 TrackSurfaceTemp: 33.12 C
 TrackAirTemp: 25.55 C
 SeriesID: 0
 SessionID: 0
 SubSessionID: 0
 EventType: Test
 Category: Road
 WeekendOptions:
  NumStarters: 0
  StartingGrid: single file
  IncidentLimit: unlimited
 TelemetryOptions:
  TelemetryDiskFile: \"\"

SessionInfo:
 CurrentSessionNum: 0
 Sessions:
 - SessionNum: 0
   SessionLaps: unlimited
   SessionTime: unlimited
   SessionNumLapsToAvg: 0
   SessionType: Offline Testing
   SessionTrackRubberState: moderately low usage
   SessionName: TESTING
   ResultsPositions:
   - Position: 1
     ClassPosition: 0
     CarIdx: 0
     Lap: 2
     Time: 94.4721
     FastestLap: 2
     FastestTime: 94.4721
     LastTime: 94.4721
     Incidents: 0
     ReasonOutId: 0
     ReasonOutStr: Running
   ResultsFastestLap:
   - CarIdx: 0
     FastestLap: 2
     FastestTime: 94.4721

CameraInfo:
 Groups:
 - GroupNum: 1
   GroupName: Nose
   Cameras:
   - CameraNum: 1
     CameraName: CamNose
 - GroupNum: 2
   GroupName: Scenic
   IsScenic: true
   Cameras:
   - CameraNum: 1
     CameraName: CamScenic

DriverInfo:
 DriverCarIdx: 0
 DriverUserID: 123456
 PaceCarIdx: -1
 DriverCarRedLine: 7500.000
 Drivers:
 - CarIdx: 0
   UserName: Sean O'Neil
   AbbrevName: O'Neil, S
   Initials: SO
   UserID: 123456
   TeamID: 0
   TeamName: Sean O'Neil
   CarNumber: \"007\"
   CarNumberRaw: 7
   CarScreenName: Mazda MX-5 Cup
   CarClassID: 0
   CarIsPaceCar: 0
   IRating: 1350
   LicString: D 3.22
   IsSpectator: 0
   CarDesignStr: 0,ffffff,ff0000,000000

SplitTimeInfo:
 Sectors:
 - SectorNum: 0
   SectorStartPct: 0.000000
 - SectorNum: 1
   SectorStartPct: 0.347590
 - SectorNum: 2
   SectorStartPct: 0.702132
...
";

/// Session text holding only a sector list.
pub fn split_time_yaml(sectors: &[(i32, f64)]) -> String {
    let mut text = String::from("WeekendInfo:\n TrackName: okayama full\nSplitTimeInfo:\n Sectors:\n");
    for (num, pct) in sectors {
        text.push_str(&format!(" - SectorNum: {num}\n   SectorStartPct: {pct:.6}\n"));
    }
    text
}

/// Byte length of a sample in the standard layout.
pub const STANDARD_BUF_LEN: usize = 36 + 2 * MAX_CARS * 4;

/// A typical slice of the writer's variables, laid out back to back.
pub fn standard_variables() -> Vec<VariableInfo> {
    vec![
        VariableInfo {
            units: "s".to_string(),
            description: "Seconds since session start".to_string(),
            ..VariableInfo::scalar("SessionTime", VariableType::Float64, 0)
        },
        VariableInfo::scalar("SessionTick", VariableType::Int32, 8),
        VariableInfo {
            units: "m/s".to_string(),
            description: "GPS vehicle speed".to_string(),
            ..VariableInfo::scalar("Speed", VariableType::Float32, 12)
        },
        VariableInfo::scalar("RPM", VariableType::Float32, 16),
        VariableInfo::scalar("Gear", VariableType::Int32, 20),
        VariableInfo::scalar("Lap", VariableType::Int32, 24),
        VariableInfo::scalar("SessionFlags", VariableType::BitField, 28),
        VariableInfo::scalar("OnPitRoad", VariableType::Bool, 32),
        VariableInfo::array("CarIdxLapDistPct", VariableType::Float32, 36, MAX_CARS),
        VariableInfo::array("CarIdxPosition", VariableType::Int32, 36 + MAX_CARS * 4, MAX_CARS),
    ]
}

/// A sample in the standard layout.
pub fn standard_sample(tick: i32, speed: f32) -> Vec<u8> {
    let mut bytes = vec![0u8; STANDARD_BUF_LEN];
    bytes[0..8].copy_from_slice(&(f64::from(tick) / 60.0).to_le_bytes());
    bytes[8..12].copy_from_slice(&tick.to_le_bytes());
    bytes[12..16].copy_from_slice(&speed.to_le_bytes());
    bytes[16..20].copy_from_slice(&(speed * 100.0).to_le_bytes());
    bytes[20..24].copy_from_slice(&((speed / 15.0) as i32 + 1).to_le_bytes());
    bytes[24..28].copy_from_slice(&(tick / 5400).to_le_bytes());
    bytes[28..32].copy_from_slice(&0x0004_0000u32.to_le_bytes());
    for car in 0..MAX_CARS {
        let pct = ((tick as f32 / 5400.0) + car as f32 * 0.01).fract();
        let base = 36 + car * 4;
        bytes[base..base + 4].copy_from_slice(&pct.to_le_bytes());
        let position = 36 + MAX_CARS * 4 + car * 4;
        bytes[position..position + 4].copy_from_slice(&(car as i32 + 1).to_le_bytes());
    }
    bytes
}

/// Writer image with the standard layout and [`SAMPLE_SESSION`].
pub fn standard_writer() -> Result<(InMemoryRegion, SimulatedWriter)> {
    SimulatedWriter::builder()
        .variables(standard_variables())
        .buf_len(STANDARD_BUF_LEN)
        .session_text(SAMPLE_SESSION)
        .build()
}

/// Capture of `records` standard samples, ticks starting at 1.
pub fn standard_capture(records: usize) -> Result<Vec<u8>> {
    CaptureBuilder::new()
        .variables(standard_variables())
        .buf_len(STANDARD_BUF_LEN)
        .session_text(SAMPLE_SESSION)
        .lap_count(1)
        .records((1..=records as i32).map(|tick| standard_sample(tick, tick as f32 * 0.5)))
        .build()
}

/// Opener that hands out `region` once and reports it unavailable afterwards.
pub fn one_shot_opener<R: SharedRegion + 'static>(region: R) -> RegionOpener {
    let mut region = Some(region);
    Box::new(move || {
        region
            .take()
            .map(|region| Box::new(region) as Box<dyn SharedRegion>)
            .ok_or_else(|| TelemetryError::buffer_unavailable("region already handed out"))
    })
}

/// Opener that never finds a region.
pub fn unavailable_opener() -> RegionOpener {
    Box::new(|| Err(TelemetryError::buffer_unavailable("simulator not running")))
}
