//! Session text in the writer's dialect, parsed through the public API.

use anyhow::{Context, Result, ensure};
use paddock::TelemetryError;
use paddock::session::{self, SessionCache, yaml};
use proptest::prelude::*;

const WEEKEND: &str = "\
---
WeekendInfo:
 TrackName: spa 2022 gp
 TrackID: 524
 TrackLength: 6.93 km
 TrackDisplayName: Circuit de Spa-Francorchamps
 TrackSurfaceTemp: 31.40 C
 TrackAirTemp: 22.05 C
 WeekendOptions:
  NumStarters: 20
  StandingStart: 1
SessionInfo:
 CurrentSessionNum: 1
 Sessions:
 - SessionNum: 0
   SessionLaps: unlimited
   SessionTime: 600.0000 sec
   SessionType: Practice
 - SessionNum: 1
   SessionLaps: 12
   SessionTime: unlimited
   SessionType: Race
   ResultsPositions:
   - Position: 1
     ClassPosition: 0
     CarIdx: 4
     FastestTime: 138.2211
   - Position: 2
     ClassPosition: 1
     CarIdx: 0
DriverInfo:
 DriverCarIdx: 0
 Drivers:
 - CarIdx: 0
   UserName: Jean-Eric D'Ambrosio
   AbbrevName: D'Ambrosio, J
   TeamName: Les Amis: Racing
   CarNumber: 12
 - CarIdx: 4
   UserName: Pace Car
   CarIsPaceCar: 1
SplitTimeInfo:
 Sectors:
 - SectorNum: 0
   SectorStartPct: 0.000000
 - SectorNum: 1
   SectorStartPct: 0.312000
 - SectorNum: 2
   SectorStartPct: 0.655000
...
";

#[test]
fn full_document_parses() -> Result<()> {
    let description = session::parse(WEEKEND)?;
    ensure!(description.weekend_info.track_name == "spa 2022 gp");
    ensure!(description.weekend_info.track_length_km() == Some(6.93));

    let race = description.current_session().context("no current session")?;
    ensure!(race.is_race());
    ensure!(race.lap_limit() == Some(12));
    let results = race.results_positions.as_ref().context("no results")?;
    ensure!(results.len() == 2 && results[0].car_idx == 4);

    let drivers = description.driver_info.as_ref().context("no drivers")?;
    let local = drivers.local_driver().context("no local driver")?;
    ensure!(local.user_name == "Jean-Eric D'Ambrosio");
    ensure!(local.team_name.as_deref() == Some("Les Amis: Racing"));
    ensure!(local.car_number.as_deref() == Some("12"));
    ensure!(drivers.competitors().count() == 1);

    ensure!(description.sectors().iter().map(|s| s.sector_num).eq(0..3));
    Ok(())
}

#[test]
fn parsing_is_idempotent() -> Result<()> {
    ensure!(session::parse(WEEKEND)? == session::parse(WEEKEND)?);
    let cleaned = yaml::preprocess(WEEKEND);
    ensure!(session::parse(&cleaned)? == session::parse(WEEKEND)?);
    Ok(())
}

#[test]
fn sector_errors_report_the_offending_entry() {
    let text = WEEKEND.replace("SectorStartPct: 0.655000", "SectorStartPct: 0.200000");
    let err = session::parse(&text).unwrap_err();
    let line = text.lines().position(|line| line.trim() == "- SectorNum: 2").unwrap() + 1;
    assert!(matches!(err, TelemetryError::Parse { line: l, .. } if l == line), "{err}");
}

#[test]
fn cache_only_reparses_on_new_generations() -> Result<()> {
    let mut cache = SessionCache::new();
    let first = cache.refresh(7, || Ok(Some(WEEKEND.to_string())))?.context("not parsed")?;
    ensure!(cache.refresh(7, || panic!("must not be re-read"))?.is_none());

    let renamed = WEEKEND.replace("spa 2022 gp", "spa combined");
    let second = cache.refresh(8, || Ok(Some(renamed)))?.context("not parsed")?;
    ensure!(first.weekend_info.track_name == "spa 2022 gp");
    ensure!(second.weekend_info.track_name == "spa combined");
    Ok(())
}

prop_compose! {
    fn arb_sectors()(steps in prop::collection::vec(1u32..400, 0..12)) -> Vec<(i32, f64)> {
        let mut pct = 0.0;
        let mut sectors = vec![(0, 0.0)];
        for (num, step) in steps.into_iter().enumerate() {
            pct += f64::from(step) / 10_000.0;
            sectors.push((num as i32 + 1, pct));
        }
        sectors
    }
}

fn sector_text(sectors: &[(i32, f64)]) -> String {
    let mut text = String::from("SplitTimeInfo:\n Sectors:\n");
    for (num, pct) in sectors {
        text.push_str(&format!(" - SectorNum: {num}\n   SectorStartPct: {pct:.6}\n"));
    }
    text
}

proptest! {
    #[test]
    fn parsed_sectors_are_ordered(sectors in arb_sectors()) {
        let description = session::parse(&sector_text(&sectors)).unwrap();
        let parsed = description.sectors();
        prop_assert_eq!(parsed.len(), sectors.len());
        for pair in parsed.windows(2) {
            prop_assert!(pair[0].sector_num < pair[1].sector_num);
            prop_assert!(pair[0].sector_start_pct <= pair[1].sector_start_pct);
        }
        prop_assert!(parsed.iter().all(|s| (0.0..1.0).contains(&s.sector_start_pct)));
    }

    #[test]
    fn reparsing_gives_equal_descriptions(sectors in arb_sectors(), track in "[a-z]{1,12}( [a-z]{1,8})?") {
        let text = format!("WeekendInfo:\n TrackName: okayama {track}\n{}", sector_text(&sectors));
        prop_assert_eq!(session::parse(&text).unwrap(), session::parse(&text).unwrap());
    }
}
