//! End-to-end provider behaviour over a simulated writer and in-memory captures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, ensure};
use paddock::ibt::{CaptureBuilder, IbtReader};
use paddock::memory::{InMemoryRegion, SharedRegion, SimulatedWriter};
use paddock::observe::{NullSink, RecordingSink, TracingSink};
use paddock::provider::{RecordedSource, RegionOpener};
use paddock::schema::TelemetryHeader;
use paddock::{
    ProviderConfig, SessionDataProvider, TelemetryError, TelemetryEvent, VariableInfo, VariableType,
};

const SESSION: &str = "\
WeekendInfo:
 TrackName: okayama full
SplitTimeInfo:
 Sectors:
 - SectorNum: 0
   SectorStartPct: 0.000000
 - SectorNum: 1
   SectorStartPct: 0.347590
 - SectorNum: 2
   SectorStartPct: 0.702132
";

fn opener(region: InMemoryRegion) -> RegionOpener {
    let mut region = Some(region);
    Box::new(move || {
        region
            .take()
            .map(|region| Box::new(region) as Box<dyn SharedRegion>)
            .ok_or_else(|| TelemetryError::buffer_unavailable("region already handed out"))
    })
}

fn speed_writer() -> Result<(InMemoryRegion, SimulatedWriter)> {
    Ok(SimulatedWriter::builder()
        .variable(VariableInfo::scalar("Speed", VariableType::Float32, 0))
        .buf_len(4)
        .session_text(SESSION)
        .build()?)
}

#[test]
fn speed_is_read_from_the_first_sample() -> Result<()> {
    let (region, mut writer) = speed_writer()?;
    writer.publish(&42.5f32.to_le_bytes())?;

    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
    provider.bind_live(opener(region))?;
    let sample = provider.advance()?.context("no sample")?;

    ensure!(sample.value::<f32>("Speed")? == 42.5);
    ensure!(provider.value::<f32>("Speed")? == 42.5);
    ensure!(provider.schema().context("no schema")?.contains("Speed"));
    Ok(())
}

#[test]
fn bad_fourth_sector_keeps_the_previous_description() -> Result<()> {
    let (region, mut writer) = speed_writer()?;
    writer.publish(&10.0f32.to_le_bytes())?;

    let sink = Arc::new(RecordingSink::new());
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), sink.clone());
    provider.bind_live(opener(region))?;
    provider.advance()?.context("no first sample")?;
    let before = provider.session().context("no description")?;
    ensure!(before.sectors().len() == 3);

    let bad = format!("{SESSION} - SectorNum: 3\n   SectorStartPct: 0.500000\n");
    writer.publish_session(&bad)?;
    writer.publish(&11.0f32.to_le_bytes())?;
    let sample = provider.advance()?.context("no second sample")?;
    ensure!(sample.value::<f32>("Speed")? == 11.0);

    let after = provider.session().context("description withdrawn")?;
    ensure!(Arc::ptr_eq(&before, &after));
    ensure!(after.sectors().len() == 3);
    ensure!(sink.count(|e| matches!(e, TelemetryEvent::SessionRejected { generation: 2, .. })) == 1);
    Ok(())
}

#[test]
fn live_seek_never_moves_the_cursor() -> Result<()> {
    let (region, mut writer) = speed_writer()?;
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
    provider.bind_live(opener(region))?;

    for speed in [1.0f32, 2.0, 3.0] {
        writer.publish(&speed.to_le_bytes())?;
        provider.advance()?.context("no sample")?;
    }
    let index = provider.sample_index();
    ensure!(index == 2);
    for target in [0, 1, 2, 100] {
        ensure!(!provider.seek(target));
        ensure!(provider.sample_index() == index);
    }
    ensure!(provider.sample_count() == 0);
    Ok(())
}

#[test]
fn unavailable_region_fails_every_poll_with_one_attempt() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
    provider.bind_live(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(TelemetryError::buffer_unavailable("simulator not running"))
    }))?;

    for poll in 1..=5 {
        let err = provider.advance().expect_err("region is unavailable");
        ensure!(matches!(err, TelemetryError::BufferUnavailable { .. }), "poll {poll}: {err}");
        ensure!(attempts.load(Ordering::SeqCst) == poll);
    }
    ensure!(provider.schema().is_none());
    Ok(())
}

#[test]
fn oversized_variable_table_is_rejected_on_every_poll() -> Result<()> {
    let header = TelemetryHeader {
        ver: 2,
        status: 1,
        num_vars: i32::MAX,
        var_header_offset: 112,
        buf_len: 4,
        ..TelemetryHeader::default()
    };
    let mut bytes = vec![0u8; 4096];
    bytes[..112].copy_from_slice(&header.to_bytes());
    let (region, _writer) = InMemoryRegion::from_bytes(bytes);

    let sink = Arc::new(RecordingSink::new());
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), sink.clone());
    provider.bind_live(opener(region))?;
    for poll in 1..=3 {
        let err = provider.advance().expect_err("variable table exceeds the region");
        ensure!(matches!(err, TelemetryError::MalformedSchema { .. }), "poll {poll}: {err}");
    }
    ensure!(provider.schema().is_none());
    ensure!(sink.count(|e| matches!(e, TelemetryEvent::SchemaRejected { .. })) == 3);
    Ok(())
}

#[test]
fn samples_never_go_backwards() -> Result<()> {
    let (region, mut writer) = speed_writer()?;
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
    provider.bind_live(opener(region))?;

    let mut last = None;
    for tick in [10, 11, 11, 14, 20] {
        writer.publish_with_tick(tick, &(tick as f32).to_le_bytes())?;
        if let Some(sample) = provider.advance()? {
            ensure!(last.is_none_or(|last| sample.tick > last));
            last = Some(sample.tick);
        }
    }
    ensure!(last == Some(20));
    Ok(())
}

#[test]
fn recorded_capture_replays_through_the_same_provider() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let capture = CaptureBuilder::new()
        .variable(VariableInfo::scalar("SessionTick", VariableType::Int32, 0))
        .variable(VariableInfo::scalar("Speed", VariableType::Float32, 4))
        .buf_len(8)
        .session_text(SESSION)
        .records((0..10).map(|i: i32| {
            let mut record = (100 + i).to_le_bytes().to_vec();
            record.extend_from_slice(&(i as f32 * 2.0).to_le_bytes());
            record
        }))
        .build()?;

    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(TracingSink));
    provider.bind(Box::new(RecordedSource::new(IbtReader::from_bytes(capture)?)))?;
    ensure!(provider.sample_count() == 10);

    let mut ticks = Vec::new();
    while let Some(sample) = provider.advance()? {
        ticks.push(sample.tick);
    }
    ensure!(ticks == (100..110).collect::<Vec<_>>());
    ensure!(provider.is_exhausted());

    ensure!(provider.seek(7));
    let sample = provider.advance()?.context("no sample after seek")?;
    ensure!(sample.index == 7 && sample.value::<f32>("Speed")? == 14.0);
    ensure!(provider.session().context("no description")?.sectors().len() == 3);
    Ok(())
}

#[test]
fn missing_capture_leaves_the_provider_unbound() -> Result<()> {
    let mut provider = SessionDataProvider::new(ProviderConfig::default(), Arc::new(NullSink));
    let err = provider.bind_recorded("does/not/exist.ibt").expect_err("file is missing");
    ensure!(matches!(err, TelemetryError::File { .. }));
    ensure!(matches!(
        provider.advance(),
        Err(TelemetryError::InvalidState { operation: "advance", .. })
    ));
    Ok(())
}
