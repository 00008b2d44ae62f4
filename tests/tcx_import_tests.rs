use hrtrace::import::tcx::parse_tcx;
use hrtrace::{HrTraceError, ImportManager, ParseError};
use std::fs;
use tempfile::TempDir;

const THREE_TRACKPOINTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="Running">
      <Id>2024-06-01T07:30:00Z</Id>
      <Lap StartTime="2024-06-01T07:30:00Z">
        <Track>
          <Trackpoint>
            <Time>2024-06-01T07:30:00Z</Time>
            <HeartRateBpm><Value>100</Value></HeartRateBpm>
          </Trackpoint>
          <Trackpoint>
            <Time>2024-06-01T07:30:05Z</Time>
            <HeartRateBpm><Value>110</Value></HeartRateBpm>
          </Trackpoint>
          <Trackpoint>
            <Time>2024-06-01T07:30:10Z</Time>
            <HeartRateBpm><Value>120</Value></HeartRateBpm>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#;

const NO_HEART_RATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="Biking">
      <Lap StartTime="2024-06-02T08:00:00Z">
        <Track>
          <Trackpoint><Time>2024-06-02T08:00:00Z</Time></Trackpoint>
          <Trackpoint><Time>2024-06-02T08:00:01Z</Time></Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#;

#[test]
fn test_three_trackpoints() {
    let series = parse_tcx(THREE_TRACKPOINTS).unwrap();

    assert_eq!(series.name(), "Running");
    assert_eq!(series.date(), "2024-06-01");
    assert_eq!(series.sample_count(), 3);
    assert_eq!(series.total_duration_seconds(), 10.0);

    let rates: Vec<u16> = series.heart_rates().collect();
    assert_eq!(rates, vec![100, 110, 120]);
}

#[test]
fn test_no_heart_rate_is_an_error() {
    let result = parse_tcx(NO_HEART_RATE);
    assert!(matches!(result, Err(ParseError::NoUsableSamples { .. })));
}

#[test]
fn test_prefixed_namespace() {
    let content = r#"<tcx:TrainingCenterDatabase xmlns:tcx="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
      <tcx:Activities><tcx:Activity Sport="Other">
        <tcx:Lap StartTime="2024-06-03T09:00:00Z"><tcx:Track>
          <tcx:Trackpoint>
            <tcx:Time>2024-06-03T09:00:00Z</tcx:Time>
            <tcx:HeartRateBpm><tcx:Value>101</tcx:Value></tcx:HeartRateBpm>
          </tcx:Trackpoint>
          <tcx:Trackpoint>
            <tcx:Time>2024-06-03T09:00:02.500Z</tcx:Time>
            <tcx:HeartRateBpm><tcx:Value>104</tcx:Value></tcx:HeartRateBpm>
          </tcx:Trackpoint>
        </tcx:Track></tcx:Lap>
      </tcx:Activity></tcx:Activities>
    </tcx:TrainingCenterDatabase>"#;

    let series = parse_tcx(content).unwrap();
    assert_eq!(series.name(), "Other");
    assert_eq!(series.date(), "2024-06-03");
    assert_eq!(series.total_duration_seconds(), 2.5);
}

#[test]
fn test_timestamps_without_offset() {
    let content = r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
      <Activities><Activity Sport="Biking">
        <Id>2024-03-10T08:15:00</Id>
        <Lap StartTime="2024-03-10T08:15:00"><Track>
          <Trackpoint>
            <Time>2024-03-10T08:15:00</Time>
            <HeartRateBpm><Value>115</Value></HeartRateBpm>
          </Trackpoint>
          <Trackpoint>
            <Time>2024-03-10T08:15:04</Time>
            <HeartRateBpm><Value>121</Value></HeartRateBpm>
          </Trackpoint>
        </Track></Lap>
      </Activity></Activities>
    </TrainingCenterDatabase>"#;

    let series = parse_tcx(content).unwrap();
    assert_eq!(series.sample_count(), 2);
    assert_eq!(series.total_duration_seconds(), 4.0);
    assert_eq!(series.date(), "2024-03-10");
}

#[test]
fn test_malformed_xml() {
    let result = parse_tcx("<TrainingCenterDatabase><Activities><Activity>");
    assert!(matches!(result, Err(ParseError::MalformedXml { .. })));
}

#[test]
fn test_import_manager_reads_tcx_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("morning.TCX");
    fs::write(&path, THREE_TRACKPOINTS).unwrap();

    let manager = ImportManager::new();
    assert!(manager.can_import_file(&path));
    assert_eq!(manager.validate_file(&path).unwrap(), 3);

    let series = manager.import_file(&path).unwrap();
    assert_eq!(series.sample_count(), 3);
}

#[test]
fn test_import_manager_surfaces_parse_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.tcx");
    fs::write(&path, NO_HEART_RATE).unwrap();

    let err = ImportManager::new().import_file(&path).unwrap_err();
    assert!(matches!(
        err,
        HrTraceError::Parse(ParseError::NoUsableSamples { .. })
    ));
    assert_eq!(err.user_message(), "No heart rate data found in this file.");
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ride.gpx");
    fs::write(&path, "<gpx/>").unwrap();

    let err = ImportManager::new().import_file(&path).unwrap_err();
    assert!(matches!(
        err,
        HrTraceError::Parse(ParseError::UnsupportedFormat { .. })
    ));
}
