use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use crate::error::ParseError;
use crate::import::ImportFormat;
use crate::models::{Sample, Series};

const DEFAULT_ACTIVITY_NAME: &str = "Workout";

/// TCX (Training Center XML) importer
pub struct TcxImporter;

impl TcxImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TcxImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for TcxImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("tcx"))
            .unwrap_or(false)
    }

    fn parse_str(&self, content: &str) -> Result<Series, ParseError> {
        parse_tcx(content)
    }

    fn get_format_name(&self) -> &'static str {
        "TCX"
    }
}

/// Trackpoint as read from the file, before validation
#[derive(Debug, Default)]
struct RawTrackpoint {
    time: Option<String>,
    heart_rate: Option<String>,
}

/// Everything pulled out of the first `<Activity>` element
#[derive(Debug, Default)]
struct RawActivity {
    sport: Option<String>,
    id: Option<String>,
    lap_start: Option<String>,
    trackpoints: Vec<RawTrackpoint>,
}

/// Parse TCX content into a series.
///
/// Elements are matched by local name, so both default-namespace and
/// prefixed documents are accepted. Trackpoints missing a timestamp or a
/// heart rate are skipped.
pub fn parse_tcx(content: &str) -> Result<Series, ParseError> {
    let activity = read_activity(content)?;
    build_series(activity)
}

fn read_activity(content: &str) -> Result<RawActivity, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut activity = RawActivity::default();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<RawTrackpoint> = None;
    let mut activities_seen = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                match name.as_str() {
                    "Activity" => {
                        activities_seen += 1;
                        if activities_seen == 1 {
                            activity.sport = attribute(e, "Sport");
                        }
                    }
                    "Lap" if in_first_activity(&path, activities_seen) => {
                        if activity.lap_start.is_none() {
                            activity.lap_start = attribute(e, "StartTime");
                        }
                    }
                    "Trackpoint" if in_first_activity(&path, activities_seen) => {
                        current = Some(RawTrackpoint::default());
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                // <Trackpoint/> carries nothing usable; only lap attributes matter here
                if local_name(e) == "Lap"
                    && in_first_activity(&path, activities_seen)
                    && activity.lap_start.is_none()
                {
                    activity.lap_start = attribute(e, "StartTime");
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| ParseError::MalformedXml {
                    reason: format!("failed to unescape text: {}", err),
                })?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    buf.clear();
                    continue;
                }

                if let Some(point) = current.as_mut() {
                    if ends_with(&path, &["Trackpoint", "Time"]) {
                        point.time = Some(text);
                    } else if ends_with(&path, &["Trackpoint", "HeartRateBpm", "Value"]) {
                        point.heart_rate = Some(text);
                    }
                } else if activities_seen == 1
                    && ends_with(&path, &["Activity", "Id"])
                    && activity.id.is_none()
                {
                    activity.id = Some(text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "Trackpoint" {
                    if let Some(point) = current.take() {
                        activity.trackpoints.push(point);
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::MalformedXml {
                    reason: format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    ),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(ParseError::MalformedXml {
            reason: format!("unexpected end of document inside <{}>", path.join("/")),
        });
    }

    Ok(activity)
}

fn build_series(activity: RawActivity) -> Result<Series, ParseError> {
    let total_points = activity.trackpoints.len();
    let mut origin: Option<DateTime<FixedOffset>> = None;
    let mut samples = Vec::with_capacity(total_points);

    for (index, point) in activity.trackpoints.iter().enumerate() {
        let (Some(time), Some(hr)) = (point.time.as_deref(), point.heart_rate.as_deref()) else {
            tracing::debug!(trackpoint = index, "skipping trackpoint without time or heart rate");
            continue;
        };

        let Some(timestamp) = parse_timestamp(time) else {
            tracing::debug!(trackpoint = index, time, "skipping trackpoint with invalid timestamp");
            continue;
        };

        let heart_rate = match hr.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 1.0 && value <= f64::from(u16::MAX) => {
                value.round() as u16
            }
            _ => {
                tracing::debug!(trackpoint = index, hr, "skipping trackpoint with invalid heart rate");
                continue;
            }
        };

        let start = *origin.get_or_insert(timestamp);
        let elapsed_ms = (timestamp - start).num_milliseconds();
        samples.push(Sample::new(elapsed_ms as f64 / 1000.0, heart_rate));
    }

    if samples.is_empty() {
        return Err(ParseError::NoUsableSamples {
            format: "TCX".to_string(),
        });
    }

    let name = activity
        .sport
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ACTIVITY_NAME.to_string());

    let first_valid_time = activity
        .trackpoints
        .iter()
        .find_map(|p| p.time.as_deref().filter(|t| parse_timestamp(t).is_some()));
    let date = activity
        .id
        .as_deref()
        .or(activity.lap_start.as_deref())
        .or(first_valid_time)
        .map(calendar_day)
        .unwrap_or_default();

    tracing::info!(
        name = %name,
        date = %date,
        samples = samples.len(),
        skipped = total_points - samples.len(),
        "parsed TCX activity"
    );

    Series::new(name, date, samples)
}

/// Parse a trackpoint `xsd:dateTime`; timestamps without an offset are UTC
fn parse_timestamp(time: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(time) {
        return Some(timestamp);
    }
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive).into())
}

/// Calendar-day portion of an ISO-8601 timestamp
fn calendar_day(timestamp: &str) -> String {
    timestamp
        .split('T')
        .next()
        .unwrap_or(timestamp)
        .trim()
        .to_string()
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn in_first_activity(path: &[String], activities_seen: usize) -> bool {
    activities_seen == 1 && path.iter().any(|p| p == "Activity")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trackpoint(time: &str, hr: Option<u16>) -> String {
        let hr_xml = hr
            .map(|v| format!("<HeartRateBpm><Value>{}</Value></HeartRateBpm>", v))
            .unwrap_or_default();
        format!("<Trackpoint><Time>{}</Time>{}</Trackpoint>", time, hr_xml)
    }

    fn tcx(sport: &str, trackpoints: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="{sport}">
      <Id>2024-03-10T08:15:00Z</Id>
      <Lap StartTime="2024-03-10T08:15:00Z">
        <Track>{points}</Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#,
            sport = sport,
            points = trackpoints.concat()
        )
    }

    #[test]
    fn test_parse_minimal_tcx() {
        let content = tcx(
            "Running",
            &[
                trackpoint("2024-03-10T08:15:00Z", Some(100)),
                trackpoint("2024-03-10T08:15:05Z", Some(110)),
                trackpoint("2024-03-10T08:15:10Z", Some(120)),
            ],
        );

        let series = parse_tcx(&content).unwrap();
        assert_eq!(series.name(), "Running");
        assert_eq!(series.date(), "2024-03-10");
        assert_eq!(series.sample_count(), 3);
        assert_eq!(series.total_duration_seconds(), 10.0);
        assert_eq!(series.heart_rates().collect::<Vec<_>>(), vec![100, 110, 120]);
    }

    #[test]
    fn test_elapsed_time_starts_at_first_valid_trackpoint() {
        let content = tcx(
            "Biking",
            &[
                trackpoint("2024-03-10T08:15:00Z", None),
                trackpoint("2024-03-10T08:15:04Z", Some(130)),
                trackpoint("2024-03-10T08:15:09.500Z", Some(131)),
            ],
        );

        let series = parse_tcx(&content).unwrap();
        assert_eq!(series.sample_count(), 2);
        assert_eq!(series.samples()[0].elapsed_seconds, 0.0);
        assert_eq!(series.samples()[1].elapsed_seconds, 5.5);
    }

    #[test]
    fn test_rejects_trackpoints_without_heart_rate() {
        let content = tcx(
            "Running",
            &[
                trackpoint("2024-03-10T08:15:00Z", None),
                trackpoint("2024-03-10T08:15:05Z", None),
            ],
        );

        let result = parse_tcx(&content);
        assert!(matches!(result, Err(ParseError::NoUsableSamples { .. })));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let result = parse_tcx("<TrainingCenterDatabase><Activities></Activity>");
        assert!(matches!(result, Err(ParseError::MalformedXml { .. })));

        let result = parse_tcx("<TrainingCenterDatabase><Activities>");
        assert!(matches!(result, Err(ParseError::MalformedXml { .. })));
    }

    #[test]
    fn test_prefixed_namespace() {
        let content = r#"<tcx:TrainingCenterDatabase xmlns:tcx="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <tcx:Activities>
    <tcx:Activity Sport="Other">
      <tcx:Id>2023-11-02T18:00:00+01:00</tcx:Id>
      <tcx:Lap StartTime="2023-11-02T18:00:00+01:00"><tcx:Track>
        <tcx:Trackpoint><tcx:Time>2023-11-02T18:00:00+01:00</tcx:Time><tcx:HeartRateBpm><tcx:Value>98</tcx:Value></tcx:HeartRateBpm></tcx:Trackpoint>
        <tcx:Trackpoint><tcx:Time>2023-11-02T18:00:02+01:00</tcx:Time><tcx:HeartRateBpm><tcx:Value>99</tcx:Value></tcx:HeartRateBpm></tcx:Trackpoint>
      </tcx:Track></tcx:Lap>
    </tcx:Activity>
  </tcx:Activities>
</tcx:TrainingCenterDatabase>"#;

        let series = parse_tcx(content).unwrap();
        assert_eq!(series.name(), "Other");
        assert_eq!(series.date(), "2023-11-02");
        assert_eq!(series.total_duration_seconds(), 2.0);
    }

    #[test]
    fn test_missing_sport_and_id_fall_back() {
        let content = format!(
            "<TrainingCenterDatabase><Activities><Activity><Lap><Track>{}</Track></Lap></Activity></Activities></TrainingCenterDatabase>",
            trackpoint("2022-06-01T06:30:00Z", Some(120))
        );

        let series = parse_tcx(&content).unwrap();
        assert_eq!(series.name(), "Workout");
        assert_eq!(series.date(), "2022-06-01");
    }

    #[test]
    fn test_skips_unparsable_values() {
        let content = tcx(
            "Running",
            &[
                trackpoint("not-a-time", Some(100)),
                "<Trackpoint><Time>2024-03-10T08:15:01Z</Time><HeartRateBpm><Value>abc</Value></HeartRateBpm></Trackpoint>".to_string(),
                trackpoint("2024-03-10T08:15:02Z", Some(140)),
            ],
        );

        let series = parse_tcx(&content).unwrap();
        assert_eq!(series.sample_count(), 1);
        assert_eq!(series.first_sample().heart_rate, 140);
    }

    #[test]
    fn test_only_first_activity_is_read() {
        let content = format!(
            "<TrainingCenterDatabase><Activities>\
             <Activity Sport=\"Running\"><Id>2024-01-01T00:00:00Z</Id><Lap><Track>{}</Track></Lap></Activity>\
             <Activity Sport=\"Biking\"><Id>2024-01-02T00:00:00Z</Id><Lap><Track>{}</Track></Lap></Activity>\
             </Activities></TrainingCenterDatabase>",
            trackpoint("2024-01-01T00:00:00Z", Some(120)),
            trackpoint("2024-01-02T00:00:00Z", Some(150))
        );

        let series = parse_tcx(&content).unwrap();
        assert_eq!(series.name(), "Running");
        assert_eq!(series.sample_count(), 1);
        assert_eq!(series.date(), "2024-01-01");
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let naive = parse_timestamp("2024-03-10T08:15:00").unwrap();
        let zulu = parse_timestamp("2024-03-10T08:15:00Z").unwrap();
        assert_eq!(naive, zulu);

        let fractional = parse_timestamp("2024-03-10T08:15:01.250").unwrap();
        assert_eq!((fractional - zulu).num_milliseconds(), 1250);
        assert!(parse_timestamp("2024-03-10").is_none());
    }

    #[test]
    fn test_can_import_by_extension() {
        let importer = TcxImporter::new();
        assert!(importer.can_import(Path::new("morning_run.tcx")));
        assert!(importer.can_import(Path::new("MORNING.TCX")));
        assert!(!importer.can_import(Path::new("workout.json")));
    }
}
