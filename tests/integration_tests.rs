use hrtrace::export::{self, ExportBundle, ExportFormat};
use hrtrace::{
    run_analysis, AnalysisKind, AnalysisOutput, AppConfig, DriftRating, Highlight, ImportManager,
    Insight, Leader, SegmentStats, SeriesComparison, WorkoutAnalysis, WorkoutCatalog,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// End-to-end workflows: load from disk, analyze, compare and export

fn write_recorded_workout(dir: &Path, file: &str, name: &str, hr_at: impl Fn(usize) -> u16) {
    let points: Vec<String> = (0..=120)
        .map(|k| format!(r#"{{"elapsedSeconds": {}, "hr": {}}}"#, k * 10, hr_at(k)))
        .collect();
    let content = format!(
        r#"{{"name": "{}", "date": "2024-05-01", "totalTimeSeconds": 1200, "dataPoints": [{}]}}"#,
        name,
        points.join(",")
    );
    fs::write(dir.join(file), content).unwrap();
}

fn steady(_k: usize) -> u16 {
    140
}

fn intervals(k: usize) -> u16 {
    if k % 30 == 15 {
        180
    } else {
        130
    }
}

fn setup_catalog() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_recorded_workout(dir.path(), "steady.json", "Steady Ride", steady);
    fs::create_dir(dir.path().join("efforts")).unwrap();
    write_recorded_workout(dir.path(), "efforts/intervals.json", "Intervals", intervals);
    fs::write(
        dir.path().join("manifest.json"),
        r#"[
            {"name": "Alex", "date": "2024-05-01", "file": "steady.json"},
            {"name": "Alex", "date": "2024-05-03", "file": "efforts/intervals.json"}
        ]"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_catalog_to_analysis_workflow() {
    let dir = setup_catalog();
    let manager = ImportManager::new();
    let catalog = WorkoutCatalog::load(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(catalog.len(), 2);

    let steady = catalog.load_series(&catalog.entries()[0], &manager).unwrap();
    assert_eq!(steady.name(), "Steady Ride");
    assert_eq!(steady.sample_count(), 121);
    assert_eq!(steady.total_duration_seconds(), 1200.0);

    let analysis = WorkoutAnalysis::analyze(&steady, &AppConfig::default()).unwrap();

    // 140 bpm sits in Z3 (133-152) for a 190 max
    let z3 = analysis.zone_time.zone(2).unwrap();
    assert_eq!(z3.seconds, 1200.0);
    assert_eq!(z3.percent, 100);

    let drift = analysis.cardiac_drift.as_available().unwrap();
    assert_eq!(drift.drift_percent, 0.0);
    assert_eq!(drift.rating, DriftRating::Excellent);

    let effort = analysis.sustained_effort.as_available().unwrap();
    assert_eq!(effort.duration_seconds, 1200.0);
    assert_eq!(effort.average_hr, 140);

    let one_minute = analysis.peak_intervals.one_minute.as_available().unwrap();
    assert_eq!(one_minute.average_hr, 140);
    assert!(analysis.peak_intervals.five_minutes.is_available());

    assert_eq!(analysis.trimp.score, 60);
    assert_eq!(analysis.summary.avg_hr, 140);
}

#[test]
fn test_interval_workout_recovery() {
    let dir = setup_catalog();
    let manager = ImportManager::new();
    let series = manager
        .import_file(&dir.path().join("efforts/intervals.json"))
        .unwrap();

    let output = run_analysis(AnalysisKind::Recovery, &series, &AppConfig::default()).unwrap();
    let AnalysisOutput::Recovery(Insight::Available(recovery)) = &output else {
        panic!("expected recovery measurements, got {:?}", output);
    };

    assert_eq!(recovery.peak_count, 4);
    assert_eq!(recovery.average_drop, 50);
    assert_eq!(recovery.best_drop, 50);
    assert_eq!(output.highlight_ranges().len(), 4);
    assert_eq!(output.highlight_ranges()[0].start_seconds, 150.0);
}

#[test]
fn test_compare_two_workouts() {
    let dir = setup_catalog();
    let manager = ImportManager::new();
    let steady = manager.import_file(&dir.path().join("steady.json")).unwrap();
    let efforts = manager
        .import_file(&dir.path().join("efforts/intervals.json"))
        .unwrap();

    let comparison = SeriesComparison::new(&steady, Some(&efforts), 160);
    let leaders = comparison.leaders.unwrap();

    assert_eq!(comparison.first_name, "Steady Ride");
    assert_eq!(comparison.second_name.as_deref(), Some("Intervals"));
    assert_eq!(leaders.max_hr, Leader::Second);
    assert_eq!(leaders.duration, Leader::Tie);
    assert_eq!(leaders.high_intensity, Leader::Second);
}

#[test]
fn test_segment_of_resampled_chart() {
    let dir = setup_catalog();
    let series = ImportManager::new()
        .import_file(&dir.path().join("steady.json"))
        .unwrap();
    let config = AppConfig::default();
    let grid = config.time_grid_for(&series).unwrap();
    let resampled = grid.resample(&series);
    assert_eq!(resampled.len(), 41);

    let stats = SegmentStats::compute(
        &resampled,
        &grid,
        grid.index_for(300.0),
        grid.index_for(600.0),
        &config.zone_model().unwrap(),
    )
    .unwrap();
    assert_eq!(stats.start_label, "5:00");
    assert_eq!(stats.end_label, "10:00");
    assert_eq!(stats.count, 11);
    assert_eq!(stats.average_hr, 140);
    assert_eq!(stats.zone_percent(2), 100);
}

#[test]
fn test_export_all_formats() {
    let dir = setup_catalog();
    let series = ImportManager::new()
        .import_file(&dir.path().join("steady.json"))
        .unwrap();
    let config = AppConfig::default();
    let grid = config.time_grid_for(&series).unwrap();
    let analysis = WorkoutAnalysis::analyze(&series, &config).unwrap();
    let bundle = ExportBundle {
        series: &series,
        grid: &grid,
        analysis: &analysis,
    };

    let out_dir = dir.path().join("exports");
    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Text] {
        let path = out_dir.join(format!("steady.{}", format.extension()));
        export::export_to_file(&path, format, &bundle).unwrap();
        assert!(path.exists());
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("steady.json")).unwrap()).unwrap();
    assert_eq!(json["name"], "Steady Ride");
    assert_eq!(json["trimp"]["score"], 60);

    let csv = fs::read_to_string(out_dir.join("steady.csv")).unwrap();
    assert_eq!(csv.lines().count(), 42);
    assert_eq!(csv.lines().nth(1), Some("0,0:00,140"));

    let text = fs::read_to_string(out_dir.join("steady.txt")).unwrap();
    assert!(text.contains("HEART RATE REPORT: Steady Ride"));
}

#[test]
fn test_config_changes_zone_model() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.set_value("zones.max_hr", "200").unwrap();
    config.save_to_file(&path).unwrap();

    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.zones.max_hr, 200);
    assert_eq!(loaded.zone_model().unwrap().max_hr(), 200);
}

#[test]
fn test_missing_workout_file() {
    let dir = TempDir::new().unwrap();
    let result = ImportManager::new().import_file(&dir.path().join("gone.json"));
    assert!(matches!(result, Err(hrtrace::HrTraceError::Io(_))));
}
