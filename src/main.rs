use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};

use hrtrace::export::{self, ExportBundle, ExportFormat};
use hrtrace::logging::init_logging;
use hrtrace::recovery::DEFAULT_TOP_RECOVERIES;
use hrtrace::{
    format_time, run_analysis, AnalysisKind, AnalysisOutput, AppConfig, HrTraceError, Highlight,
    ImportManager, Insight, Leader, SegmentStats, Series, SeriesComparison, WorkoutAnalysis,
    WorkoutCatalog, ZoneModel,
};

/// hrtrace - Heart Rate Workout Analysis CLI
///
/// Reads heart-rate workouts from TCX or JSON files and reports zone time,
/// recovery, peak intervals, cardiac drift, sustained aerobic effort and
/// training load.
#[derive(Parser)]
#[command(name = "hrtrace")]
#[command(version)]
#[command(about = "Heart rate workout analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a workout file
    Analyze {
        /// Workout file (.tcx or .json)
        file: PathBuf,

        /// Run a single analysis (zone-time, recovery, peak-intervals,
        /// cardiac-drift, sustained-effort, trimp, summary)
        #[arg(short, long)]
        analysis: Option<AnalysisKind>,

        /// Write the full analysis to a file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (json, csv, text); guessed from the output extension
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,

        /// Also print chart highlight ranges
        #[arg(long)]
        highlights: bool,
    },

    /// Compare summary statistics of one or two workouts
    Compare {
        /// First workout file
        first: PathBuf,

        /// Optional second workout file
        second: Option<PathBuf>,
    },

    /// Resample a workout onto the chart grid and print it as CSV
    Resample {
        file: PathBuf,

        /// Grid step in seconds (defaults to the configured step)
        #[arg(short, long)]
        step: Option<f64>,

        /// Output CSV path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the recorded samples instead of the grid
        #[arg(long)]
        raw: bool,
    },

    /// Statistics for a time range of the resampled chart
    Segment {
        file: PathBuf,

        /// Range start in seconds
        #[arg(long)]
        from: f64,

        /// Range end in seconds
        #[arg(long)]
        to: f64,
    },

    /// Show heart rate zone boundaries
    Zones {
        /// Maximum heart rate (defaults to the configured value)
        #[arg(short, long)]
        max_hr: Option<u16>,
    },

    /// List the workouts in a manifest
    Catalog {
        /// Path to manifest.json
        manifest: PathBuf,

        /// Load every workout and report sample counts
        #[arg(long)]
        validate: bool,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    if let Err(err) = run(cli.command, config, &config_path) {
        if let Some(hr_err) = err.downcast_ref::<HrTraceError>() {
            tracing::error!(severity = ?hr_err.severity(), error = %hr_err, "command failed");
            eprintln!("{} {}", "Error:".red().bold(), hr_err.user_message());
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}

fn run(command: Commands, mut config: AppConfig, config_path: &Path) -> Result<()> {
    let manager = ImportManager::new();

    match command {
        Commands::Analyze {
            file,
            analysis,
            output,
            format,
            highlights,
        } => {
            let series = load_series(&manager, &file)?;

            if let Some(output) = output {
                let format = format
                    .or_else(|| ExportFormat::from_path(&output))
                    .unwrap_or(ExportFormat::Json);
                let grid = config.time_grid_for(&series).map_err(HrTraceError::from)?;
                let analysis = WorkoutAnalysis::analyze(&series, &config)?;
                let bundle = ExportBundle {
                    series: &series,
                    grid: &grid,
                    analysis: &analysis,
                };
                export::export_to_file(&output, format, &bundle).map_err(HrTraceError::from)?;
                println!(
                    "{} {}",
                    "✓ Analysis written to".green(),
                    output.display()
                );
                return Ok(());
            }

            if let Some(format) = format {
                let grid = config.time_grid_for(&series).map_err(HrTraceError::from)?;
                let analysis = WorkoutAnalysis::analyze(&series, &config)?;
                let bundle = ExportBundle {
                    series: &series,
                    grid: &grid,
                    analysis: &analysis,
                };
                export::write_export(io::stdout().lock(), format, &bundle)
                    .map_err(HrTraceError::from)?;
                return Ok(());
            }

            print_header(&series);
            let kinds: Vec<AnalysisKind> = match analysis {
                Some(kind) => vec![kind],
                None => AnalysisKind::ALL.to_vec(),
            };
            for kind in kinds {
                let result = run_analysis(kind, &series, &config)?;
                print_output(&result);
                if highlights {
                    print_highlights(&result, &series, &config)?;
                }
                println!();
            }
        }

        Commands::Compare { first, second } => {
            let first = load_series(&manager, &first)?;
            let second = second
                .map(|path| load_series(&manager, &path))
                .transpose()?;
            let comparison = SeriesComparison::new(
                &first,
                second.as_ref(),
                config.comparison.high_intensity_bpm,
            );
            print_comparison(&comparison, config.comparison.high_intensity_bpm);
        }

        Commands::Resample {
            file,
            step,
            output,
            raw,
        } => {
            let series = load_series(&manager, &file)?;
            if let Some(step) = step {
                config.chart.resample_step_seconds = step;
            }
            let grid = config.time_grid_for(&series).map_err(HrTraceError::from)?;

            let write = |writer: &mut dyn io::Write| {
                if raw {
                    export::csv::write_samples(writer, &series)
                } else {
                    export::csv::write_resampled(writer, &series, &grid)
                }
            };

            match output {
                Some(path) => {
                    let mut file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write(&mut file).map_err(HrTraceError::from)?;
                    let rows = if raw { series.sample_count() } else { grid.len() };
                    println!(
                        "{} {} rows to {}",
                        "✓ Wrote".green(),
                        rows,
                        path.display()
                    );
                }
                None => {
                    write(&mut io::stdout().lock()).map_err(HrTraceError::from)?;
                }
            }
        }

        Commands::Segment { file, from, to } => {
            let series = load_series(&manager, &file)?;
            let zones = config.zone_model().map_err(HrTraceError::from)?;
            let grid = config.time_grid_for(&series).map_err(HrTraceError::from)?;
            let resampled = grid.resample(&series);

            let stats = SegmentStats::compute(
                &resampled,
                &grid,
                grid.index_for(from),
                grid.index_for(to),
                &zones,
            );
            match stats {
                Some(stats) => print_segment(&stats),
                None => println!("{}", "No heart rate data in the selected range.".yellow()),
            }
        }

        Commands::Zones { max_hr } => {
            let model = match max_hr {
                Some(max_hr) => ZoneModel::new(max_hr).map_err(HrTraceError::from)?,
                None => config.zone_model().map_err(HrTraceError::from)?,
            };
            print_zones(&model);
        }

        Commands::Catalog { manifest, validate } => {
            let catalog = WorkoutCatalog::load(&manifest)?;
            if catalog.is_empty() {
                println!("{}", "Manifest lists no workouts.".yellow());
                return Ok(());
            }

            if !validate {
                println!("{}", "Available workouts:".bold());
                for entry in catalog.entries() {
                    println!("  {}  {}", entry.display_name(), entry.file.dimmed());
                }
                return Ok(());
            }

            let pb = ProgressBar::new(catalog.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );

            let mut results = Vec::with_capacity(catalog.len());
            for entry in catalog.entries() {
                pb.set_message(entry.file.clone());
                results.push((entry, catalog.load_series(entry, &manager)));
                pb.inc(1);
            }
            pb.finish_and_clear();

            let mut failures = 0;
            for (entry, result) in results {
                match result {
                    Ok(series) => println!(
                        "  {} {}  {} samples, {}",
                        "✓".green(),
                        entry.display_name(),
                        series.sample_count(),
                        format_time(series.total_duration_seconds())
                    ),
                    Err(err) => {
                        failures += 1;
                        println!(
                            "  {} {}  {}",
                            "✗".red(),
                            entry.display_name(),
                            err.user_message()
                        );
                    }
                }
            }

            if failures > 0 {
                println!("{}", format!("{} workout(s) failed to load", failures).red());
            } else {
                println!("{}", "✓ All workouts loaded".green());
            }
        }

        Commands::Config {
            list,
            set,
            get,
            init,
        } => {
            if init {
                config.save_to_file(config_path)?;
                println!(
                    "{} {}",
                    "✓ Wrote configuration to".green(),
                    config_path.display()
                );
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got '{}'", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                match config.get_value(&key) {
                    Some(value) => println!("{}", value),
                    None => anyhow::bail!("Unknown configuration key: {}", key),
                }
            } else if list {
                println!("{} {}", "Configuration:".bold(), config_path.display().to_string().dimmed());
                for key in AppConfig::keys() {
                    if let Some(value) = config.get_value(key) {
                        println!("  {} = {}", key, value);
                    }
                }
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn load_series(manager: &ImportManager, path: &Path) -> Result<Series> {
    let series = manager.import_file(path)?;
    tracing::info!(
        file = %path.display(),
        samples = series.sample_count(),
        "workout loaded"
    );
    Ok(series)
}

fn print_header(series: &Series) {
    println!("{}", series.name().bold());
    if !series.date().is_empty() {
        println!("  Date: {}", series.date());
    }
    println!(
        "  {} samples over {}",
        series.sample_count(),
        format_time(series.total_duration_seconds())
    );
    println!();
}

fn section(title: &str) {
    println!("{}", title.cyan().bold());
}

fn not_applicable(reason: &str) {
    println!("  {}", reason.dimmed());
}

fn print_output(output: &AnalysisOutput) {
    section(output.kind().title());

    match output {
        AnalysisOutput::Summary(stats) => {
            println!("  Avg Heart Rate:   {} bpm", stats.avg_hr);
            println!("  Max Heart Rate:   {} bpm", stats.max_hr);
            println!("  Time to Peak:     {}", format_time(stats.time_to_peak_seconds));
            println!("  Duration:         {}", format_time(stats.duration_seconds));
            println!("  High Intensity:   {}", format_time(stats.high_intensity_seconds));
        }
        AnalysisOutput::ZoneTime(breakdown) => {
            for zone in breakdown.chart_segments() {
                let line = format!(
                    "  {:<4} {:<10} {:>8}  {:>3}%",
                    zone.class.short_label(),
                    zone.class.label(),
                    format_time(zone.seconds),
                    zone.percent
                );
                if zone.seconds > 0.0 {
                    println!("{}", line);
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
        AnalysisOutput::Recovery(Insight::Available(recovery)) => {
            println!("  Avg 60s Recovery: {} bpm drop", recovery.average_drop);
            println!("  Best Recovery:    {} bpm drop", recovery.best_drop);
            println!("  Peaks Analyzed:   {}", recovery.peak_count);
            for m in recovery.top_recoveries(DEFAULT_TOP_RECOVERIES) {
                println!(
                    "    {:>6}  {} bpm -> {} bpm  ({} bpm)",
                    format_time(m.peak_time),
                    m.peak_hr,
                    m.hr_after_60s,
                    m.drop
                );
            }
        }
        AnalysisOutput::PeakIntervals(peaks) => {
            for (title, interval) in [
                ("Hardest 1 Minute", &peaks.one_minute),
                ("Hardest 5 Minutes", &peaks.five_minutes),
            ] {
                match interval {
                    Insight::Available(i) => println!(
                        "  {:<18} {} - {}  avg {} bpm, max {} bpm",
                        title,
                        format_time(i.start_time),
                        format_time(i.end_time),
                        i.average_hr,
                        i.max_hr
                    ),
                    Insight::NotApplicable(gap) => {
                        println!("  {:<18} {}", title, gap.reason.dimmed())
                    }
                }
            }
        }
        AnalysisOutput::CardiacDrift(Insight::Available(drift)) => {
            let rating = drift.rating.to_string();
            let rating = match drift.rating {
                hrtrace::DriftRating::Excellent => rating.green(),
                hrtrace::DriftRating::Normal => rating.yellow(),
                hrtrace::DriftRating::NeedsWork => rating.red(),
            };
            println!("  Drift:            {:+.1}% {}", drift.drift_percent, rating);
            println!("  1st Half Avg:     {:.0} bpm", drift.first_half_avg.round());
            println!("  2nd Half Avg:     {:.0} bpm", drift.second_half_avg.round());
            println!("  HR Change:        {:+.1} bpm", drift.drift_bpm);
        }
        AnalysisOutput::SustainedEffort(Insight::Available(effort)) => {
            println!(
                "  Duration:         {} ({})",
                format_time(effort.duration_seconds),
                effort.rating
            );
            println!(
                "  Time Range:       {} - {}",
                format_time(effort.start_time),
                format_time(effort.end_time)
            );
            println!("  Avg HR:           {} bpm", effort.average_hr);
            println!(
                "  Target Zone:      Z2-Z3 ({}-{} bpm)",
                effort.band_min, effort.band_max
            );
        }
        AnalysisOutput::Trimp(trimp) => {
            println!("  Score:            {} ({})", trimp.score, trimp.rating);
            for row in &trimp.breakdown {
                let line = format!(
                    "    {:<3} {:>6.1}m x {}  {:>4}",
                    row.zone.short_label, row.minutes, row.weight, row.contribution
                );
                if row.contribution == 0 {
                    println!("{}", line.dimmed());
                } else {
                    println!("{}", line);
                }
            }
        }
        AnalysisOutput::Recovery(Insight::NotApplicable(gap))
        | AnalysisOutput::CardiacDrift(Insight::NotApplicable(gap))
        | AnalysisOutput::SustainedEffort(Insight::NotApplicable(gap)) => {
            not_applicable(&gap.reason)
        }
    }
}

fn print_highlights(output: &AnalysisOutput, series: &Series, config: &AppConfig) -> Result<()> {
    let ranges = output.highlight_ranges();
    if ranges.is_empty() {
        return Ok(());
    }

    let grid = config.time_grid_for(series).map_err(HrTraceError::from)?;
    let labels = grid.labels();
    for range in ranges {
        let span = grid.span_for(&range);
        println!(
            "  {} {} - {}  (chart {} - {})",
            "▸".magenta(),
            format_time(range.start_seconds),
            format_time(range.end_seconds),
            labels.get(span.start_index).map_or("?", String::as_str),
            labels.get(span.end_index).map_or("?", String::as_str)
        );
    }
    Ok(())
}

fn print_comparison(comparison: &SeriesComparison, high_intensity_bpm: u16) {
    let first = &comparison.first;
    let Some(second) = &comparison.second else {
        section(&comparison.first_name);
        println!("  Avg Heart Rate:   {} bpm", first.avg_hr);
        println!("  Max Heart Rate:   {} bpm", first.max_hr);
        println!("  Time to Peak:     {}", format_time(first.time_to_peak_seconds));
        println!("  Duration:         {}", format_time(first.duration_seconds));
        println!(
            "  Time >= {} bpm:  {}",
            high_intensity_bpm,
            format_time(first.high_intensity_seconds)
        );
        return;
    };

    let second_name = comparison.second_name.as_deref().unwrap_or("Second");
    println!(
        "{:<18} {:>14} {:>14}",
        "",
        comparison.first_name.bold(),
        second_name.bold()
    );

    let Some(leaders) = &comparison.leaders else {
        return;
    };
    let rows = [
        ("Avg Heart Rate", format!("{} bpm", first.avg_hr), format!("{} bpm", second.avg_hr), leaders.avg_hr),
        ("Max Heart Rate", format!("{} bpm", first.max_hr), format!("{} bpm", second.max_hr), leaders.max_hr),
        (
            "Time to Peak",
            format_time(first.time_to_peak_seconds),
            format_time(second.time_to_peak_seconds),
            leaders.time_to_peak,
        ),
        (
            "Duration",
            format_time(first.duration_seconds),
            format_time(second.duration_seconds),
            leaders.duration,
        ),
        (
            "High Intensity",
            format_time(first.high_intensity_seconds),
            format_time(second.high_intensity_seconds),
            leaders.high_intensity,
        ),
    ];

    for (label, a, b, leader) in rows {
        let (a, b) = match leader {
            Leader::First => (format!("{:>14}", a).green(), format!("{:>14}", b).normal()),
            Leader::Second => (format!("{:>14}", a).normal(), format!("{:>14}", b).green()),
            Leader::Tie => (format!("{:>14}", a).normal(), format!("{:>14}", b).normal()),
        };
        println!("{:<18} {} {}", label, a, b);
    }
}

fn print_segment(stats: &SegmentStats) {
    section("Segment");
    println!("  Range:            {} - {}", stats.start_label, stats.end_label);
    println!("  Avg HR:           {} bpm", stats.average_hr);
    println!("  Max HR:           {} bpm", stats.max_hr);
    println!("  Min HR:           {} bpm", stats.min_hr);
    let zones: Vec<String> = hrtrace::HR_ZONES
        .iter()
        .map(|zone| format!("{}: {}%", zone.short_label, stats.zone_percent(zone.index)))
        .collect();
    println!("  Zones:            {}", zones.join("  "));
}

fn print_zones(model: &ZoneModel) {
    section(&format!("Heart rate zones (max HR {} bpm)", model.max_hr()));
    for band in model.bands() {
        println!(
            "  {:<3} {:<10} {:>3}-{:<3} bpm  ({:.0}-{:.0}%)",
            band.zone.short_label,
            band.zone.name,
            band.min_bpm,
            band.max_bpm,
            band.zone.min_fraction * 100.0,
            band.zone.max_fraction * 100.0
        );
    }
}
