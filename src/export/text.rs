use std::io::Write;

use crate::analysis::WorkoutAnalysis;
use crate::error::ExportError;
use crate::models::{Insight, Interval};
use crate::recovery::DEFAULT_TOP_RECOVERIES;
use crate::resample::format_time;

/// Write a human-readable report of a workout analysis
pub fn write_report<W: Write>(mut out: W, analysis: &WorkoutAnalysis) -> Result<(), ExportError> {
    writeln!(out, "============================================================")?;
    writeln!(out, "HEART RATE REPORT: {}", analysis.name)?;
    writeln!(out, "============================================================")?;
    if !analysis.date.is_empty() {
        writeln!(out, "Date: {}", analysis.date)?;
    }
    writeln!(out, "Samples: {}", analysis.sample_count)?;
    writeln!(out, "Max HR setting: {} bpm", analysis.max_hr_setting)?;
    writeln!(out)?;

    let summary = &analysis.summary;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "------------------------------------------------------------")?;
    writeln!(out, "Avg Heart Rate:    {} bpm", summary.avg_hr)?;
    writeln!(out, "Max Heart Rate:    {} bpm", summary.max_hr)?;
    writeln!(out, "Time to Peak:      {}", format_time(summary.time_to_peak_seconds))?;
    writeln!(out, "Duration:          {}", format_time(summary.duration_seconds))?;
    writeln!(out, "High Intensity:    {}", format_time(summary.high_intensity_seconds))?;
    writeln!(out)?;

    writeln!(out, "TIME IN ZONES")?;
    writeln!(out, "------------------------------------------------------------")?;
    for zone in &analysis.zone_time.zones {
        writeln!(
            out,
            "{:<4} {:<10} {:>8}  {:>3}%",
            zone.class.short_label(),
            zone.class.label(),
            format_time(zone.seconds),
            zone.percent
        )?;
    }
    let below = &analysis.zone_time.below_zones;
    if below.seconds > 0.0 {
        writeln!(
            out,
            "{:<4} {:<10} {:>8}  {:>3}%",
            below.class.short_label(),
            below.class.label(),
            format_time(below.seconds),
            below.percent
        )?;
    }
    writeln!(out)?;

    writeln!(out, "HEART RATE RECOVERY")?;
    writeln!(out, "------------------------------------------------------------")?;
    match &analysis.recovery {
        Insight::Available(recovery) => {
            writeln!(out, "Avg 60s Recovery:  {} bpm drop", recovery.average_drop)?;
            writeln!(out, "Best Recovery:     {} bpm drop", recovery.best_drop)?;
            writeln!(out, "Peaks Analyzed:    {}", recovery.peak_count)?;
            writeln!(out, "  Peak Time  Peak HR  After 60s  Drop")?;
            for m in recovery.top_recoveries(DEFAULT_TOP_RECOVERIES) {
                writeln!(
                    out,
                    "  {:>9}  {:>7}  {:>9}  {:>4}",
                    format_time(m.peak_time),
                    m.peak_hr,
                    m.hr_after_60s,
                    m.drop
                )?;
            }
        }
        Insight::NotApplicable(gap) => writeln!(out, "{}", gap.reason)?,
    }
    writeln!(out)?;

    writeln!(out, "PEAK INTERVALS")?;
    writeln!(out, "------------------------------------------------------------")?;
    write_interval(&mut out, "Hardest 1 Minute", &analysis.peak_intervals.one_minute)?;
    write_interval(&mut out, "Hardest 5 Minutes", &analysis.peak_intervals.five_minutes)?;
    writeln!(out)?;

    writeln!(out, "CARDIAC DRIFT")?;
    writeln!(out, "------------------------------------------------------------")?;
    match &analysis.cardiac_drift {
        Insight::Available(drift) => {
            writeln!(out, "Drift:             {:+.1}% ({})", drift.drift_percent, drift.rating)?;
            writeln!(out, "1st Half Avg:      {:.0} bpm", drift.first_half_avg.round())?;
            writeln!(out, "2nd Half Avg:      {:.0} bpm", drift.second_half_avg.round())?;
            writeln!(out, "HR Change:         {:+.1} bpm", drift.drift_bpm)?;
        }
        Insight::NotApplicable(gap) => writeln!(out, "{}", gap.reason)?,
    }
    writeln!(out)?;

    writeln!(out, "LONGEST SUSTAINED EFFORT")?;
    writeln!(out, "------------------------------------------------------------")?;
    match &analysis.sustained_effort {
        Insight::Available(effort) => {
            writeln!(
                out,
                "Duration:          {} ({})",
                format_time(effort.duration_seconds),
                effort.rating
            )?;
            writeln!(
                out,
                "Time Range:        {} - {}",
                format_time(effort.start_time),
                format_time(effort.end_time)
            )?;
            writeln!(out, "Avg HR:            {} bpm", effort.average_hr)?;
            writeln!(
                out,
                "Target Zone:       Z2-Z3 ({}-{} bpm)",
                effort.band_min, effort.band_max
            )?;
        }
        Insight::NotApplicable(gap) => writeln!(out, "{}", gap.reason)?,
    }
    writeln!(out)?;

    let trimp = &analysis.trimp;
    writeln!(out, "TRAINING LOAD (TRIMP)")?;
    writeln!(out, "------------------------------------------------------------")?;
    writeln!(out, "Score:             {} ({})", trimp.score, trimp.rating)?;
    for row in &trimp.breakdown {
        writeln!(
            out,
            "  {:<3} {:>6.1}m x {}  {:>4}",
            row.zone.short_label, row.minutes, row.weight, row.contribution
        )?;
    }

    Ok(())
}

fn write_interval<W: Write>(
    out: &mut W,
    title: &str,
    interval: &Insight<Interval>,
) -> Result<(), ExportError> {
    match interval {
        Insight::Available(i) => writeln!(
            out,
            "{:<18} {} - {}  avg {} bpm  max {} bpm",
            format!("{}:", title),
            format_time(i.start_time),
            format_time(i.end_time),
            i.average_hr,
            i.max_hr
        )?,
        Insight::NotApplicable(gap) => writeln!(out, "{:<18} {}", format!("{}:", title), gap.reason)?,
    }
    Ok(())
}
