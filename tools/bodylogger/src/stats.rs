//! `stats` command: console rendering of a trend analysis

use anyhow::{Context as _, Result};
use body_model::{format_date, Metric};
use body_store::RecordStore;
use body_trend::{
    round1, AnalyzerConfig, Analysis, DeltaReport, DeltaStatus, Forecast, TrendAnalyzer,
    TrendError, TrendResult, TrendWarning, EMA_SPANS, WINDOWS,
};
use chrono::NaiveDate;
use colored::*;
use tracing::debug;

use crate::context::AppContext;

// ============================================================================
// Coloring
// ============================================================================

/// Color a change by whether it is good news for `metric`
///
/// Zero is neutral and shown in yellow.
fn color_change(metric: Metric, value: f64, text: String) -> ColoredString {
    if value == 0.0 {
        return text.yellow();
    }
    let favorable = (value < 0.0) == metric.lower_is_better();
    if favorable {
        text.green()
    } else {
        text.red()
    }
}

fn signed(value: f64) -> String {
    if value == 0.0 {
        "0.0".to_string()
    } else {
        format!("{:+.1}", value)
    }
}

// ============================================================================
// Sections
// ============================================================================

fn header(user: &str, metric: Metric) -> String {
    format!(
        "[{}]",
        format!(
            "{} STATISTICS FOR USER - {}",
            metric.label().to_uppercase(),
            user
        )
        .green()
    )
}

fn current_line(metric: Metric, result: &TrendResult) -> String {
    format!(
        "Current {}: {:.1} {} ( {} )",
        metric.label(),
        result.current.value,
        metric.unit(),
        format_date(result.current.date)
    )
}

/// `value ( start -> end )`, or just the value when there are no endpoints
fn delta_text(metric: Metric, report: &DeltaReport) -> String {
    let value = color_change(metric, report.value, signed(report.value));
    match (report.start, report.end) {
        (Some(start), Some(end)) => format!(
            "{} ( {} -> {} )",
            value,
            format_date(start),
            format_date(end)
        ),
        _ => value.to_string(),
    }
}

fn total_line(metric: Metric, report: &DeltaReport) -> String {
    let label = format!("Total {} Change:", metric.label());
    match report.status {
        DeltaStatus::Ok => format!("{} {}", label, delta_text(metric, report)),
        _ => format!(
            "{} {} {}",
            label,
            delta_text(metric, report),
            "** ONLY 1 RECORD **".yellow()
        ),
    }
}

fn window_line(metric: Metric, days: u32, report: &DeltaReport) -> String {
    let label = format!("{} +/- in Past {} Days:", metric.label(), days);
    let notice = match report.status {
        DeltaStatus::Ok => return format!("{} {}", label, delta_text(metric, report)),
        DeltaStatus::SingleSample => format!("** ONLY 1 RECORD IN PAST {} DAYS **", days),
        DeltaStatus::Empty => format!("** NO RECORDS IN PAST {} DAYS **", days),
    };
    format!("{} {} {}", label, delta_text(metric, report), notice.yellow())
}

fn unavailable(section: &str, err: &TrendError) -> String {
    format!("{}: {}", section, format!("** {} **", err).yellow())
}

fn dispersion_lines(result: &TrendResult) -> Vec<String> {
    match &result.dispersion {
        Ok(d) => vec![
            format!("1 Sigma: {} (68%)", d.sigma),
            format!("2 Sigma: {} (95%)", d.two_sigma),
            format!("3 Sigma: {} (99.7%)", d.three_sigma),
            format!("SEM: {}", d.sem),
        ],
        Err(e) => vec![unavailable("Dispersion", e)],
    }
}

fn warning_line(metric: Metric, warning: TrendWarning) -> String {
    let (short, long, article) = match warning {
        TrendWarning::UpwardTrend => (7, 30, "AN"),
        TrendWarning::ProlongedUpwardTrend => (30, 90, "A PROLONGED"),
    };
    let noun = metric.label().to_uppercase();
    if metric.lower_is_better() {
        format!(
            "** WARNING {} DAY EMA IS HIGHER THAN {} DAY -- INDICATES {} UPWARD {} TREND",
            short, long, article, noun
        )
        .red()
        .to_string()
    } else {
        format!(
            "** {} DAY EMA IS HIGHER THAN {} DAY -- INDICATES {} UPWARD {} TREND",
            short, long, article, noun
        )
        .green()
        .to_string()
    }
}

fn ema_lines(metric: Metric, result: &TrendResult) -> Vec<String> {
    let summary = match &result.ema {
        Ok(summary) => summary,
        Err(e) => return vec![unavailable("EMA", e)],
    };

    let mut lines: Vec<String> = EMA_SPANS
        .iter()
        .rev()
        .filter_map(|&span| summary.value(span).map(|v| format!("EMA {:>2}: {}", span, v)))
        .collect();
    lines.extend(
        result
            .warnings
            .iter()
            .map(|&warning| warning_line(metric, warning)),
    );
    lines
}

fn forecast_line(forecast: &Forecast) -> String {
    let pct = round1(forecast.confidence_level * 100.0);
    format!(
        "ARIMA {} Day Forecast: {} (Lower {}% Conf. Bound) <- {} -> {} (Upper {}% Conf. Bound)",
        forecast.horizon, forecast.lower, pct, forecast.point, forecast.upper, pct
    )
}

fn forecast_lines(result: &TrendResult) -> Vec<String> {
    match &result.forecast {
        Ok(all) => all.iter().map(forecast_line).collect(),
        Err(TrendError::InsufficientSamples { required, actual }) => vec![format!(
            "ARIMA Forecast: {}",
            format!(
                "** INSUFFICIENT DEGREES OF FREEDOM (need {} records, have {}) **",
                required, actual
            )
            .yellow()
        )],
        Err(e) => vec![unavailable("ARIMA Forecast", e)],
    }
}

// ============================================================================
// Report
// ============================================================================

/// Render an analysis as console lines
pub fn render_report(user: &str, metric: Metric, analysis: &Analysis) -> Vec<String> {
    let mut lines = vec![header(user, metric)];

    let result = match analysis {
        Analysis::Ready(result) => result,
        Analysis::NoData => {
            lines.push(
                format!("** NO {} RECORDS **", metric.label().to_uppercase())
                    .yellow()
                    .to_string(),
            );
            return lines;
        },
    };

    lines.push(current_line(metric, result));
    lines.push(total_line(metric, &result.total_delta));
    for &days in WINDOWS.iter().rev() {
        if let Some(report) = result.window(days) {
            lines.push(window_line(metric, days, report));
        }
    }
    lines.push(String::new());
    lines.extend(dispersion_lines(result));
    lines.push(String::new());
    lines.extend(ema_lines(metric, result));
    lines.push(String::new());
    lines.extend(forecast_lines(result));
    lines
}

/// Load `user`'s series for `metric`, analyze and print it
pub async fn stats_command(
    ctx: &AppContext,
    user: &str,
    metric: Metric,
    as_of: Option<NaiveDate>,
) -> Result<()> {
    let store = ctx.users.open_readonly(user).await?;
    let series = store
        .load_series(metric)
        .await
        .with_context(|| format!("Failed to load {} records for {}", metric, user))?;
    store.close().await;
    debug!("loaded {} {} samples for {}", series.len(), metric, user);

    let analyzer = TrendAnalyzer::new(AnalyzerConfig {
        as_of,
        ..Default::default()
    });
    let analysis = analyzer.analyze(&series);

    for line in render_report(user, metric, &analysis) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use body_model::{parse_date, Sample, Series};

    fn weekly(values: &[f64]) -> Series {
        let start = parse_date("2024-01-01").unwrap();
        Series::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(start + chrono::Days::new(7 * i as u64), v))
                .collect(),
        )
    }

    fn report(metric: Metric, series: &Series) -> String {
        colored::control::set_override(false);
        render_report("ryder", metric, &TrendAnalyzer::default().analyze(series)).join("\n")
    }

    #[test]
    fn test_five_sample_report() {
        let text = report(Metric::Weight, &weekly(&[200.0, 195.0, 190.0, 188.0, 186.0]));

        assert!(text.contains("WEIGHT STATISTICS FOR USER - ryder"));
        assert!(text.contains("Current Weight: 186.0 lbs ( 2024-01-29 )"));
        assert!(text.contains("Total Weight Change: -14.0 ( 2024-01-01 -> 2024-01-29 )"));
        assert!(text.contains("Weight +/- in Past 7 Days: -2.0 ( 2024-01-22 -> 2024-01-29 )"));
        assert!(text.contains("Weight +/- in Past 30 Days: -14.0 ( 2024-01-01 -> 2024-01-29 )"));
        assert!(text.contains("1 Sigma: 5.1 (68%)"));
        assert!(text.contains("SEM: 2.3"));
        assert!(text.contains("EMA  7:"));
        assert!(text.contains("ARIMA 7 Day Forecast:"));
        assert!(text.contains("ARIMA 30 Day Forecast:"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn test_single_sample_report() {
        let text = report(Metric::Weight, &weekly(&[150.0]));

        assert!(text.contains("Current Weight: 150.0 lbs ( 2024-01-01 )"));
        assert!(text.contains(
            "Total Weight Change: 0.0 ( 2024-01-01 -> 2024-01-01 ) ** ONLY 1 RECORD **"
        ));
        assert!(text.contains(
            "Weight +/- in Past 90 Days: 0.0 ( 2024-01-01 -> 2024-01-01 ) \
             ** ONLY 1 RECORD IN PAST 90 DAYS **"
        ));
        assert!(text.contains("Dispersion: ** insufficient data"));
        assert!(text.contains("INSUFFICIENT DEGREES OF FREEDOM (need 5 records, have 1)"));
    }

    #[test]
    fn test_empty_window_has_no_dates() {
        let report = DeltaReport {
            status: DeltaStatus::Empty,
            value: 0.0,
            start: None,
            end: None,
            sample_count: 0,
        };
        colored::control::set_override(false);
        assert_eq!(
            window_line(Metric::Weight, 7, &report),
            "Weight +/- in Past 7 Days: 0.0 ** NO RECORDS IN PAST 7 DAYS **"
        );
    }

    #[test]
    fn test_empty_report() {
        let text = report(Metric::RunDistance, &Series::new());
        assert!(text.contains("** NO RUN DISTANCE RECORDS **"));
        assert!(!text.contains("Current"));
    }

    #[test]
    fn test_rising_weight_warns() {
        let values: Vec<f64> = (0..12).map(|i| 150.0 + 2.0 * i as f64).collect();
        let text = report(Metric::Weight, &weekly(&values));

        assert!(text.contains("** WARNING 7 DAY EMA IS HIGHER THAN 30 DAY"));
        assert!(text.contains("PROLONGED UPWARD WEIGHT TREND"));
        assert!(text.contains("ARIMA Forecast: ** model fit failed"));
    }

    #[test]
    fn test_rising_distance_is_not_a_warning() {
        let values: Vec<f64> = (0..12).map(|i| 2.0 + 0.5 * i as f64).collect();
        let text = report(Metric::RunDistance, &weekly(&values));

        assert!(text.contains("7 DAY EMA IS HIGHER THAN 30 DAY"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn test_change_coloring_follows_metric() {
        let down = color_change(Metric::Weight, -1.0, "-1.0".into());
        let up = color_change(Metric::RunDistance, 1.0, "+1.0".into());
        let flat = color_change(Metric::Weight, 0.0, "0.0".into());
        assert_eq!(down.fgcolor(), Some(Color::Green));
        assert_eq!(up.fgcolor(), Some(Color::Green));
        assert_eq!(flat.fgcolor(), Some(Color::Yellow));
        assert_eq!(
            color_change(Metric::Weight, 1.0, "+1.0".into()).fgcolor(),
            Some(Color::Red)
        );
    }
}
