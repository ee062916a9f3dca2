//! `plot` command: terminal chart of a series with its EMAs and forecasts

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use body_model::{format_date, Metric, Series};
use body_store::RecordStore;
use body_trend::{Analysis, TrendAnalyzer};
use chrono::{Days, NaiveDate};
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};
use ratatui::Terminal;
use tracing::{debug, info};

use crate::context::AppContext;

/// Size of a chart written to a file
pub const FILE_CHART_WIDTH: u16 = 120;
pub const FILE_CHART_HEIGHT: u16 = 40;

const EMA_COLORS: [Color; 3] = [Color::Yellow, Color::Magenta, Color::Blue];

// ============================================================================
// Chart data
// ============================================================================

/// One forecast horizon as chart lines
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastLines {
    pub horizon: usize,
    pub point: Vec<(f64, f64)>,
    pub lower: Vec<(f64, f64)>,
    pub upper: Vec<(f64, f64)>,
}

/// Owned chart points; x is days since the first sample
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub metric: Metric,
    pub start: NaiveDate,
    pub series: Vec<(f64, f64)>,
    pub emas: Vec<(u32, Vec<(f64, f64)>)>,
    pub forecasts: Vec<ForecastLines>,
}

fn day_offset(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64
}

impl ChartData {
    /// Collect chart lines from a series and its analysis
    ///
    /// Sections the analysis could not compute are simply not drawn.
    pub fn build(
        title: String,
        metric: Metric,
        series: &Series,
        analysis: &Analysis,
    ) -> Option<Self> {
        let start = series.first()?.date;
        let dates: Vec<f64> = series.iter().map(|s| day_offset(start, s.date)).collect();
        let points = series.iter().map(|s| (day_offset(start, s.date), s.value)).collect();

        let mut emas = Vec::new();
        let mut forecasts = Vec::new();
        if let Some(result) = analysis.result() {
            if let Ok(summary) = &result.ema {
                for report in &summary.reports {
                    let curve = dates.iter().copied().zip(report.curve.iter().copied()).collect();
                    emas.push((report.span, curve));
                }
            }
            if let Ok(all) = &result.forecast {
                for forecast in all {
                    let x = |date: NaiveDate| day_offset(start, date);
                    forecasts.push(ForecastLines {
                        horizon: forecast.horizon,
                        point: forecast.path.iter().map(|p| (x(p.date), p.value)).collect(),
                        lower: forecast.path.iter().map(|p| (x(p.date), p.lower)).collect(),
                        upper: forecast.path.iter().map(|p| (x(p.date), p.upper)).collect(),
                    });
                }
            }
        }

        Some(Self {
            title,
            metric,
            start,
            series: points,
            emas,
            forecasts,
        })
    }

    fn all_points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.series
            .iter()
            .chain(self.emas.iter().flat_map(|(_, c)| c.iter()))
            .chain(self.forecasts.iter().flat_map(|f| {
                f.point.iter().chain(f.lower.iter()).chain(f.upper.iter())
            }))
    }

    /// `[min, max]` of x over every line
    pub fn x_bounds(&self) -> [f64; 2] {
        let max = self.all_points().map(|p| p.0).fold(0.0, f64::max);
        [0.0, max.max(1.0)]
    }

    /// `[min, max]` of y over every line, padded by 5% of the range
    pub fn y_bounds(&self) -> [f64; 2] {
        let (min, max) = self
            .all_points()
            .map(|p| p.1)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
        [min - pad, max + pad]
    }

    fn date_at(&self, x: f64) -> String {
        format_date(self.start + Days::new(x.max(0.0).round() as u64))
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Build the chart widget borrowing from `data`
pub fn render_chart(data: &ChartData) -> Chart<'_> {
    let mut datasets = vec![Dataset::default()
        .name(data.metric.label())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data.series)];

    for ((span, curve), color) in data.emas.iter().zip(EMA_COLORS.iter().cycle()) {
        datasets.push(
            Dataset::default()
                .name(format!("EMA {}", span))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(curve),
        );
    }

    for forecast in &data.forecasts {
        datasets.push(
            Dataset::default()
                .name(format!("ARIMA {}d", forecast.horizon))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&forecast.point),
        );
        for bound in [&forecast.lower, &forecast.upper] {
            datasets.push(
                Dataset::default()
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::DarkGray))
                    .data(bound),
            );
        }
    }

    let [x_min, x_max] = data.x_bounds();
    let [y_min, y_max] = data.y_bounds();

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", data.title)),
        )
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(data.date_at(x_min)),
                    Span::raw(data.date_at((x_min + x_max) / 2.0)),
                    Span::raw(data.date_at(x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(data.metric.unit())
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        )
        .hidden_legend_constraints((Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)))
}

/// Plain text of a rendered buffer, one line per row, trailing spaces trimmed
pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell((x, y)) {
                line.push_str(cell.symbol());
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Render `data` off-screen at the given size
pub fn render_to_text(data: &ChartData, width: u16, height: u16) -> Result<String> {
    let mut terminal =
        Terminal::new(TestBackend::new(width, height)).context("Failed to create terminal")?;
    terminal
        .draw(|f| f.render_widget(render_chart(data), f.area()))
        .context("Failed to draw chart")?;
    Ok(buffer_text(terminal.backend().buffer()))
}

/// Write the chart to `path` as text
pub fn write_chart(data: &ChartData, path: &Path) -> Result<()> {
    let text = render_to_text(data, FILE_CHART_WIDTH, FILE_CHART_HEIGHT)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    Ok(())
}

/// Show the chart until `q` or `Esc`
fn run_viewer(data: &ChartData) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_viewer_loop(&mut terminal, data);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    terminal
        .backend_mut()
        .execute(LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;

    result
}

fn run_viewer_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    data: &ChartData,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| f.render_widget(render_chart(data), f.area()))?;

        if event::poll(tick_rate).context("Failed to poll events")? {
            if let Event::Key(key) = event::read().context("Failed to read event")? {
                if key.kind == KeyEventKind::Press {
                    if let KeyCode::Char('q') | KeyCode::Esc = key.code {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Chart title, e.g. `Weight over Time - ryder (Generated: 2024-01-29)`
pub fn chart_title(metric: Metric, user: &str, generated: NaiveDate) -> String {
    format!(
        "{} over Time - {} (Generated: {})",
        metric.label(),
        user,
        format_date(generated)
    )
}

/// Plot `user`'s series for `metric`, interactively or into `output`
pub async fn plot_command(
    ctx: &AppContext,
    user: &str,
    metric: Metric,
    output: Option<&Path>,
) -> Result<()> {
    let store = ctx.users.open_readonly(user).await?;
    let series = store
        .load_series(metric)
        .await
        .with_context(|| format!("Failed to load {} records for {}", metric, user))?;
    store.close().await;

    let analysis = TrendAnalyzer::default().analyze(&series);
    let title = chart_title(metric, user, ctx.today);
    let Some(data) = ChartData::build(title, metric, &series, &analysis) else {
        bail!("No {} records to plot for {}", metric, user);
    };
    debug!(
        "chart: {} samples, {} ema lines, {} forecasts",
        data.series.len(),
        data.emas.len(),
        data.forecasts.len()
    );

    match output {
        Some(path) => {
            write_chart(&data, path)?;
            info!("chart written to {}", path.display());
            println!("[{}] - {}", "SAVED".green().bold(), path.display());
        },
        None => run_viewer(&data)?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use body_model::{parse_date, Sample};
    use tempfile::TempDir;

    fn weekly(values: &[f64]) -> Series {
        let start = parse_date("2024-01-01").unwrap();
        Series::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(start + Days::new(7 * i as u64), v))
                .collect(),
        )
    }

    fn chart_data(series: &Series) -> ChartData {
        let analysis = TrendAnalyzer::default().analyze(series);
        let title = chart_title(Metric::Weight, "ryder", parse_date("2024-01-29").unwrap());
        ChartData::build(title, Metric::Weight, series, &analysis).unwrap()
    }

    #[test]
    fn test_chart_data_lines() {
        let data = chart_data(&weekly(&[200.0, 195.0, 190.0, 188.0, 186.0]));

        assert_eq!(data.series.first(), Some(&(0.0, 200.0)));
        assert_eq!(data.series.last(), Some(&(28.0, 186.0)));
        assert_eq!(data.emas.len(), 3);
        assert!(data.emas.iter().all(|(_, c)| c.len() == 5));
        assert_eq!(data.forecasts.len(), 2);

        // 30-day path runs from day 29 to day 58
        let thirty = data.forecasts.iter().find(|f| f.horizon == 30).unwrap();
        assert_eq!(thirty.point.len(), 30);
        assert_eq!(thirty.point[0].0, 29.0);
        assert_eq!(data.x_bounds(), [0.0, 58.0]);
    }

    #[test]
    fn test_single_sample_chart() {
        let data = chart_data(&weekly(&[150.0]));
        assert!(data.emas.is_empty());
        assert!(data.forecasts.is_empty());
        assert_eq!(data.y_bounds(), [149.0, 151.0]);
        assert_eq!(data.x_bounds(), [0.0, 1.0]);
    }

    #[test]
    fn test_empty_series_has_no_chart() {
        let series = Series::new();
        let analysis = TrendAnalyzer::default().analyze(&series);
        assert!(ChartData::build("t".into(), Metric::Weight, &series, &analysis).is_none());
    }

    #[test]
    fn test_y_bounds_padding() {
        let data = chart_data(&weekly(&[100.0, 200.0]));
        assert_eq!(data.y_bounds(), [95.0, 205.0]);
    }

    #[test]
    fn test_render_to_text() {
        let data = chart_data(&weekly(&[200.0, 195.0, 190.0, 188.0, 186.0]));
        let text = render_to_text(&data, 100, 30).unwrap();

        assert_eq!(text.lines().count(), 30);
        assert!(text.contains("Weight over Time - ryder (Generated: 2024-01-29)"));
        assert!(text.contains("2024-01-01"));
    }

    #[test]
    fn test_write_chart_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.txt");
        let data = chart_data(&weekly(&[200.0, 195.0, 190.0]));

        write_chart(&data, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), FILE_CHART_HEIGHT as usize);
        assert!(text.contains("Weight over Time"));
    }
}
