//! Static Chart Renderer
//! Renders each hypothesis summary as a PNG: a bar chart of the grouped
//! metric, plus a line chart for the time-series hypotheses.

use crate::stats::HypothesisSummary;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CHART_SIZE: (u32, u32) = (800, 500);
const BAR_FILL: RGBColor = RGBColor(99, 110, 250);
const LINE_COLOR: RGBColor = RGBColor(239, 85, 59);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render every summary into `dir` and return the written paths.
    /// Bar charts are named `h01.png` .. `h10.png`; time-series summaries
    /// additionally get an `hNN_series.png` line chart.
    pub fn render_all(
        summaries: &[HypothesisSummary],
        dir: &Path,
    ) -> Result<Vec<PathBuf>, ChartError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for summary in summaries {
            if summary.rows.is_empty() {
                continue;
            }
            let bar_path = dir.join(format!("h{:02}.png", summary.number));
            Self::render_bar_chart(summary, &bar_path)?;
            written.push(bar_path);

            if summary.is_time_series() {
                let line_path = dir.join(format!("h{:02}_series.png", summary.number));
                Self::render_line_chart(summary, &line_path)?;
                written.push(line_path);
            }
        }
        Ok(written)
    }

    /// One bar per summary row.
    pub fn render_bar_chart(summary: &HypothesisSummary, path: &Path) -> Result<(), ChartError> {
        let n = summary.rows.len();
        if n == 0 {
            return Ok(());
        }
        let max = summary
            .rows
            .iter()
            .map(|r| r.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("H{}: {}", summary.number, summary.title),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let labels: Vec<String> = summary.rows.iter().map(|r| r.label.clone()).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                let idx = x.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (x - idx).abs() < 0.25 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .x_desc(summary.group_label.as_str())
            .y_desc(summary.metric_label.as_str())
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .draw_series(summary.rows.iter().enumerate().map(|(i, row)| {
                Rectangle::new(
                    [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, row.value)],
                    BAR_FILL.mix(0.7).filled(),
                )
            }))
            .map_err(|e| ChartError::Render(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// Value line over the chronological buckets of a time-series summary.
    pub fn render_line_chart(summary: &HypothesisSummary, path: &Path) -> Result<(), ChartError> {
        let n = summary.rows.len();
        if n == 0 {
            return Ok(());
        }
        let min = summary
            .rows
            .iter()
            .map(|r| r.value)
            .fold(f64::INFINITY, f64::min);
        let max = summary
            .rows
            .iter()
            .map(|r| r.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let pad = ((max - min) * 0.15).max(1.0);

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("H{}: {}", summary.number, summary.title),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (min - pad)..(max + pad))
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let labels: Vec<String> = summary.rows.iter().map(|r| r.label.clone()).collect();
        chart
            .configure_mesh()
            .x_labels(n.min(12))
            .x_label_formatter(&|x: &f64| {
                let idx = x.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (x - idx).abs() < 0.25 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .x_desc(summary.group_label.as_str())
            .y_desc(summary.metric_label.as_str())
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                summary
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| (i as f64, row.value)),
                LINE_COLOR.stroke_width(2),
            ))
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .draw_series(
                summary
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| Circle::new((i as f64, row.value), 3, LINE_COLOR.filled())),
            )
            .map_err(|e| ChartError::Render(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }
}
