use crate::config::{ChartMode, TimelineLabel};
use crate::host::{format_seen, HostRecord};
use crate::ident::escape_html;
use serde::Serialize;
use std::fmt::Write;
use time::PrimitiveDateTime;
use tracing::{debug, warn};

pub const NO_TIMELINE_DATA: &str = "No timeline data available";

const CHART_WIDTH: f64 = 1200.0;
const MARGIN_LEFT: f64 = 220.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 72.0;
const ROW_HEIGHT: f64 = 28.0;
const MIN_PLOT_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimelinePoint {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: PrimitiveDateTime,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSeries {
    pub points: Vec<TimelinePoint>,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub mode: ChartMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineFragment {
    pub markup: String,
    pub points: usize,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("timeline series is empty")]
    EmptySeries,
    #[error("chart rendering failed: {0}")]
    Rendering(String),
}

pub trait TimelineChart {
    fn render(&self, series: &TimelineSeries) -> Result<String, ChartError>;
}

#[derive(Debug, Clone, Copy)]
pub struct TimelineOptions {
    pub label: TimelineLabel,
    pub mode: ChartMode,
}

/// Hosts with a first-seen time, earliest first. The sort is stable, so hosts
/// seen at the same instant keep their snapshot order.
pub fn timeline_series(hosts: &[HostRecord], label: TimelineLabel) -> Vec<TimelinePoint> {
    let mut points: Vec<TimelinePoint> = hosts
        .iter()
        .filter_map(|host| {
            host.first_seen.map(|timestamp| TimelinePoint {
                timestamp,
                label: point_label(host, label),
            })
        })
        .collect();
    points.sort_by_key(|point| point.timestamp);
    points
}

pub fn point_label(host: &HostRecord, label: TimelineLabel) -> String {
    match label {
        TimelineLabel::Mac => host.mac.clone(),
        TimelineLabel::Composite => host.index_label(),
    }
}

pub fn build_timeline(
    hosts: &[HostRecord],
    chart: &dyn TimelineChart,
    options: TimelineOptions,
) -> TimelineFragment {
    let series = TimelineSeries {
        points: timeline_series(hosts, options.label),
        title: "Order in which devices were first seen".to_string(),
        x_title: "First seen".to_string(),
        y_title: match options.label {
            TimelineLabel::Mac => "MAC address".to_string(),
            TimelineLabel::Composite => "Device".to_string(),
        },
        mode: options.mode,
    };
    let points = series.points.len();

    match chart.render(&series) {
        Ok(markup) => {
            debug!(points, "timeline rendered");
            TimelineFragment { markup, points }
        }
        Err(err) => {
            warn!(%err, "timeline unavailable, rendering placeholder");
            TimelineFragment::empty()
        }
    }
}

impl TimelineFragment {
    pub fn empty() -> Self {
        Self {
            markup: format!("<p class=\"no-timeline\">{NO_TIMELINE_DATA}</p>"),
            points: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgTimelineChart;

impl TimelineChart for SvgTimelineChart {
    fn render(&self, series: &TimelineSeries) -> Result<String, ChartError> {
        let (first, last) = match (series.points.first(), series.points.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return Err(ChartError::EmptySeries),
        };

        let mut rows: Vec<&str> = Vec::new();
        for point in &series.points {
            if !rows.contains(&point.label.as_str()) {
                rows.push(&point.label);
            }
        }

        let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = (rows.len() as f64 * ROW_HEIGHT).max(MIN_PLOT_HEIGHT);
        let height = MARGIN_TOP + plot_height + MARGIN_BOTTOM;
        let span = (last - first).whole_seconds() as f64;
        let row_step = plot_height / rows.len() as f64;

        let x_of = |timestamp: PrimitiveDateTime| -> f64 {
            if span <= 0.0 {
                MARGIN_LEFT + plot_width / 2.0
            } else {
                MARGIN_LEFT + (timestamp - first).whole_seconds() as f64 / span * plot_width
            }
        };
        let y_of = |label: &str| -> f64 {
            let row = rows.iter().position(|r| *r == label).unwrap_or(0);
            MARGIN_TOP + row_step * (row as f64 + 0.5)
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            "<svg class=\"timeline\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{CHART_WIDTH:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {CHART_WIDTH:.0} {height:.0}\" role=\"img\">"
        );
        let _ = writeln!(svg, "<title>{}</title>", escape_html(&series.title));
        let _ = writeln!(
            svg,
            "<text x=\"{:.0}\" y=\"28\" font-size=\"18\" font-weight=\"600\">{}</text>",
            MARGIN_LEFT,
            escape_html(&series.title)
        );
        let _ = writeln!(
            svg,
            "<rect x=\"{MARGIN_LEFT:.0}\" y=\"{MARGIN_TOP:.0}\" width=\"{plot_width:.0}\" height=\"{plot_height:.0}\" fill=\"none\" stroke=\"#cbd5e1\"/>"
        );

        for label in &rows {
            let y = y_of(label);
            let _ = writeln!(
                svg,
                "<line x1=\"{MARGIN_LEFT:.0}\" y1=\"{y:.1}\" x2=\"{:.0}\" y2=\"{y:.1}\" stroke=\"#e2e8f0\"/>",
                MARGIN_LEFT + plot_width
            );
            let _ = writeln!(
                svg,
                "<text x=\"{:.0}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{}</text>",
                MARGIN_LEFT - 8.0,
                y + 4.0,
                escape_html(label)
            );
        }

        let axis_y = MARGIN_TOP + plot_height;
        let mut ticks = vec![first];
        if span > 0.0 {
            ticks.push(first + (last - first) / 2);
            ticks.push(last);
        }
        for tick in ticks {
            let _ = writeln!(
                svg,
                "<text x=\"{:.1}\" y=\"{:.0}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
                x_of(tick),
                axis_y + 18.0,
                escape_html(&format_seen(tick))
            );
        }
        let _ = writeln!(
            svg,
            "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
            MARGIN_LEFT + plot_width / 2.0,
            axis_y + 48.0,
            escape_html(&series.x_title)
        );
        let _ = writeln!(
            svg,
            "<text x=\"16\" y=\"{:.0}\" font-size=\"13\" transform=\"rotate(-90 16 {:.0})\" text-anchor=\"middle\">{}</text>",
            MARGIN_TOP + plot_height / 2.0,
            MARGIN_TOP + plot_height / 2.0,
            escape_html(&series.y_title)
        );

        if series.mode == ChartMode::LinesAndMarkers && series.points.len() > 1 {
            let path: Vec<String> = series
                .points
                .iter()
                .map(|point| format!("{:.1},{:.1}", x_of(point.timestamp), y_of(&point.label)))
                .collect();
            let _ = writeln!(
                svg,
                "<polyline points=\"{}\" fill=\"none\" stroke=\"#60a5fa\" stroke-width=\"1.5\"/>",
                path.join(" ")
            );
        }

        for point in &series.points {
            let _ = writeln!(
                svg,
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"5\" fill=\"#2563eb\"><title>{} - {}</title></circle>",
                x_of(point.timestamp),
                y_of(&point.label),
                escape_html(&point.label),
                escape_html(&format_seen(point.timestamp))
            );
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

fn serialize_timestamp<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_seen(*value))
}
