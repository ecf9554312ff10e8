//! Coordinates for the weight line chart.
//!
//! The plotting surface is a fixed 400×200 box. Points are spaced evenly along
//! x whatever their dates; y grows downward, so heavier samples get smaller y.

use serde::Serialize;

use crate::domains::weight::WeightSample;
use crate::transforms::round1;

pub const VIEWBOX_WIDTH: f64 = 400.0;
pub const VIEWBOX_HEIGHT: f64 = 200.0;
pub const LEFT_MARGIN: f64 = 40.0;
pub const X_SPACING: f64 = 80.0;
pub const BOTTOM_Y: f64 = 180.0;
pub const PLOT_HEIGHT: f64 = 160.0;
/// y used for every point of a zero-range series.
pub const MID_Y: f64 = 90.0;
pub const TICK_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub width: f64,
    pub height: f64,
    pub points: Vec<ChartPoint>,
    /// SVG `points` attribute for the polyline.
    pub polyline: String,
    /// Axis labels from max down to min.
    pub y_ticks: Vec<f64>,
}

fn bounds(samples: &[WeightSample]) -> Option<(f64, f64)> {
    let mut it = samples.iter().map(|s| s.weight);
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), w| (lo.min(w), hi.max(w))))
}

pub fn map_points(samples: &[WeightSample]) -> Vec<ChartPoint> {
    let Some((min, max)) = bounds(samples) else {
        return Vec::new();
    };
    let range = max - min;
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let y = if range > 0.0 {
                BOTTOM_Y - (s.weight - min) / range * PLOT_HEIGHT
            } else {
                MID_Y
            };
            ChartPoint {
                x: i as f64 * X_SPACING + LEFT_MARGIN,
                y,
                weight: s.weight,
            }
        })
        .collect()
}

/// Five labels stepping the range in quarters from max down to min.
///
/// A zero or non-finite range steps by 1; any non-finite label becomes 0.
pub fn y_ticks(samples: &[WeightSample]) -> Vec<f64> {
    let Some((min, max)) = bounds(samples) else {
        return vec![0.0; TICK_COUNT];
    };
    let step = (max - min) / 4.0;
    let step = if step == 0.0 || !step.is_finite() {
        1.0
    } else {
        step
    };
    (0..TICK_COUNT)
        .map(|i| {
            let v = round1(max - step * i as f64);
            if v.is_finite() { v } else { 0.0 }
        })
        .collect()
}

pub fn polyline(points: &[ChartPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn chart_view(samples: &[WeightSample]) -> ChartView {
    let points = map_points(samples);
    ChartView {
        width: VIEWBOX_WIDTH,
        height: VIEWBOX_HEIGHT,
        polyline: polyline(&points),
        y_ticks: y_ticks(samples),
        points,
    }
}
