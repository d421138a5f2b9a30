//! SVG charts for the daily forecast rows.
//!
//! Days sit at x = 0, 1, 2, ... and the axis formatter turns those positions
//! back into `%m/%d` labels.

use std::ops::Range;

use anyhow::{Result, anyhow, bail};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::model::{ChartStyle, DailySummary, Units};

const MIN_COLOR: RGBColor = RGBColor(0x42, 0xbf, 0xf4);
const MAX_COLOR: RGBColor = RGBColor(0xff, 0x53, 0x49);
const SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";
const BAR_WIDTH: f64 = 0.4;

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("Failed to draw chart: {e}")
}

fn x_range(days: usize) -> Range<f64> {
    -0.6..(days as f64 - 0.4)
}

fn day_label(days: &[DailySummary], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }

    days.get(idx as usize)
        .map(|d| d.day.format("%m/%d").to_string())
        .unwrap_or_default()
}

/// Bar between the zero line and `value`, listed top corner first.
fn bar(x0: f64, x1: f64, value: f64, color: RGBColor) -> Rectangle<(f64, f64)> {
    let (top, bottom) = if value >= 0.0 { (value, 0.0) } else { (0.0, value) };
    Rectangle::new([(x0, top), (x1, bottom)], color.filled())
}

fn legend_box(x: i32, y: i32, color: RGBColor) -> Rectangle<(i32, i32)> {
    Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
}

fn legend_line(x: i32, y: i32, color: RGBColor) -> PathElement<(i32, i32)> {
    PathElement::new(vec![(x, y), (x + 20, y)], color)
}

fn value_label<'a>(valign: VPos) -> TextStyle<'a> {
    TextStyle::from((FONT, 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, valign))
}

fn degrees(value: f64) -> String {
    // whole degrees, truncated toward zero
    format!("{}°", value as i64)
}

/// Min/max temperature per day, as bars or lines.
pub fn temperature_chart(
    days: &[DailySummary],
    units: Units,
    style: ChartStyle,
) -> Result<String> {
    if days.is_empty() {
        bail!("No forecast days to chart");
    }

    let lo = days.iter().map(|d| d.temp_min).fold(f64::INFINITY, f64::min);
    let hi = days.iter().map(|d| d.temp_max).fold(f64::NEG_INFINITY, f64::max);
    let y_range = match style {
        ChartStyle::Bar => (lo.min(0.0) - 3.0)..(hi.max(0.0) + 4.0),
        ChartStyle::Line => (lo - 4.0)..(hi + 4.0),
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("5-Day Temperature Forecast", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range(days.len()), y_range)
            .map_err(draw_err)?;

        let label = |x: &f64| day_label(days, *x);
        chart
            .configure_mesh()
            .x_labels(days.len())
            .x_label_formatter(&label)
            .x_desc("Date")
            .y_desc(format!("Temperature ({})", units.degree_label()))
            .bold_line_style(BLACK.mix(0.1))
            .light_line_style(BLACK.mix(0.03))
            .draw()
            .map_err(draw_err)?;

        let points = |pick: fn(&DailySummary) -> f64| -> Vec<(f64, f64)> {
            days.iter().enumerate().map(|(i, d)| (i as f64, pick(d))).collect()
        };
        let mins = points(|d: &DailySummary| d.temp_min);
        let maxs = points(|d: &DailySummary| d.temp_max);

        match style {
            ChartStyle::Bar => {
                let min_bars = mins.iter().map(|&(x, v)| bar(x - BAR_WIDTH, x, v, MIN_COLOR));
                let max_bars = maxs.iter().map(|&(x, v)| bar(x, x + BAR_WIDTH, v, MAX_COLOR));
                chart
                    .draw_series(min_bars)
                    .map_err(draw_err)?
                    .label("Min")
                    .legend(|(x, y)| legend_box(x, y, MIN_COLOR));
                chart
                    .draw_series(max_bars)
                    .map_err(draw_err)?
                    .label("Max")
                    .legend(|(x, y)| legend_box(x, y, MAX_COLOR));

                let half = BAR_WIDTH / 2.0;
                let labels = mins
                    .iter()
                    .map(|&(x, v)| (x - half, v))
                    .chain(maxs.iter().map(|&(x, v)| (x + half, v)));
                chart
                    .draw_series(labels.map(|(x, v)| {
                        Text::new(degrees(v), (x, v + 1.0), value_label(VPos::Bottom))
                    }))
                    .map_err(draw_err)?;
            }
            ChartStyle::Line => {
                let series = [(&mins, MIN_COLOR, "Min"), (&maxs, MAX_COLOR, "Max")];
                for (points, color, name) in series {
                    let line = LineSeries::new(points.iter().copied(), color.stroke_width(2));
                    let markers = points.iter().map(|&p| Circle::new(p, 4, color.filled()));
                    chart
                        .draw_series(line)
                        .map_err(draw_err)?
                        .label(name)
                        .legend(move |(x, y)| legend_line(x, y, color));
                    chart.draw_series(markers).map_err(draw_err)?;
                }

                // min labels sit below the line, max labels above
                chart
                    .draw_series(mins.iter().map(|&(x, v)| {
                        Text::new(degrees(v), (x, v - 2.0), value_label(VPos::Top))
                    }))
                    .map_err(draw_err)?;
                chart
                    .draw_series(maxs.iter().map(|&(x, v)| {
                        Text::new(degrees(v), (x, v + 2.0), value_label(VPos::Bottom))
                    }))
                    .map_err(draw_err)?;
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}

/// Daily humidity (the day's highest reading) as bars.
pub fn humidity_chart(days: &[DailySummary]) -> Result<String> {
    if days.is_empty() {
        bail!("No forecast days to chart");
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("5-Day Humidity Forecast", (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range(days.len()), 0.0..110.0)
            .map_err(draw_err)?;

        let label = |x: &f64| day_label(days, *x);
        chart
            .configure_mesh()
            .x_labels(days.len())
            .x_label_formatter(&label)
            .x_desc("Date")
            .y_desc("Humidity (%)")
            .bold_line_style(BLACK.mix(0.1))
            .light_line_style(BLACK.mix(0.03))
            .draw()
            .map_err(draw_err)?;

        let half = BAR_WIDTH;
        chart
            .draw_series(days.iter().enumerate().map(|(i, d)| {
                let x = i as f64;
                bar(x - half, x + half, f64::from(d.humidity_repr), MIN_COLOR)
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(days.iter().enumerate().map(|(i, d)| {
                let v = f64::from(d.humidity_repr);
                let label = format!("{}%", d.humidity_repr);
                Text::new(label, (i as f64, v + 2.0), value_label(VPos::Bottom))
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}
