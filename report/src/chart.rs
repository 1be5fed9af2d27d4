//! Chart rendering
//!
//! In a report a chart is split in two: the plot area (grid and series
//! lines) is rasterized with plotters, while the title, tick labels, axis
//! titles and legend are drawn as PDF text around the raster so they stay
//! sharp and searchable. PNG exports are drawn entirely by plotters with an
//! embedded font.

use std::path::Path;
use std::sync::OnceLock;
use log::debug;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use labreport_core::transform::{PlotDataset, PlotGroup};

use crate::error::{to_render_error, Result};
use crate::layout::{Align, DrawOp, Rgb};
use crate::raster::{ImageId, ImageStore, Raster};
use crate::text::{text_width, Font};

/// Series colours, cycled
pub const SERIES_COLORS: [(u8, u8, u8); 4] = [
    (0x1f, 0x77, 0xb4),
    (0xff, 0x7f, 0x0e),
    (0x2c, 0xa0, 0x2c),
    (0xd6, 0x27, 0x28),
];

/// Message drawn in place of a chart without data
pub const NO_DATA_MESSAGE: &str = "No valid data to plot";

/// Raster pixels per point of plot area
const RASTER_SCALE: f64 = 3.0;

/// Series stroke in raster pixels
const LINE_WIDTH: u32 = 3;

const TARGET_TICKS: f64 = 6.0;

/// Font family used for text in exported images
const EXPORT_FONT: &str = "sans-serif";

// Space around the plot area inside a chart block, in points
const INSET_LEFT: f64 = 44.0;
const INSET_RIGHT: f64 = 8.0;
const INSET_TOP: f64 = 16.0;
const INSET_BOTTOM: f64 = 26.0;

const TITLE_SIZE: f64 = 9.0;
const AXIS_TITLE_SIZE: f64 = 7.0;
const TICK_LABEL_SIZE: f64 = 6.0;
const TICK_LENGTH: f64 = 3.0;
const LEGEND_SIZE: f64 = 6.0;
const LEGEND_ROW: f64 = 9.0;
const LEGEND_SAMPLE: f64 = 12.0;

/// Colour of series `index`
pub fn series_rgb(index: usize) -> (u8, u8, u8) {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// A "nice" tick step giving about `target` intervals over `span`
pub fn nice_step(span: f64, target: f64) -> f64 {
    let raw = span / target;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 2.5 {
        2.5
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Decimals needed to print multiples of `step` exactly, at most 4
pub fn tick_decimals(step: f64) -> usize {
    (0..=4)
        .find(|d| {
            let scaled = step * 10f64.powi(*d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(4)
}

/// One chart axis: data range and tick positions
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Lower end of the axis
    pub min: f64,

    /// Upper end of the axis
    pub max: f64,

    /// Tick values inside the range
    pub ticks: Vec<f64>,

    /// Decimals used for tick labels
    pub decimals: usize,
}

impl Axis {
    /// Axis covering `values` with 5% padding; None when nothing is finite
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Option<Axis> {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let (min, max) = if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
            (lo - pad, hi + pad)
        } else {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        };

        let step = nice_step(max - min, TARGET_TICKS);
        let first = (min / step).ceil() as i64;
        let last = (max / step).floor() as i64;
        let ticks = (first..=last).map(|k| k as f64 * step).collect();

        Some(Axis {
            min,
            max,
            ticks,
            decimals: tick_decimals(step),
        })
    }

    /// Map `value` onto a segment starting at `start` of length `length`
    pub fn position(&self, value: f64, start: f64, length: f64) -> f64 {
        start + (value - self.min) / (self.max - self.min) * length
    }

    /// Tick label text
    pub fn label(&self, value: f64) -> String {
        let text = format!("{:.*}", self.decimals, value);
        match text.strip_prefix('-') {
            Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
            _ => text,
        }
    }
}

/// Axes of a group, or None when no dataset has a point
pub fn fit_axes(group: &PlotGroup) -> Option<(Axis, Axis)> {
    let x = Axis::fit(group.datasets.iter().flat_map(|d| d.x.iter().copied()))?;
    let y = Axis::fit(group.datasets.iter().flat_map(|d| d.y.iter().copied()))?;
    Some((x, y))
}

/// Rasterize grid and series of a plot area
pub fn render_plot_area(datasets: &[PlotDataset], x: &Axis, y: &Axis, width: u32, height: u32) -> Result<Raster> {
    let mut buffer = vec![255u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(to_render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .build_cartesian_2d(x.min..x.max, y.min..y.max)
            .map_err(to_render_error)?;

        let grid = RGBColor(0xdd, 0xdd, 0xdd);
        chart
            .draw_series(
                x.ticks
                    .iter()
                    .map(|&t| PathElement::new(vec![(t, y.min), (t, y.max)], grid.stroke_width(1))),
            )
            .map_err(to_render_error)?;
        chart
            .draw_series(
                y.ticks
                    .iter()
                    .map(|&t| PathElement::new(vec![(x.min, t), (x.max, t)], grid.stroke_width(1))),
            )
            .map_err(to_render_error)?;

        for (i, dataset) in datasets.iter().enumerate() {
            let (r, g, b) = series_rgb(i);
            chart
                .draw_series(LineSeries::new(
                    dataset.x.iter().copied().zip(dataset.y.iter().copied()),
                    RGBColor(r, g, b).stroke_width(LINE_WIDTH),
                ))
                .map_err(to_render_error)?;
        }

        root.present().map_err(to_render_error)?;
    }

    Raster::new(width, height, buffer)
}

fn ensure_export_font() -> Result<()> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(EXPORT_FONT, FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT)
                .map_err(|_| "embedded chart font is invalid".to_string())
        })
        .clone()
        .map_err(crate::error::ReportError::Render)
}

/// Rasterize a complete chart: title, axes with tick labels and titles,
/// grid, series and legend
pub fn render_chart(group: &PlotGroup, x: &Axis, y: &Axis, width: u32, height: u32) -> Result<Raster> {
    ensure_export_font()?;

    let mut buffer = vec![255u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(to_render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&group.title, (EXPORT_FONT, 24))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x.min..x.max, y.min..y.max)
            .map_err(to_render_error)?;

        chart
            .configure_mesh()
            .x_desc(group.x_label.as_str())
            .y_desc(group.y_label.as_str())
            .x_label_formatter(&|v| x.label(*v))
            .y_label_formatter(&|v| y.label(*v))
            .light_line_style(&WHITE)
            .draw()
            .map_err(to_render_error)?;

        for (i, dataset) in group.datasets.iter().enumerate() {
            let (r, g, b) = series_rgb(i);
            let color = RGBColor(r, g, b);
            chart
                .draw_series(LineSeries::new(
                    dataset.x.iter().copied().zip(dataset.y.iter().copied()),
                    color.stroke_width(LINE_WIDTH),
                ))
                .map_err(to_render_error)?
                .label(dataset.label.as_str())
                .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(LINE_WIDTH)));
        }

        if !group.datasets.is_empty() {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(to_render_error)?;
        }

        root.present().map_err(to_render_error)?;
    }

    Raster::new(width, height, buffer)
}

/// Save `group` as a labelled PNG chart.
///
/// Returns false without writing anything when the group has no data.
pub fn export_png(group: &PlotGroup, width: u32, height: u32, path: &Path) -> Result<bool> {
    let Some((x, y)) = fit_axes(group) else {
        return Ok(false);
    };
    render_chart(group, &x, &y, width, height)?.save_png(path)?;
    debug!("Exported chart '{}' to {}", group.title, path.display());
    Ok(true)
}

/// A chart ready to be placed on a page
#[derive(Debug, Clone)]
pub struct ChartBlock {
    /// Chart title
    pub title: String,

    /// X axis title
    pub x_label: String,

    /// Y axis title
    pub y_label: String,

    /// Legend entries and their colours
    pub legend: Vec<(String, Rgb)>,

    /// Axes and plot raster; None for a chart without data
    pub plot: Option<(Axis, Axis, ImageId)>,

    /// Block width in points
    pub width: f64,

    /// Block height in points
    pub height: f64,
}

impl ChartBlock {
    /// Rasterize `group` for a block of `width` x `height` points and
    /// register the raster in `images`
    pub fn new(group: &PlotGroup, width: f64, height: f64, images: &mut ImageStore) -> Result<Self> {
        let legend = group
            .datasets
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let (r, g, b) = series_rgb(i);
                (d.label.clone(), Rgb::from_rgb8(r, g, b))
            })
            .collect();

        let plot = match fit_axes(group) {
            Some((x, y)) => {
                let (area_width, area_height) = plot_area_size(width, height);
                let raster = render_plot_area(
                    &group.datasets,
                    &x,
                    &y,
                    (area_width * RASTER_SCALE).round().max(1.0) as u32,
                    (area_height * RASTER_SCALE).round().max(1.0) as u32,
                )?;
                Some((x, y, images.add(raster)))
            }
            None => {
                debug!("Chart '{}' has no data", group.title);
                None
            }
        };

        Ok(ChartBlock {
            title: group.title.clone(),
            x_label: group.x_label.clone(),
            y_label: group.y_label.clone(),
            legend,
            plot,
            width,
            height,
        })
    }

    /// Drawing instructions for the block with its top-left corner at
    /// (`left`, `top`)
    pub fn draw(&self, left: f64, top: f64) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        let (area_width, area_height) = plot_area_size(self.width, self.height);
        let area_left = left + INSET_LEFT;
        let area_bottom = top - INSET_TOP - area_height;

        ops.push(DrawOp::text(
            left + self.width / 2.0,
            top - TITLE_SIZE,
            Font::Bold,
            TITLE_SIZE,
            Rgb::BLACK,
            &self.title,
            Align::Center,
        ));

        let Some((x, y, image)) = &self.plot else {
            ops.push(frame(area_left, area_bottom, area_width, area_height));
            ops.push(DrawOp::text(
                area_left + area_width / 2.0,
                area_bottom + area_height / 2.0,
                Font::Regular,
                TITLE_SIZE,
                Rgb::BLACK,
                NO_DATA_MESSAGE,
                Align::Center,
            ));
            return ops;
        };

        ops.push(DrawOp::Image {
            id: *image,
            x: area_left,
            y: area_bottom,
            width: area_width,
            height: area_height,
        });
        ops.push(frame(area_left, area_bottom, area_width, area_height));

        for &tick in &x.ticks {
            let px = x.position(tick, area_left, area_width);
            ops.push(DrawOp::line((px, area_bottom), (px, area_bottom - TICK_LENGTH), 0.5, Rgb::BLACK));
            ops.push(DrawOp::text(
                px,
                area_bottom - TICK_LENGTH - TICK_LABEL_SIZE - 1.0,
                Font::Regular,
                TICK_LABEL_SIZE,
                Rgb::BLACK,
                &x.label(tick),
                Align::Center,
            ));
        }
        for &tick in &y.ticks {
            let py = y.position(tick, area_bottom, area_height);
            ops.push(DrawOp::line((area_left, py), (area_left - TICK_LENGTH, py), 0.5, Rgb::BLACK));
            ops.push(DrawOp::text(
                area_left - TICK_LENGTH - 2.0,
                py - TICK_LABEL_SIZE * 0.35,
                Font::Regular,
                TICK_LABEL_SIZE,
                Rgb::BLACK,
                &y.label(tick),
                Align::Right,
            ));
        }

        ops.push(DrawOp::text(
            area_left + area_width / 2.0,
            top - self.height + 2.0,
            Font::Regular,
            AXIS_TITLE_SIZE,
            Rgb::BLACK,
            &self.x_label,
            Align::Center,
        ));
        ops.push(DrawOp::Text {
            x: left + AXIS_TITLE_SIZE + 1.0,
            y: area_bottom + (area_height - text_width(Font::Regular, AXIS_TITLE_SIZE, &self.y_label)) / 2.0,
            font: Font::Regular,
            size: AXIS_TITLE_SIZE,
            color: Rgb::BLACK,
            text: self.y_label.clone(),
            rotated: true,
        });

        ops.extend(self.legend_ops(area_left + area_width, area_bottom + area_height));
        ops
    }

    /// Legend box in the top-right corner of the plot area
    fn legend_ops(&self, right: f64, top: f64) -> Vec<DrawOp> {
        if self.legend.is_empty() {
            return Vec::new();
        }

        let label_width = self
            .legend
            .iter()
            .map(|(label, _)| text_width(Font::Regular, LEGEND_SIZE, label))
            .fold(0.0, f64::max);
        let width = LEGEND_SAMPLE + label_width + 10.0;
        let height = self.legend.len() as f64 * LEGEND_ROW + 4.0;
        let x = right - width - 4.0;
        let y = top - height - 4.0;

        let mut ops = vec![DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill: Some(Rgb::WHITE),
            stroke: Some((Rgb::grey(0.8), 0.5)),
        }];

        for (i, (label, color)) in self.legend.iter().enumerate() {
            let row_mid = top - 4.0 - 2.0 - LEGEND_ROW * (i as f64 + 0.5);
            ops.push(DrawOp::line((x + 3.0, row_mid), (x + 3.0 + LEGEND_SAMPLE, row_mid), 1.0, *color));
            ops.push(DrawOp::text(
                x + LEGEND_SAMPLE + 6.0,
                row_mid - LEGEND_SIZE * 0.35,
                Font::Regular,
                LEGEND_SIZE,
                Rgb::BLACK,
                label,
                Align::Left,
            ));
        }
        ops
    }
}

fn plot_area_size(width: f64, height: f64) -> (f64, f64) {
    (
        (width - INSET_LEFT - INSET_RIGHT).max(1.0),
        (height - INSET_TOP - INSET_BOTTOM).max(1.0),
    )
}

fn frame(x: f64, y: f64, width: f64, height: f64) -> DrawOp {
    DrawOp::Rect {
        x,
        y,
        width,
        height,
        fill: None,
        stroke: Some((Rgb::BLACK, 0.8)),
    }
}
