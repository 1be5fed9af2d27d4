//! Page layout
//!
//! The first phase of report generation. A report body is a list of
//! [`Flowable`]s which [`layout`] flows down the frame of consecutive pages,
//! producing positioned [`DrawOp`]s per page. Page decorations that depend
//! on the total page count are added later by the writer.
//!
//! Coordinates are PDF points with the origin at the bottom left.

use log::{debug, warn};

use labreport_core::transform::{DataTable, InfoTable};

use crate::chart::ChartBlock;
use crate::error::{ReportError, Result};
use crate::raster::ImageId;
use crate::text::{text_width, wrap_text, Font};

/// A4 width in points
pub const A4_WIDTH: f64 = 595.28;

/// A4 height in points
pub const A4_HEIGHT: f64 = 841.89;

/// Points per inch
pub const INCH: f64 = 72.0;

/// RGB colour with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    /// Black
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// White
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

    /// Grey of the given level
    pub const fn grey(level: f64) -> Rgb {
        Rgb(level, level, level)
    }

    /// Colour from 8-bit components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Rgb {
        Rgb(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0)
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Start at x
    Left,

    /// Centre on x
    Center,

    /// End at x
    Right,
}

/// A positioned drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Single line of text; `x`/`y` is the start of the baseline
    Text {
        /// Baseline start x
        x: f64,
        /// Baseline y
        y: f64,
        /// Font
        font: Font,
        /// Size in points
        size: f64,
        /// Fill colour
        color: Rgb,
        /// Text
        text: String,
        /// Run bottom to top instead of left to right
        rotated: bool,
    },

    /// Straight stroked line
    Line {
        /// Start point
        from: (f64, f64),
        /// End point
        to: (f64, f64),
        /// Stroke width
        width: f64,
        /// Stroke colour
        color: Rgb,
    },

    /// Rectangle, filled and/or stroked
    Rect {
        /// Left
        x: f64,
        /// Bottom
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
        /// Fill colour
        fill: Option<Rgb>,
        /// Stroke colour and width
        stroke: Option<(Rgb, f64)>,
    },

    /// Registered image scaled into a box
    Image {
        /// Image handle
        id: ImageId,
        /// Left
        x: f64,
        /// Bottom
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
    },
}

impl DrawOp {
    /// Horizontal text aligned on `x`
    pub fn text(x: f64, y: f64, font: Font, size: f64, color: Rgb, text: &str, align: Align) -> DrawOp {
        let width = text_width(font, size, text);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text: text.to_string(),
            rotated: false,
        }
    }

    /// Stroked line
    pub fn line(from: (f64, f64), to: (f64, f64), width: f64, color: Rgb) -> DrawOp {
        DrawOp::Line { from, to, width, color }
    }

    /// Text of this op, if it is a text op
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Page size and body frame margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub width: f64,

    /// Page height
    pub height: f64,

    /// Left margin
    pub margin_left: f64,

    /// Right margin
    pub margin_right: f64,

    /// Top margin
    pub margin_top: f64,

    /// Bottom margin, clear of the running footer
    pub margin_bottom: f64,
}

impl PageGeometry {
    /// A4 portrait with one-inch side margins
    pub fn a4() -> Self {
        PageGeometry {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin_left: INCH,
            margin_right: INCH,
            margin_top: INCH,
            margin_bottom: 96.0,
        }
    }

    /// Left edge of the frame
    pub fn frame_left(&self) -> f64 {
        self.margin_left
    }

    /// Width of the frame
    pub fn frame_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Top edge of the frame
    pub fn frame_top(&self) -> f64 {
        self.height - self.margin_top
    }

    /// Bottom edge of the frame
    pub fn frame_bottom(&self) -> f64 {
        self.margin_bottom
    }

    /// Height of the frame
    pub fn frame_height(&self) -> f64 {
        self.frame_top() - self.frame_bottom()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Content of one laid-out page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Drawing instructions in paint order
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text on the page, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::as_text)
    }
}

/// Widths in the exact proportion of `ratios`, summing to `width`
pub fn calculate_table_col_widths(ratios: &[f64], width: f64) -> Result<Vec<f64>> {
    if ratios.is_empty() {
        return Err(ReportError::InvalidColumnRatios("no ratios given".to_string()));
    }
    if let Some(bad) = ratios.iter().find(|r| !r.is_finite() || **r <= 0.0) {
        return Err(ReportError::InvalidColumnRatios(format!(
            "ratios must be positive and finite, got {}",
            bad
        )));
    }
    if !width.is_finite() || width <= 0.0 {
        return Err(ReportError::InvalidColumnRatios(format!("table width must be positive, got {}", width)));
    }

    let total: f64 = ratios.iter().sum();
    Ok(ratios.iter().map(|r| r / total * width).collect())
}

/// How a data table divides its width between columns
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnWidths {
    /// Every column gets the same width
    Equal,

    /// Columns in the given proportion
    Ratios(Vec<f64>),
}

impl ColumnWidths {
    /// Widths for `columns` columns across `width`.
    ///
    /// Ratios that do not match the column count fall back to equal widths.
    pub fn resolve(&self, columns: usize, width: f64) -> Result<Vec<f64>> {
        if columns == 0 {
            return Ok(Vec::new());
        }
        match self {
            ColumnWidths::Ratios(ratios) if ratios.len() == columns => calculate_table_col_widths(ratios, width),
            ColumnWidths::Ratios(ratios) => {
                warn!(
                    "{} column ratios for {} columns, using equal widths",
                    ratios.len(),
                    columns
                );
                calculate_table_col_widths(&vec![1.0; columns], width)
            }
            ColumnWidths::Equal => calculate_table_col_widths(&vec![1.0; columns], width),
        }
    }
}

/// Block-level content of a report body
#[derive(Debug, Clone)]
pub enum Flowable {
    /// Vertical gap
    Spacer(f64),

    /// Wrapped text
    Paragraph {
        /// Text; newlines force breaks
        text: String,
        /// Font
        font: Font,
        /// Size in points
        size: f64,
        /// Distance between baselines
        leading: f64,
        /// Alignment within the frame
        align: Align,
    },

    /// Registered image centred in the frame
    Image {
        /// Image handle
        id: ImageId,
        /// Drawn width
        width: f64,
        /// Drawn height
        height: f64,
    },

    /// Horizontal rule across the frame
    Rule(f64),

    /// Two-column label/value table
    InfoTable(InfoTable),

    /// Measurement table
    DataTable {
        /// Table content
        table: DataTable,
        /// Column width policy
        widths: ColumnWidths,
    },

    /// Chart with its plot area raster
    Chart(ChartBlock),

    /// Continue on a new page
    PageBreak,
}

/// Info table column proportions: label, value, label, value
const INFO_COLUMN_RATIOS: [f64; 4] = [1.3, 1.0, 1.3, 1.0];
const INFO_ROW_HEIGHT: f64 = 20.0;
const INFO_FONT_SIZE: f64 = 9.0;
const INFO_LEADING: f64 = 11.0;
const CELL_PADDING: f64 = 4.0;

const TABLE_FONT_SIZE: f64 = 8.0;
const TABLE_MIN_FONT_SIZE: f64 = 5.0;
const TABLE_HEADER_FILL: Rgb = Rgb::grey(0.9021);
const TABLE_STRIPE_FILL: Rgb = Rgb::grey(0.93);
const TABLE_GRID_WIDTH: f64 = 0.25;

/// Flow `flowables` onto pages of `geometry`
pub fn layout(flowables: &[Flowable], geometry: &PageGeometry) -> Result<Vec<Page>> {
    let mut composer = Composer::new(geometry);

    for flowable in flowables {
        match flowable {
            Flowable::Spacer(height) => composer.spacer(*height),
            Flowable::Paragraph {
                text,
                font,
                size,
                leading,
                align,
            } => composer.paragraph(text, *font, *size, *leading, *align),
            Flowable::Image { id, width, height } => composer.image(*id, *width, *height),
            Flowable::Rule(thickness) => composer.rule(*thickness),
            Flowable::InfoTable(table) => composer.info_table(table)?,
            Flowable::DataTable { table, widths } => composer.data_table(table, widths)?,
            Flowable::Chart(chart) => composer.chart(chart),
            Flowable::PageBreak => composer.new_page(),
        }
    }

    let mut pages = composer.pages;
    if pages.len() > 1 && pages.last().map_or(false, |p| p.ops.is_empty()) {
        pages.pop();
    }
    debug!("Laid out {} flowables on {} pages", flowables.len(), pages.len());
    Ok(pages)
}

/// Cursor over the frames of consecutive pages
struct Composer<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<Page>,
    y: f64,
}

impl<'a> Composer<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Composer {
            geometry,
            pages: vec![Page::default()],
            y: geometry.frame_top(),
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn remaining(&self) -> f64 {
        self.y - self.geometry.frame_bottom()
    }

    fn at_top(&self) -> bool {
        (self.geometry.frame_top() - self.y).abs() < 1e-6
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.frame_top();
    }

    /// Move to a new page unless `height` fits or the page is still blank
    fn ensure(&mut self, height: f64) {
        if height > self.remaining() + 1e-6 && !self.at_top() {
            self.new_page();
        }
    }

    fn spacer(&mut self, height: f64) {
        if height > self.remaining() {
            // a gap is never carried onto the next page
            self.new_page();
        } else {
            self.y -= height;
        }
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f64, leading: f64, align: Align) {
        let left = self.geometry.frame_left();
        let width = self.geometry.frame_width();
        let x = match align {
            Align::Left => left,
            Align::Center => left + width / 2.0,
            Align::Right => left + width,
        };

        for line in wrap_text(text, font, size, width) {
            self.ensure(leading);
            let baseline = self.y - leading * 0.8;
            self.push(DrawOp::text(x, baseline, font, size, Rgb::BLACK, &line, align));
            self.y -= leading;
        }
    }

    fn image(&mut self, id: ImageId, width: f64, height: f64) {
        let frame_height = self.geometry.frame_height();
        let frame_width = self.geometry.frame_width();
        let scale = (frame_height / height).min(frame_width / width).min(1.0);
        let (width, height) = (width * scale, height * scale);

        self.ensure(height);
        let x = self.geometry.frame_left() + (frame_width - width) / 2.0;
        self.push(DrawOp::Image {
            id,
            x,
            y: self.y - height,
            width,
            height,
        });
        self.y -= height;
    }

    fn rule(&mut self, thickness: f64) {
        self.ensure(thickness);
        let y = self.y - thickness / 2.0;
        let left = self.geometry.frame_left();
        self.push(DrawOp::line(
            (left, y),
            (left + self.geometry.frame_width(), y),
            thickness,
            Rgb::BLACK,
        ));
        self.y -= thickness;
    }

    fn info_table(&mut self, table: &InfoTable) -> Result<()> {
        let left = self.geometry.frame_left();
        let widths = calculate_table_col_widths(&INFO_COLUMN_RATIOS, self.geometry.frame_width())?;
        let total: f64 = widths.iter().sum();

        for row in &table.rows {
            let cells = [
                (row.left_label.as_str(), Font::Bold),
                (row.left_value.as_str(), Font::Regular),
                (row.right_label.as_str(), Font::Bold),
                (row.right_value.as_str(), Font::Regular),
            ];
            let wrapped: Vec<Vec<String>> = cells
                .iter()
                .zip(&widths)
                .map(|((text, font), w)| wrap_text(text, *font, INFO_FONT_SIZE, w - 2.0 * CELL_PADDING))
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);

            // rows taller than the space left continue on the next page
            let mut start = 0;
            loop {
                let left_over = lines - start;
                self.ensure(INFO_ROW_HEIGHT.max(left_over as f64 * INFO_LEADING + 2.0 * CELL_PADDING));
                let fit = ((self.remaining() - 2.0 * CELL_PADDING) / INFO_LEADING).floor().max(1.0) as usize;
                let take = left_over.min(fit);
                let height = INFO_ROW_HEIGHT.max(take as f64 * INFO_LEADING + 2.0 * CELL_PADDING);

                let top = self.y;
                let mut x = left;
                for ((cell_lines, (_, font)), w) in wrapped.iter().zip(&cells).zip(&widths) {
                    let chunk: Vec<&String> = cell_lines.iter().skip(start).take(take).collect();
                    let block = chunk.len() as f64 * INFO_LEADING;
                    let mut baseline = top - (height - block) / 2.0 - INFO_LEADING * 0.8;
                    for line in chunk {
                        self.push(DrawOp::text(
                            x + CELL_PADDING,
                            baseline,
                            *font,
                            INFO_FONT_SIZE,
                            Rgb::BLACK,
                            line,
                            Align::Left,
                        ));
                        baseline -= INFO_LEADING;
                    }
                    x += w;
                }
                self.push(DrawOp::line(
                    (left, top - height),
                    (left + total, top - height),
                    TABLE_GRID_WIDTH,
                    Rgb::grey(0.7),
                ));
                self.y -= height;

                start += take;
                if start >= lines {
                    break;
                }
                self.new_page();
            }
        }

        Ok(())
    }

    fn data_table(&mut self, table: &DataTable, widths: &ColumnWidths) -> Result<()> {
        let headers = table.full_headers();
        let rows = table.full_rows();
        let frame_width = self.geometry.frame_width();
        let widths = widths.resolve(headers.len(), frame_width)?;
        if widths.is_empty() {
            return Ok(());
        }

        let total: f64 = widths.iter().sum::<f64>().min(frame_width);
        let left = self.geometry.frame_left() + (frame_width - total) / 2.0;
        let row_height = self.geometry.height * 0.03;
        let header_height = row_height * 1.5;

        if header_height + row_height > self.geometry.frame_height() {
            return Err(ReportError::Layout("table rows taller than the page frame".to_string()));
        }

        let mut remaining = rows.as_slice();
        loop {
            let first_row = if remaining.is_empty() { 0.0 } else { row_height };
            self.ensure(header_height + first_row);
            let top = self.y;
            self.table_header(&headers, &widths, left, top, header_height);
            self.y -= header_height;

            let fit = ((self.remaining() + 1e-6) / row_height).floor().max(1.0) as usize;
            let (chunk, rest) = remaining.split_at(fit.min(remaining.len()));
            for (i, row) in chunk.iter().enumerate() {
                self.table_row(row, &widths, left, self.y, row_height, i % 2 == 1);
                self.y -= row_height;
            }
            self.table_grid(&widths, left, top, self.y, header_height, row_height, chunk.len());

            remaining = rest;
            if remaining.is_empty() {
                break;
            }
            self.new_page();
        }

        Ok(())
    }

    fn table_header(&mut self, headers: &[String], widths: &[f64], left: f64, top: f64, height: f64) {
        let total: f64 = widths.iter().sum();
        self.push(DrawOp::Rect {
            x: left,
            y: top - height,
            width: total,
            height,
            fill: Some(TABLE_HEADER_FILL),
            stroke: None,
        });

        let leading = TABLE_FONT_SIZE * 1.2;
        let mut x = left;
        for (header, w) in headers.iter().zip(widths) {
            let lines = wrap_text(header, Font::Bold, TABLE_FONT_SIZE, w - CELL_PADDING);
            let block = lines.len() as f64 * leading;
            let mut baseline = top - (height - block).max(0.0) / 2.0 - leading * 0.8;
            for line in &lines {
                self.push(DrawOp::text(
                    x + w / 2.0,
                    baseline,
                    Font::Bold,
                    TABLE_FONT_SIZE,
                    Rgb::BLACK,
                    line,
                    Align::Center,
                ));
                baseline -= leading;
            }
            x += w;
        }
    }

    fn table_row(&mut self, row: &[String], widths: &[f64], left: f64, top: f64, height: f64, striped: bool) {
        let total: f64 = widths.iter().sum();
        self.push(DrawOp::Rect {
            x: left,
            y: top - height,
            width: total,
            height,
            fill: Some(if striped { TABLE_STRIPE_FILL } else { Rgb::WHITE }),
            stroke: None,
        });

        let mut x = left;
        for (cell, w) in row.iter().zip(widths) {
            let size = fitted_size(cell, Font::Regular, w - CELL_PADDING);
            let baseline = top - height / 2.0 - size * 0.35;
            self.push(DrawOp::text(x + w / 2.0, baseline, Font::Regular, size, Rgb::BLACK, cell, Align::Center));
            x += w;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn table_grid(
        &mut self,
        widths: &[f64],
        left: f64,
        top: f64,
        bottom: f64,
        header_height: f64,
        row_height: f64,
        rows: usize,
    ) {
        let total: f64 = widths.iter().sum();

        let mut y = top - header_height;
        for _ in 0..rows {
            self.push(DrawOp::line((left, y), (left + total, y), TABLE_GRID_WIDTH, Rgb::BLACK));
            y -= row_height;
        }

        let mut x = left;
        for w in &widths[..widths.len() - 1] {
            x += w;
            self.push(DrawOp::line((x, top), (x, bottom), TABLE_GRID_WIDTH, Rgb::BLACK));
        }

        self.push(DrawOp::Rect {
            x: left,
            y: bottom,
            width: total,
            height: top - bottom,
            fill: None,
            stroke: Some((Rgb::BLACK, TABLE_GRID_WIDTH)),
        });
    }

    fn chart(&mut self, chart: &ChartBlock) {
        self.ensure(chart.height);
        let x = self.geometry.frame_left() + (self.geometry.frame_width() - chart.width) / 2.0;
        for op in chart.draw(x, self.y) {
            self.push(op);
        }
        self.y -= chart.height;
    }
}

/// Largest size up to the table font size at which `text` fits `width`
fn fitted_size(text: &str, font: Font, width: f64) -> f64 {
    let natural = text_width(font, TABLE_FONT_SIZE, text);
    if natural <= width || natural == 0.0 {
        return TABLE_FONT_SIZE;
    }
    (TABLE_FONT_SIZE * width / natural).max(TABLE_MIN_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labreport_core::transform::InfoRow;
    use proptest::prelude::*;
    use rstest::rstest;

    fn data_table(rows: usize) -> DataTable {
        DataTable {
            row_header: "No".to_string(),
            headers: vec!["A".to_string(), "B".to_string()],
            row_labels: (1..=rows).map(|i| i.to_string()).collect(),
            cells: (0..rows).map(|i| vec![format!("{}.0", i), "-".to_string()]).collect(),
            column_ratios: None,
        }
    }

    #[test]
    fn test_col_widths_in_ratio() {
        let widths = calculate_table_col_widths(&[3.0, 5.0, 8.0, 8.0, 8.0], 800.0).unwrap();
        assert_eq!(widths.len(), 5);
        assert!((widths.iter().sum::<f64>() - 800.0).abs() < 1e-9);
        assert!((widths[0] - 75.0).abs() < 1e-9);
        assert!((widths[1] - 125.0).abs() < 1e-9);
        assert!((widths[4] - 200.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[1.0, 0.0])]
    #[case(&[1.0, -2.0])]
    #[case(&[f64::NAN])]
    #[case(&[f64::INFINITY, 1.0])]
    fn test_col_widths_rejected(#[case] ratios: &[f64]) {
        assert!(matches!(
            calculate_table_col_widths(ratios, 100.0),
            Err(ReportError::InvalidColumnRatios(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_col_widths_sum_and_proportion(
            ratios in prop::collection::vec(0.01f64..100.0, 1..12),
            width in 1.0f64..2000.0,
        ) {
            let widths = calculate_table_col_widths(&ratios, width).unwrap();
            prop_assert_eq!(widths.len(), ratios.len());
            prop_assert!((widths.iter().sum::<f64>() - width).abs() < 1e-6 * width);
            for (w, r) in widths.iter().zip(&ratios) {
                prop_assert!((w / widths[0] - r / ratios[0]).abs() < 1e-6 * (r / ratios[0]).max(1.0));
            }
        }
    }

    #[test]
    fn test_mismatched_ratios_fall_back_to_equal() {
        let widths = ColumnWidths::Ratios(vec![1.0, 2.0]).resolve(4, 400.0).unwrap();
        assert_eq!(widths, vec![100.0; 4]);
        assert!(ColumnWidths::Ratios(vec![1.0, 0.0]).resolve(2, 400.0).is_err());
    }

    #[test]
    fn test_page_break_and_trailing_empty_page() {
        let geometry = PageGeometry::a4();
        let flowables = vec![
            Flowable::Spacer(10.0),
            Flowable::PageBreak,
            Flowable::Rule(1.0),
            Flowable::PageBreak,
        ];
        let pages = layout(&flowables, &geometry).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].ops.is_empty());
        assert_eq!(pages[1].ops.len(), 1);
    }

    #[test]
    fn test_paragraph_wraps_inside_frame() {
        let geometry = PageGeometry::a4();
        let text = "lorem ipsum ".repeat(60);
        let pages = layout(
            &[Flowable::Paragraph {
                text,
                font: Font::Regular,
                size: 9.0,
                leading: 14.0,
                align: Align::Left,
            }],
            &geometry,
        )
        .unwrap();
        assert_eq!(pages.len(), 1);
        for op in &pages[0].ops {
            if let DrawOp::Text { x, text, size, font, .. } = op {
                assert!(*x >= geometry.frame_left());
                assert!(x + text_width(*font, *size, text) <= geometry.frame_left() + geometry.frame_width() + 1e-6);
            }
        }
        assert!(pages[0].ops.len() > 1);
    }

    #[test]
    fn test_info_table_cells() {
        let table = InfoTable {
            rows: vec![InfoRow {
                left_label: "Test Id".to_string(),
                left_value: "564".to_string(),
                right_label: "Operator".to_string(),
                right_value: "-".to_string(),
            }],
        };
        let pages = layout(&[Flowable::InfoTable(table)], &PageGeometry::a4()).unwrap();
        let texts: Vec<&str> = pages[0].texts().collect();
        assert_eq!(texts, vec!["Test Id", "564", "Operator", "-"]);
    }

    #[test]
    fn test_tall_info_row_continues_on_next_page() {
        let geometry = PageGeometry::a4();
        let note = "uzun aciklama metni ".repeat(400);
        let table = InfoTable {
            rows: vec![
                InfoRow {
                    left_label: "Deney No:".to_string(),
                    left_value: "564".to_string(),
                    right_label: "Note:".to_string(),
                    right_value: note.clone(),
                },
                InfoRow {
                    left_label: "Testi Yapan:".to_string(),
                    left_value: "Ayse".to_string(),
                    right_label: String::new(),
                    right_value: String::new(),
                },
            ],
        };
        let pages = layout(&[Flowable::InfoTable(table)], &geometry).unwrap();
        assert!(pages.len() >= 2);

        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= geometry.frame_bottom() - 1e-6);
                    assert!(*y <= geometry.frame_top() + 1e-6);
                }
                if let DrawOp::Line { from, .. } = op {
                    assert!(from.1 >= geometry.frame_bottom() - 1e-6);
                }
            }
        }

        // every word is drawn exactly once
        let words: usize = pages
            .iter()
            .flat_map(|p| p.texts())
            .map(|t| t.matches("aciklama").count())
            .sum();
        assert_eq!(words, 400);

        let last = pages.last().unwrap();
        assert!(last.texts().any(|t| t == "Ayse"));
        assert!(!pages[0].texts().any(|t| t == "Ayse"));
    }

    #[test]
    fn test_data_table_splits_with_repeated_header() {
        let geometry = PageGeometry::a4();
        let flowables = vec![Flowable::DataTable {
            table: data_table(60),
            widths: ColumnWidths::Ratios(vec![3.0, 5.0, 8.0]),
        }];
        let pages = layout(&flowables, &geometry).unwrap();
        assert!(pages.len() >= 2);

        for page in &pages {
            assert_eq!(page.texts().next(), Some("No"));
        }
        let labels: usize = pages
            .iter()
            .flat_map(|p| p.texts())
            .filter(|t| t.parse::<usize>().is_ok())
            .count();
        assert_eq!(labels, 60);

        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Rect { y, .. } = op {
                    assert!(*y >= geometry.frame_bottom() - 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_data_table_width_clamped_to_frame() {
        let geometry = PageGeometry::a4();
        let pages = layout(
            &[Flowable::DataTable {
                table: data_table(1),
                widths: ColumnWidths::Equal,
            }],
            &geometry,
        )
        .unwrap();
        let right = geometry.frame_left() + geometry.frame_width();
        for op in &pages[0].ops {
            if let DrawOp::Rect { x, width, .. } = op {
                assert!(*x >= geometry.frame_left() - 1e-6);
                assert!(x + width <= right + 1e-6);
            }
        }
    }

    #[test]
    fn test_oversized_image_is_scaled() {
        let geometry = PageGeometry::a4();
        let pages = layout(
            &[Flowable::Image {
                id: ImageId(0),
                width: 100.0,
                height: 2000.0,
            }],
            &geometry,
        )
        .unwrap();
        match &pages[0].ops[0] {
            DrawOp::Image { height, y, .. } => {
                assert!((*height - geometry.frame_height()).abs() < 1e-6);
                assert!((*y - geometry.frame_bottom()).abs() < 1e-6);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_fitted_size() {
        assert_eq!(fitted_size("1", Font::Regular, 50.0), TABLE_FONT_SIZE);
        let size = fitted_size("12345678901234567890", Font::Regular, 50.0);
        assert!(size < TABLE_FONT_SIZE && size >= TABLE_MIN_FONT_SIZE);
    }
}
