//! PDF writer
//!
//! The second phase of report generation. Once layout has fixed the number
//! of pages, every page gets its decorations (header band, running header,
//! footer with "Page X of Y") and the whole document is serialized in a
//! single pass.

use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::{ReportError, Result};
use crate::header::HeaderInfo;
use crate::layout::{Align, DrawOp, Page, PageGeometry, Rgb, INCH};
use crate::raster::{ImageId, ImageStore};
use crate::text::{encode, text_width, Font};

/// Label colour in the first-page header band
const LABEL_COLOR: Rgb = Rgb(0.702, 0.098, 0.098);

/// Value colour in the first-page header band
const VALUE_COLOR: Rgb = Rgb(0.098, 0.098, 0.702);

const BAND_CAPTION_SIZE: f64 = 8.0;
const BAND_PAIR_SIZE: f64 = 7.0;
const RUNNING_HEADER_SIZE: f64 = 7.0;
const PAGE_NUMBER_SIZE: f64 = 10.0;

/// Decorations stamped on every page once the page count is known
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    /// Small logo: first-page band and running header left
    pub logo: Option<ImageId>,

    /// Cover logo: running header right and footer strip
    pub cover_logo: Option<ImageId>,

    /// Header info block
    pub header: HeaderInfo,
}

impl Decorations {
    /// Decoration ops for page `number` (1-based) of `total`
    pub fn page_ops(&self, number: usize, total: usize, geometry: &PageGeometry, images: &ImageStore) -> Vec<DrawOp> {
        if number == 1 {
            self.header_band(geometry, images)
        } else {
            let mut ops = self.running_header(geometry, images);
            ops.extend(self.footer(number, total, geometry, images));
            ops
        }
    }

    /// First-page band: logo on the left, captions and label/value pairs
    /// on the right
    fn header_band(&self, geometry: &PageGeometry, images: &ImageStore) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        let bottom = geometry.height - 1.2 * INCH;
        let left = 0.75 * INCH;
        let right = geometry.width - 0.75 * INCH;
        let logo_column = (geometry.width - 1.5 * INCH) / 3.0;
        let band_height = geometry.height * 0.07;

        if let Some(op) = fitted_image(self.logo, images, left, bottom, logo_column, band_height) {
            ops.push(op);
        }

        let mut baseline = bottom + band_height - BAND_CAPTION_SIZE;
        for caption in &self.header.captions {
            ops.push(DrawOp::text(right, baseline, Font::Bold, BAND_CAPTION_SIZE, Rgb::BLACK, caption, Align::Right));
            baseline -= BAND_CAPTION_SIZE * 1.25;
        }

        let text_left = left + logo_column + 12.0;
        let half = (right - text_left) / 2.0;
        for row in self.header.pair_rows() {
            for (i, (label, value)) in row.iter().enumerate() {
                let x = text_left + half * i as f64;
                ops.push(DrawOp::text(x, baseline, Font::Bold, BAND_PAIR_SIZE, LABEL_COLOR, label, Align::Left));
                let value_x = x + text_width(Font::Bold, BAND_PAIR_SIZE, label) + 2.0;
                ops.push(DrawOp::text(value_x, baseline, Font::Regular, BAND_PAIR_SIZE, VALUE_COLOR, value.trim(), Align::Left));
            }
            baseline -= BAND_PAIR_SIZE * 1.3;
        }

        ops
    }

    /// Two logos with the header info centred between them
    fn running_header(&self, geometry: &PageGeometry, images: &ImageStore) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        let y = geometry.height - 50.0;
        let left = geometry.width * 0.0324;
        let right_logo = geometry.width - 108.0;

        ops.extend(fitted_image(self.logo, images, left, y, 100.0, 20.0));
        ops.extend(fitted_image(self.cover_logo, images, right_logo, y, 100.0, 30.0));

        let center = (left + 100.0 + right_logo) / 2.0;
        let lines = self.header.captions.iter().cloned().chain(self.header.pair_rows().into_iter().map(|row| {
            row.iter()
                .map(|(label, value)| format!("{} {}", label, value.trim()))
                .collect::<Vec<_>>()
                .join("   ")
        }));

        let mut baseline = geometry.height - 12.0 - RUNNING_HEADER_SIZE;
        for line in lines {
            ops.push(DrawOp::text(center, baseline, Font::Regular, RUNNING_HEADER_SIZE, Rgb::BLACK, &line, Align::Center));
            baseline -= RUNNING_HEADER_SIZE * 1.25;
        }
        ops
    }

    /// Rule, logo strip and page number
    fn footer(&self, number: usize, total: usize, geometry: &PageGeometry, images: &ImageStore) -> Vec<DrawOp> {
        let rule_y = geometry.height * 0.10;
        let mut ops = vec![DrawOp::line(
            (geometry.width * 0.05, rule_y),
            (geometry.width * 0.95, rule_y),
            1.0,
            Rgb::BLACK,
        )];

        ops.extend(fitted_image(self.cover_logo, images, geometry.width * 0.05, rule_y - 32.0, 120.0, 26.0));

        ops.push(DrawOp::text(
            geometry.width * 0.85,
            geometry.height * 0.065,
            Font::Serif,
            PAGE_NUMBER_SIZE,
            Rgb::BLACK,
            &page_label(number, total),
            Align::Left,
        ));
        ops
    }
}

/// "Page X of Y"
pub fn page_label(number: usize, total: usize) -> String {
    format!("Page {} of {}", number, total)
}

/// Image op fitted into a box anchored at its bottom-left corner
fn fitted_image(id: Option<ImageId>, images: &ImageStore, x: f64, y: f64, max_width: f64, max_height: f64) -> Option<DrawOp> {
    let id = id?;
    let (width, height) = images.get(id)?.fit(max_width, max_height);
    Some(DrawOp::Image { id, x, y, width, height })
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![real(color.0), real(color.1), real(color.2)]
}

/// Content stream operations for `ops`
pub fn content_operations(ops: &[DrawOp]) -> Vec<Operation> {
    let mut operations = Vec::new();

    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
                rotated,
            } => {
                let matrix = if *rotated {
                    vec![real(0.0), real(1.0), real(-1.0), real(0.0), real(*x), real(*y)]
                } else {
                    vec![real(1.0), real(0.0), real(0.0), real(1.0), real(*x), real(*y)]
                };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![font.resource_name().into(), real(*size)]));
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new("Tm", matrix));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Line { from, to, width, color } => {
                operations.push(Operation::new("w", vec![real(*width)]));
                operations.push(Operation::new("RG", color_operands(*color)));
                operations.push(Operation::new("m", vec![real(from.0), real(from.1)]));
                operations.push(Operation::new("l", vec![real(to.0), real(to.1)]));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                if let Some(fill) = fill {
                    operations.push(Operation::new("rg", color_operands(*fill)));
                }
                if let Some((color, line_width)) = stroke {
                    operations.push(Operation::new("w", vec![real(*line_width)]));
                    operations.push(Operation::new("RG", color_operands(*color)));
                }
                operations.push(Operation::new("re", vec![real(*x), real(*y), real(*width), real(*height)]));
                let paint = match (fill.is_some(), stroke.is_some()) {
                    (true, true) => "B",
                    (true, false) => "f",
                    (false, true) => "S",
                    (false, false) => "n",
                };
                operations.push(Operation::new(paint, vec![]));
            }
            DrawOp::Image {
                id,
                x,
                y,
                width,
                height,
            } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![real(*width), real(0.0), real(0.0), real(*height), real(*x), real(*y)],
                ));
                operations.push(Operation::new("Do", vec![id.resource_name().as_str().into()]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    operations
}

/// Zlib-compress stream data for FlateDecode
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Serializes laid-out pages into a PDF document
pub struct PdfWriter {
    geometry: PageGeometry,
    title: String,
}

impl PdfWriter {
    /// Create a writer for pages of `geometry`
    pub fn new(geometry: PageGeometry, title: impl Into<String>) -> Self {
        PdfWriter {
            geometry,
            title: title.into(),
        }
    }

    /// Decorate and serialize `pages`
    pub fn write(&self, pages: &[Page], images: &ImageStore, decorations: &Decorations) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(ReportError::Layout("document has no pages".to_string()));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources_id = self.add_resources(&mut doc, images)?;

        let total = pages.len();
        let mut kids = Vec::with_capacity(total);
        for (i, page) in pages.iter().enumerate() {
            let mut ops = page.ops.clone();
            ops.extend(decorations.page_ops(i + 1, total, &self.geometry, images));

            let content = Content {
                operations: content_operations(&ops),
            };
            let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, deflate(&content.encode()?)?);
            let content_id = doc.add_object(stream);

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![real(0.0), real(0.0), real(self.geometry.width), real(self.geometry.height)],
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode(&self.title), StringFormat::Literal),
            "Producer" => Object::string_literal(concat!("labreport-pdf ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        debug!("Serialized {} pages, {} images, {} bytes", total, images.len(), bytes.len());
        Ok(bytes)
    }

    /// Shared resource dictionary: the three fonts and every image
    fn add_resources(&self, doc: &mut Document, images: &ImageStore) -> Result<ObjectId> {
        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        let mut xobjects = Dictionary::new();
        for (id, raster) in images.iter() {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(raster.width),
                    "Height" => i64::from(raster.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8i64,
                    "Filter" => "FlateDecode",
                },
                deflate(&raster.pixels)?,
            );
            let image_id = doc.add_object(stream);
            xobjects.set(id.resource_name(), image_id);
        }

        Ok(doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn page_with_text(text: &str) -> Page {
        Page {
            ops: vec![DrawOp::text(100.0, 700.0, Font::Regular, 12.0, Rgb::BLACK, text, Align::Left)],
        }
    }

    fn page_content(doc: &Document, page_id: ObjectId) -> String {
        let mut content = Vec::new();
        for id in doc.get_page_contents(page_id) {
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut content).unwrap();
        }
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(2, 5), "Page 2 of 5");
    }

    #[test]
    fn test_content_operations() {
        let ops = vec![
            DrawOp::text(10.0, 20.0, Font::Bold, 9.0, Rgb::BLACK, "Başlık", Align::Left),
            DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                width: 5.0,
                height: 5.0,
                fill: Some(Rgb::WHITE),
                stroke: None,
            },
            DrawOp::Image {
                id: ImageId(2),
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            },
        ];
        let operators: Vec<String> = content_operations(&ops).into_iter().map(|o| o.operator).collect();
        assert_eq!(
            operators,
            vec!["BT", "Tf", "rg", "Tm", "Tj", "ET", "rg", "re", "f", "q", "cm", "Do", "Q"]
        );

        let encoded = Content {
            operations: content_operations(&ops),
        }
        .encode()
        .unwrap();
        let text = String::from_utf8_lossy(&encoded);
        assert!(text.contains("/F2"));
        assert!(text.contains("/Im2 Do"));
    }

    #[test]
    fn test_write_numbers_pages() {
        let mut images = ImageStore::new();
        let logo = images.add(Raster::new(2, 1, vec![0, 0, 0, 255, 255, 255]).unwrap());
        let decorations = Decorations {
            logo: Some(logo),
            cover_logo: None,
            header: HeaderInfo::parse("Lab\nTel: 1\nFax: 2"),
        };

        let pages = vec![page_with_text("cover"), page_with_text("body"), page_with_text("more")];
        let writer = PdfWriter::new(PageGeometry::a4(), "Test");
        let bytes = writer.write(&pages, &images, &decorations).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids = doc.get_pages();
        assert_eq!(page_ids.len(), 3);

        let first = page_content(&doc, page_ids[&1]);
        assert!(first.contains("(cover) Tj"));
        assert!(first.contains("(Tel:) Tj"));
        assert!(!first.contains("Page 1 of 3"));

        let second = page_content(&doc, page_ids[&2]);
        assert!(second.contains("(Page 2 of 3) Tj"));
        assert!(second.contains("/Im0 Do"));
        let third = page_content(&doc, page_ids[&3]);
        assert!(third.contains("(Page 3 of 3) Tj"));
    }

    #[test]
    fn test_write_without_pages() {
        let writer = PdfWriter::new(PageGeometry::a4(), "Empty");
        assert!(writer.write(&[], &ImageStore::new(), &Decorations::default()).is_err());
    }

    #[test]
    fn test_missing_logo_is_skipped() {
        let decorations = Decorations {
            logo: Some(ImageId(7)),
            ..Decorations::default()
        };
        let ops = decorations.page_ops(2, 2, &PageGeometry::a4(), &ImageStore::new());
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
        assert!(ops.iter().filter_map(DrawOp::as_text).any(|t| t == "Page 2 of 2"));
    }
}
