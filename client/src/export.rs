//! Summary export
//!
//! Writes summary text to a `.txt` file or renders it as a QR code PNG.

use std::fs;
use std::path::Path;
use image::{GrayImage, Luma};
use log::info;
use qrcode::{EcLevel, QrCode};

use crate::error::Result;
use crate::material::MaterialRecord;

/// Pixels per QR module
pub const QR_BOX_SIZE: u32 = 10;

/// Quiet zone the renderer leaves around the code, in modules
pub const QR_BORDER: u32 = 4;

/// Write `text` to `path`, ending with a newline
pub fn save_text(text: &str, path: &Path) -> Result<()> {
    fs::write(path, format!("{}\n", text))?;
    info!("Saved summary to {}", path.display());
    Ok(())
}

/// Render `text` as a black-on-white QR code image
pub fn qr_image(text: &str) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)?;
    Ok(code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(QR_BOX_SIZE, QR_BOX_SIZE)
        .build())
}

/// Save `text` as a QR code PNG
pub fn save_qr(text: &str, path: &Path) -> Result<()> {
    qr_image(text)?.save_with_format(path, image::ImageFormat::Png)?;
    info!("Saved QR code to {}", path.display());
    Ok(())
}

/// Save a material record's summary as text
pub fn save_material_text(record: &MaterialRecord, path: &Path) -> Result<()> {
    save_text(&record.summary(), path)
}

/// Save a material record's summary as a QR code, once its required
/// fields are filled
pub fn save_material_qr(record: &MaterialRecord, path: &Path) -> Result<()> {
    record.validate()?;
    save_qr(&record.summary(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Component;
    use tempfile::TempDir;

    #[test]
    fn test_qr_image_geometry() {
        let image = qr_image("H2O").unwrap();
        // version 1 codes are 21 modules wide
        assert_eq!(image.width(), (21 + 2 * QR_BORDER) * QR_BOX_SIZE);
        assert_eq!(image.width(), image.height());

        // quiet zone is white, finder pattern corner is black
        assert_eq!(image.get_pixel(0, 0), &Luma([255]));
        let corner = QR_BORDER * QR_BOX_SIZE;
        assert_eq!(image.get_pixel(corner, corner), &Luma([0]));
    }

    #[test]
    fn test_save_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.txt");
        let record = MaterialRecord::new("H2O", vec![Component::new("H", "11.2", "Lab")], "2024-01-01");
        save_material_text(&record, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Raw Material: H2O\nComponents:\n  - H: 11.2% Lab\nManufacturing Date: 2024-01-01\n"
        );
    }

    #[test]
    fn test_save_qr() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("qr.png");
        let record = MaterialRecord::new("H2O", vec![], "2024-01-01");
        save_material_qr(&record, &path).unwrap();
        let saved = image::open(&path).unwrap();
        assert_eq!(saved.width() % QR_BOX_SIZE, 0);
    }

    #[test]
    fn test_incomplete_record_has_no_qr() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("qr.png");
        let record = MaterialRecord::new("", vec![], "2024-01-01");
        assert!(save_material_qr(&record, &path).is_err());
        assert!(!path.exists());
    }
}
