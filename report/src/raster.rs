//! RGB rasters embedded in reports
//!
//! Logos and chart plot areas are kept as plain 8-bit RGB buffers and
//! written to the PDF as DeviceRGB image XObjects.

use std::fs;
use std::path::Path;
use image::{DynamicImage, RgbImage};
use log::{debug, warn};

use crate::error::{ReportError, Result};

/// 8-bit RGB pixel buffer, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Wrap a pixel buffer, checking its length
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected || expected == 0 {
            return Err(ReportError::Render(format!(
                "raster of {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Raster { width, height, pixels })
    }

    /// Convert a decoded image, compositing transparency onto white
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

        for px in rgba.pixels() {
            let [r, g, b, a] = px.0;
            let alpha = u32::from(a);
            for channel in [r, g, b] {
                let blended = (u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
                pixels.push(blended as u8);
            }
        }

        Raster { width, height, pixels }
    }

    /// Decode an image file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let image = image::load_from_memory(&data)?;
        debug!("Loaded image {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Self::from_image(&image))
    }

    /// Decode an image file, logging and returning None when it cannot be used
    pub fn load_optional(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!("Skipping image {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Width over height
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Size that fits inside `max_width` x `max_height` keeping the aspect
    /// ratio
    pub fn fit(&self, max_width: f64, max_height: f64) -> (f64, f64) {
        let aspect = self.aspect();
        if max_width / max_height > aspect {
            (max_height * aspect, max_height)
        } else {
            (max_width, max_width / aspect)
        }
    }

    /// Write the raster as a PNG file
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let image = RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| ReportError::Render("pixel buffer does not match raster size".to_string()))?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        debug!("Saved {}", path.display());
        Ok(())
    }
}

/// Handle of an image registered in an [`ImageStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

impl ImageId {
    /// Resource name the image is registered under
    pub fn resource_name(&self) -> String {
        format!("Im{}", self.0)
    }
}

/// Images referenced by a document's pages
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: Vec<Raster>,
}

impl ImageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image
    pub fn add(&mut self, raster: Raster) -> ImageId {
        self.images.push(raster);
        ImageId(self.images.len() - 1)
    }

    /// Look up an image
    pub fn get(&self, id: ImageId) -> Option<&Raster> {
        self.images.get(id.0)
    }

    /// Registered images in id order
    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &Raster)> {
        self.images.iter().enumerate().map(|(i, r)| (ImageId(i), r))
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is registered
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
