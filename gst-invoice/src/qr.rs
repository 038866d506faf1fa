use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageBuffer, Luma};
use qrcode::{Color, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrOptions {
    /// Target image width in pixels; the module size is the largest integer that fits.
    pub width_px: u32,
    /// Light border around the code, in modules.
    pub margin_modules: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            width_px: 200,
            margin_modules: 1,
        }
    }
}

/// Base64-encoded PNG of a QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub png_base64: String,
    pub side_px: u32,
}

impl QrImage {
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(self.png_base64.as_bytes())
            .map_err(|e| InvoiceError::QrEncoding(format!("invalid base64 image: {e}")))
    }
}

pub trait QrEncoder: Send + Sync {
    fn encode(&self, data: &str, options: &QrOptions) -> Result<QrImage>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngQrEncoder;

impl QrEncoder for PngQrEncoder {
    fn encode(&self, data: &str, options: &QrOptions) -> Result<QrImage> {
        let code = QrCode::new(data.as_bytes()).map_err(|e| InvoiceError::QrEncoding(e.to_string()))?;
        let modules = code.width() as u32;
        let colors = code.to_colors();

        let margin = options.margin_modules;
        let total_modules = modules + 2 * margin;
        let scale = (options.width_px / total_modules).max(1);
        let side = total_modules * scale;

        let image = ImageBuffer::from_fn(side, side, |x, y| {
            let mx = (x / scale) as i64 - margin as i64;
            let my = (y / scale) as i64 - margin as i64;
            let dark = mx >= 0
                && my >= 0
                && (mx as u32) < modules
                && (my as u32) < modules
                && colors[(my as usize) * modules as usize + mx as usize] == Color::Dark;
            Luma([if dark { 0u8 } else { 255u8 }])
        });

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .map_err(|e| InvoiceError::QrEncoding(e.to_string()))?;

        Ok(QrImage {
            png_base64: general_purpose::STANDARD.encode(buffer.get_ref()),
            side_px: side,
        })
    }
}

/// QR failures never block the preview; they are logged and the image is left out.
pub fn encode_or_skip(encoder: &dyn QrEncoder, data: &str, options: &QrOptions) -> Option<QrImage> {
    match encoder.encode(data, options) {
        Ok(img) => {
            tracing::debug!(side_px = img.side_px, "generated payment QR code");
            Some(img)
        }
        Err(e) => {
            tracing::warn!("QR code generation failed: {e}");
            None
        }
    }
}
