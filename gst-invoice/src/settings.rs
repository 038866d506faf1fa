use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};
use crate::qr::QrOptions;

pub const ENV_OUTPUT_DIR: &str = "GST_INVOICE_OUTPUT_DIR";
pub const ENV_FONT: &str = "GST_INVOICE_FONT";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub qr: QrOptions,
    #[serde(default)]
    pub page: PageSize,
    /// Width the preview is laid out at before being scaled to the page width.
    #[serde(default = "default_design_width_mm")]
    pub design_width_mm: f32,
    /// Page fill behind the captured preview, `#rrggbb`.
    #[serde(default = "default_background")]
    pub background: String,
    /// TrueType font to embed. The builtin Helvetica (no rupee sign) is used when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_design_width_mm() -> f32 {
    210.0
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            qr: QrOptions::default(),
            page: PageSize::default(),
            design_width_mm: default_design_width_mm(),
            background: default_background(),
            font_path: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Settings {
    /// Reads the optional JSON settings file, then applies environment overrides
    /// (a `.env` file in the working directory is honoured).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };

        dotenvy::dotenv().ok();
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            if !dir.trim().is_empty() {
                settings.output_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(font) = std::env::var(ENV_FONT) {
            if !font.trim().is_empty() {
                settings.font_path = Some(PathBuf::from(font.trim()));
            }
        }

        settings.validate()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            InvoiceError::Settings(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| InvoiceError::Settings(format!("invalid settings JSON: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.page.width_mm <= 0.0 || self.page.height_mm <= 0.0 {
            return Err(InvoiceError::Settings("page size must be positive".to_string()));
        }
        if self.design_width_mm <= 0.0 {
            return Err(InvoiceError::Settings("designWidthMm must be positive".to_string()));
        }
        if self.qr.width_px == 0 {
            return Err(InvoiceError::Settings("qr.widthPx must be positive".to_string()));
        }
        self.background_rgb()?;
        Ok(())
    }

    /// Background as 0.0..=1.0 RGB components.
    pub fn background_rgb(&self) -> Result<(f32, f32, f32)> {
        parse_hex_color(&self.background)
            .ok_or_else(|| InvoiceError::Settings(format!("invalid background color {:?}", self.background)))
    }
}

fn parse_hex_color(input: &str) -> Option<(f32, f32, f32)> {
    let hex = input.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some((channel(0)?, channel(2)?, channel(4)?))
}
