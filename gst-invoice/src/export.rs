//! PDF export: the laid-out preview is scaled to the page width and cut into
//! page-height strips, one strip per A4 page.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect,
};

use crate::error::{InvoiceError, Result};
use crate::layout::{Element, EstimatedMetrics, Rgb, Surface, TtfMetrics};
use crate::preview::InvoicePreview;
use crate::settings::Settings;

const IMAGE_DPI: f32 = 300.0;

/// One page worth of surface, starting `offset_mm` from the top of the scaled content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub index: usize,
    pub offset_mm: f32,
}

/// First strip at offset 0; another strip follows while content height remains.
pub fn paginate(content_height_mm: f32, page_height_mm: f32) -> Vec<PageSlice> {
    let mut pages = vec![PageSlice {
        index: 0,
        offset_mm: 0.0,
    }];
    if page_height_mm <= 0.0 || !content_height_mm.is_finite() {
        return pages;
    }

    let mut height_left = content_height_mm - page_height_mm;
    while height_left > 0.0 {
        let index = pages.len();
        pages.push(PageSlice {
            index,
            offset_mm: index as f32 * page_height_mm,
        });
        height_left -= page_height_mm;
    }
    pages
}

/// `Invoice-<number>.pdf`, with characters unsafe in file names replaced by `_`.
pub fn pdf_file_name(invoice_number: &str) -> String {
    let mut out = String::with_capacity(invoice_number.len());
    for ch in invoice_number.trim().chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == ' ';
        out.push(if ok { ch } else { '_' });
    }
    let stem = out.trim();
    let stem = if stem.is_empty() { "invoice" } else { stem };
    format!("Invoice-{stem}.pdf")
}

enum PdfFonts {
    Builtin {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
    },
    Embedded(IndirectFontRef),
}

impl PdfFonts {
    fn pick(&self, bold: bool) -> &IndirectFontRef {
        match self {
            PdfFonts::Builtin { regular, bold: b } => {
                if bold {
                    b
                } else {
                    regular
                }
            }
            PdfFonts::Embedded(font) => font,
        }
    }
}

/// Builds the PDF bytes for a preview. CPU bound; run it off the async runtime.
pub fn render_pdf(preview: &InvoicePreview, settings: &Settings) -> Result<Vec<u8>> {
    let title = format!("Invoice {}", preview.invoice().invoice_number());
    let page_w = settings.page.width_mm;
    let page_h = settings.page.height_mm;
    let background = settings.background_rgb()?;

    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(page_w), Mm(page_h), "Layer 1");

    let font_bytes = match &settings.font_path {
        Some(path) => Some(std::fs::read(path).map_err(|e| {
            InvoiceError::Export(format!("cannot read font {}: {e}", path.display()))
        })?),
        None => None,
    };

    let (fonts, surface) = match &font_bytes {
        Some(bytes) => {
            let metrics = TtfMetrics::parse(bytes)?;
            let font = doc
                .add_external_font(Cursor::new(bytes.as_slice()))
                .map_err(|e| InvoiceError::Export(e.to_string()))?;
            (
                PdfFonts::Embedded(font),
                preview.layout(&metrics, settings.design_width_mm),
            )
        }
        None => {
            let regular = doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| InvoiceError::Export(e.to_string()))?;
            let bold = doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| InvoiceError::Export(e.to_string()))?;
            (
                PdfFonts::Builtin { regular, bold },
                preview.layout(&EstimatedMetrics, settings.design_width_mm),
            )
        }
    };

    let scale = page_w / surface.width_mm;
    let pages = paginate(surface.height_mm * scale, page_h);
    tracing::debug!(
        pages = pages.len(),
        surface_height_mm = surface.height_mm,
        scale,
        "paginating invoice surface"
    );

    for slice in &pages {
        let layer = if slice.index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(page_w), Mm(page_h), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        let bg = Rgb(background.0, background.1, background.2);
        fill_rect(&layer, 0.0, page_h, page_w, page_h, bg);
        draw_strip(&layer, &fonts, &surface, slice, scale, page_h);
    }

    save(doc)
}

fn save(doc: PdfDocumentReference) -> Result<Vec<u8>> {
    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| InvoiceError::Export(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| InvoiceError::Export(e.to_string()))
}

fn draw_strip(
    layer: &PdfLayerReference,
    fonts: &PdfFonts,
    surface: &Surface,
    slice: &PageSlice,
    scale: f32,
    page_h: f32,
) {
    let strip_top = slice.offset_mm;
    let strip_bottom = strip_top + page_h;
    // surface y (top-down) to PDF y (bottom-up) on this page
    let to_page_y = |y: f32| page_h - (y * scale - strip_top);

    for el in &surface.elements {
        let (top, bottom) = el.extent();
        if bottom * scale < strip_top || top * scale > strip_bottom {
            continue;
        }

        match el {
            Element::Text {
                x,
                baseline,
                size_pt,
                bold,
                color,
                text,
            } => {
                set_fill(layer, *color);
                layer.use_text(
                    text.as_str(),
                    size_pt * scale,
                    Mm(x * scale),
                    Mm(to_page_y(*baseline)),
                    fonts.pick(*bold),
                );
            }
            Element::Rule {
                x1,
                x2,
                y,
                thickness_pt,
                color,
            } => {
                layer.set_outline_color(Color::Rgb(printpdf::Rgb::new(color.0, color.1, color.2, None)));
                layer.set_outline_thickness(thickness_pt * scale);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(x1 * scale), Mm(to_page_y(*y))), false),
                        (Point::new(Mm(x2 * scale), Mm(to_page_y(*y))), false),
                    ],
                    is_closed: false,
                });
            }
            Element::Rect { x, y, w, h, fill } => {
                fill_rect(layer, x * scale, to_page_y(*y), w * scale, h * scale, *fill);
            }
            Element::Image { x, y, w, h, image } => {
                let decoded = image
                    .png_bytes()
                    .ok()
                    .and_then(|bytes| printpdf::image_crate::load_from_memory(&bytes).ok());
                let Some(img) = decoded else {
                    tracing::warn!("QR image could not be decoded; leaving it out of the PDF");
                    continue;
                };

                let natural_w_mm = img.width().max(1) as f32 / IMAGE_DPI * 25.4;
                let natural_h_mm = img.height().max(1) as f32 / IMAGE_DPI * 25.4;
                let bottom_y = to_page_y(y + h);
                Image::from_dynamic_image(&img).add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(x * scale)),
                        translate_y: Some(Mm(bottom_y)),
                        rotate: None,
                        scale_x: Some(w * scale / natural_w_mm),
                        scale_y: Some(h * scale / natural_h_mm),
                        dpi: Some(IMAGE_DPI),
                    },
                );
            }
        }
    }
}

fn set_fill(layer: &PdfLayerReference, color: Rgb) {
    layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(color.0, color.1, color.2, None)));
}

/// `y_top` is in PDF space (bottom-left origin).
fn fill_rect(layer: &PdfLayerReference, x: f32, y_top: f32, w: f32, h: f32, fill: Rgb) {
    set_fill(layer, fill);
    let rect = Rect::new(Mm(x), Mm(y_top - h), Mm(x + w), Mm(y_top)).with_mode(PaintMode::Fill);
    layer.add_rect(rect);
    set_fill(layer, Rgb::BLACK);
}

/// Renders the PDF on a blocking thread and writes `Invoice-<number>.pdf` into `dir`.
pub async fn export_pdf(
    preview: Arc<InvoicePreview>,
    settings: Arc<Settings>,
    dir: &Path,
) -> Result<PathBuf> {
    let file_name = pdf_file_name(preview.invoice().invoice_number());
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&preview, &settings))
        .await
        .map_err(|e| InvoiceError::Export(e.to_string()))??;

    tokio::fs::create_dir_all(dir).await?;
    let full_path = dir.join(file_name);
    tokio::fs::write(&full_path, &bytes).await?;

    tracing::info!(path = %full_path.display(), bytes = bytes.len(), "invoice PDF written");
    Ok(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormUpdate, InvoiceForm};
    use crate::model::ItemField;
    use crate::qr::{PngQrEncoder, QrEncoder, QrOptions};
    use time::{Date, Month};

    fn preview_with_items(extra: usize, with_qr: bool) -> InvoicePreview {
        let today = Date::from_calendar_date(2025, Month::March, 14).unwrap();
        let mut form = InvoiceForm::new(today);
        for i in 0..extra {
            form.add_item();
            form.update(FormUpdate::Item {
                index: i + 1,
                field: ItemField::Description(format!("Support retainer week {i}")),
            })
            .unwrap();
            form.update(FormUpdate::Item {
                index: i + 1,
                field: ItemField::HsnSac("998313".into()),
            })
            .unwrap();
        }
        let preview = InvoicePreview::new(Arc::new(form.submit().unwrap()));
        if with_qr {
            let qr = PngQrEncoder
                .encode(preview.upi_link(), &QrOptions::default())
                .unwrap();
            preview.with_qr(Some(qr))
        } else {
            preview
        }
    }

    #[test]
    fn two_and_a_half_pages_make_three() {
        let pages = paginate(297.0 * 2.5, 297.0);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].offset_mm, 297.0);
        assert_eq!(pages[2].offset_mm, 594.0);
    }

    #[test]
    fn short_and_exact_content_fit_one_page() {
        assert_eq!(paginate(100.0, 297.0).len(), 1);
        assert_eq!(paginate(297.0, 297.0).len(), 1);
        assert_eq!(paginate(297.5, 297.0).len(), 2);
        assert_eq!(paginate(0.0, 297.0).len(), 1);
        assert_eq!(paginate(500.0, 0.0).len(), 1);
    }

    #[test]
    fn file_name_uses_invoice_number() {
        assert_eq!(pdf_file_name("INV-2025-001"), "Invoice-INV-2025-001.pdf");
        assert_eq!(pdf_file_name("INV/2025:7"), "Invoice-INV_2025_7.pdf");
        assert_eq!(pdf_file_name("   "), "Invoice-invoice.pdf");
    }

    #[test]
    fn renders_single_page_pdf() {
        let bytes = render_pdf(&preview_with_items(0, true), &Settings::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn long_invoices_span_several_pages() {
        let preview = preview_with_items(60, false);
        let surface = preview.layout(&EstimatedMetrics, 210.0);
        let expected = paginate(surface.height_mm, 297.0).len();
        assert!(expected >= 2);

        let bytes = render_pdf(&preview, &Settings::default()).unwrap();
        let single = render_pdf(&preview_with_items(0, false), &Settings::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > single.len());
    }

    #[test]
    fn missing_font_file_is_an_export_error() {
        let settings = Settings {
            font_path: Some(PathBuf::from("/definitely/not/here.ttf")),
            ..Settings::default()
        };
        let err = render_pdf(&preview_with_items(0, false), &settings).unwrap_err();
        assert!(matches!(err, InvoiceError::Export(_)));
    }

    #[tokio::test]
    async fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_pdf(
            Arc::new(preview_with_items(0, true)),
            Arc::new(Settings::default()),
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(path.file_name().unwrap(), "Invoice-INV-2025-001.pdf");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
