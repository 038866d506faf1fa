//! The user-facing flow: edit a draft, submit it for review, download the PDF, reset.

use std::path::PathBuf;
use std::sync::Arc;

use time::Date;

use crate::error::{InvoiceError, Result};
use crate::export::export_pdf;
use crate::form::InvoiceForm;
use crate::preview::InvoicePreview;
use crate::qr::{encode_or_skip, PngQrEncoder, QrEncoder};
use crate::settings::Settings;

pub const SUBMITTED_MESSAGE: &str = "Invoice preview generated! Review and download as PDF.";
pub const DOWNLOADED_MESSAGE: &str = "PDF downloaded successfully!";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to generate PDF. Please try again.";
pub const RESET_MESSAGE: &str = "Form reset. Create a new invoice.";

#[derive(Debug, Clone)]
pub enum AppState {
    Editing(InvoiceForm),
    Reviewing { preview: Arc<InvoicePreview> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// Short message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }

    pub fn submitted() -> Self {
        Self::new(NoticeLevel::Success, SUBMITTED_MESSAGE)
    }

    pub fn downloaded() -> Self {
        Self::new(NoticeLevel::Success, DOWNLOADED_MESSAGE)
    }

    pub fn download_failed() -> Self {
        Self::new(NoticeLevel::Error, DOWNLOAD_FAILED_MESSAGE)
    }

    pub fn reset() -> Self {
        Self::new(NoticeLevel::Info, RESET_MESSAGE)
    }

    /// Notice for a finished download attempt.
    pub fn for_download(result: &Result<PathBuf>) -> Self {
        match result {
            Ok(_) => Self::downloaded(),
            Err(_) => Self::download_failed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    Generating,
}

pub struct Session {
    state: AppState,
    export_status: ExportStatus,
    settings: Arc<Settings>,
    encoder: Arc<dyn QrEncoder>,
    today: Date,
}

impl Session {
    /// Starts in editing with the pre-filled form.
    pub fn new(settings: Arc<Settings>, today: Date) -> Self {
        Self::with_form(settings, today, InvoiceForm::new(today))
    }

    pub fn with_form(settings: Arc<Settings>, today: Date, form: InvoiceForm) -> Self {
        Self {
            state: AppState::Editing(form),
            export_status: ExportStatus::Idle,
            settings,
            encoder: Arc::new(PngQrEncoder),
            today,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn QrEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self.state, AppState::Reviewing { .. })
    }

    pub fn export_status(&self) -> ExportStatus {
        self.export_status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The draft, while editing.
    pub fn form(&self) -> Option<&InvoiceForm> {
        match &self.state {
            AppState::Editing(form) => Some(form),
            AppState::Reviewing { .. } => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut InvoiceForm> {
        match &mut self.state {
            AppState::Editing(form) => Some(form),
            AppState::Reviewing { .. } => None,
        }
    }

    /// The preview, while reviewing.
    pub fn preview(&self) -> Option<&InvoicePreview> {
        match &self.state {
            AppState::Reviewing { preview } => Some(preview),
            AppState::Editing(_) => None,
        }
    }

    /// Validates the draft and moves to reviewing. On validation failure the
    /// session stays in editing and the violations are returned.
    ///
    /// Submitting while already reviewing keeps the current preview.
    pub async fn submit(&mut self) -> Result<Notice> {
        let form = match &self.state {
            AppState::Editing(form) => form,
            AppState::Reviewing { .. } => {
                tracing::debug!("submit ignored: already reviewing");
                return Ok(Notice::submitted());
            }
        };

        let invoice = match form.submit() {
            Ok(invoice) => Arc::new(invoice),
            Err(e) => {
                tracing::info!("invoice submission rejected: {e}");
                return Err(e);
            }
        };

        let preview = InvoicePreview::new(invoice);
        let link = preview.upi_link().to_string();
        let encoder = Arc::clone(&self.encoder);
        let options = self.settings.qr;
        let qr = tokio::task::spawn_blocking(move || encode_or_skip(encoder.as_ref(), &link, &options))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("QR code task failed: {e}");
                None
            });

        let preview = preview.with_qr(qr);
        tracing::info!(
            invoice_number = preview.invoice().invoice_number(),
            total = preview.totals().total,
            has_qr = preview.qr().is_some(),
            "invoice submitted for review"
        );
        self.state = AppState::Reviewing {
            preview: Arc::new(preview),
        };
        Ok(Notice::submitted())
    }

    /// Writes the reviewed invoice as a PDF into the configured output directory.
    /// The session stays in reviewing whether or not the export succeeds.
    pub async fn download(&mut self) -> Result<PathBuf> {
        let dir = self.settings.output_dir.clone();
        self.download_to(dir).await
    }

    pub async fn download_to(&mut self, dir: PathBuf) -> Result<PathBuf> {
        let preview = match &self.state {
            AppState::Reviewing { preview } => Arc::clone(preview),
            AppState::Editing(_) => {
                tracing::error!("download requested with no invoice under review");
                return Err(InvoiceError::MissingRenderTarget);
            }
        };
        if self.export_status == ExportStatus::Generating {
            return Err(InvoiceError::ExportInProgress);
        }

        self.export_status = ExportStatus::Generating;
        let result = export_pdf(preview, Arc::clone(&self.settings), &dir).await;
        self.export_status = ExportStatus::Idle;

        if let Err(e) = &result {
            tracing::error!("PDF export failed: {e}");
        }
        result
    }

    /// Discards any invoice under review and starts over with a fresh form.
    pub fn reset(&mut self) -> Notice {
        self.state = AppState::Editing(InvoiceForm::new(self.today));
        self.export_status = ExportStatus::Idle;
        tracing::info!("session reset to a new draft");
        Notice::reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormUpdate;
    use crate::model::{ItemField, SupplierField};
    use crate::qr::{QrImage, QrOptions};
    use crate::states::IndianState;
    use time::Month;

    struct FailingEncoder;

    impl QrEncoder for FailingEncoder {
        fn encode(&self, _data: &str, _options: &QrOptions) -> Result<QrImage> {
            Err(InvoiceError::QrEncoding("encoder offline".to_string()))
        }
    }

    fn today() -> Date {
        Date::from_calendar_date(2025, Month::March, 14).unwrap()
    }

    fn session_in(dir: &std::path::Path) -> Session {
        let settings = Settings {
            output_dir: dir.to_path_buf(),
            ..Settings::default()
        };
        Session::new(Arc::new(settings), today())
    }

    #[tokio::test]
    async fn submit_moves_to_reviewing_with_qr() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        assert!(!session.is_reviewing());

        let notice = session.submit().await.unwrap();
        assert_eq!(notice, Notice::submitted());
        assert!(session.is_reviewing());
        assert!(session.form().is_none());

        let preview = session.preview().unwrap();
        assert_eq!(preview.totals().total, 23_600.0);
        assert!(preview.qr().is_some());
    }

    #[tokio::test]
    async fn invalid_draft_stays_in_editing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let form = session.form_mut().unwrap();
        form.update(FormUpdate::Supplier(SupplierField::Name(String::new())))
            .unwrap();
        form.update(FormUpdate::Item {
            index: 0,
            field: ItemField::Quantity(0.0),
        })
        .unwrap();

        let err = session.submit().await.unwrap_err();
        match err {
            InvoiceError::Validation(v) => {
                assert!(v.contains_field("supplier.name"));
                assert!(v.contains_field("items.1.quantity"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!session.is_reviewing());
    }

    #[tokio::test]
    async fn qr_failure_does_not_block_review() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path()).with_encoder(Arc::new(FailingEncoder));
        session.submit().await.unwrap();
        let preview = session.preview().unwrap();
        assert!(preview.qr().is_none());
        assert!(preview.upi_link().starts_with("upi://pay?"));
    }

    #[tokio::test]
    async fn download_requires_reviewing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let result = session.download().await;
        assert!(matches!(result, Err(InvoiceError::MissingRenderTarget)));
        assert_eq!(Notice::for_download(&result), Notice::download_failed());
    }

    #[tokio::test]
    async fn download_writes_pdf_and_stays_reviewing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.submit().await.unwrap();

        let result = session.download().await;
        assert_eq!(Notice::for_download(&result), Notice::downloaded());
        let path = result.unwrap();
        assert_eq!(path, dir.path().join("Invoice-INV-2025-001.pdf"));
        assert!(path.exists());
        assert!(session.is_reviewing());
        assert_eq!(session.export_status(), ExportStatus::Idle);
    }

    #[tokio::test]
    async fn failed_download_keeps_the_preview() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            output_dir: dir.path().to_path_buf(),
            font_path: Some(dir.path().join("missing.ttf")),
            ..Settings::default()
        };
        let mut session = Session::new(Arc::new(settings), today());
        session.submit().await.unwrap();

        let result = session.download().await;
        assert!(result.is_err());
        assert_eq!(Notice::for_download(&result).level, NoticeLevel::Error);
        assert!(session.is_reviewing());
        assert_eq!(session.export_status(), ExportStatus::Idle);
    }

    #[tokio::test]
    async fn second_download_is_refused_while_generating() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.submit().await.unwrap();
        session.export_status = ExportStatus::Generating;

        let result = session.download().await;
        assert!(matches!(result, Err(InvoiceError::ExportInProgress)));
        assert!(session.is_reviewing());
        assert!(!dir.path().join("Invoice-INV-2025-001.pdf").exists());

        session.reset();
        assert_eq!(session.export_status(), ExportStatus::Idle);
    }

    #[tokio::test]
    async fn reset_discards_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let form = InvoiceForm::blank(today(), IndianState::Goa);
        let mut session = Session::with_form(
            Arc::new(Settings {
                output_dir: dir.path().to_path_buf(),
                ..Settings::default()
            }),
            today(),
            form,
        );
        assert!(session.submit().await.is_err());

        let notice = session.reset();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, RESET_MESSAGE);
        assert!(session.preview().is_none());
        assert_eq!(session.form().unwrap(), &InvoiceForm::new(today()));

        session.submit().await.unwrap();
        session.reset();
        assert!(!session.is_reviewing());
    }
}
