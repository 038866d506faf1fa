pub mod calc;
pub mod error;
pub mod export;
pub mod form;
pub mod format;
pub mod layout;
pub mod model;
pub mod preview;
pub mod qr;
pub mod session;
pub mod settings;
pub mod states;
pub mod tax;
pub mod upi;
pub mod words;

pub use error::{FieldViolation, InvoiceError, Result, ValidationErrors};
pub use form::{FormUpdate, InvoiceForm};
pub use model::Invoice;
pub use preview::InvoicePreview;
pub use session::{AppState, ExportStatus, Notice, NoticeLevel, Session};
pub use settings::Settings;
pub use states::IndianState;
