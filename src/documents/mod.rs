//! Documents module - fixed-layout financial documents and their file area.
//!
//! - `receipt` - payment receipt ("comprobante")
//! - `invoice` - fiscal invoice with control code and legend
//! - `report` - paginated aggregate reports
//! - `store` - on-disk placement, lookup by payment id and listing

pub mod canvas;
pub mod common;
pub mod control_code;
pub mod invoice;
pub mod issuer;
pub mod receipt;
pub mod report;
pub mod scan_code;
pub mod store;

pub use canvas::Canvas;
pub use control_code::{control_code, verify_control_code};
pub use invoice::{InvoiceLayout, LegendTier, RenderedInvoice};
pub use issuer::IssuerProfile;
pub use report::{ReportRequest, ReportRow, ReportVariant};
pub use scan_code::{InvoicePayload, ReceiptPayload, ScanCode};
pub use store::{DocumentKind, DocumentStore, StoredDocument};

use thiserror::Error;

use crate::payment::models::Payment;
use crate::period::models::PayrollPeriod;
use crate::worker::models::Worker;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    MissingRelation(String),
    #[error("document file operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to encode scannable code: {0}")]
    ScanCode(#[from] qrcode::types::QrError),
    #[error("failed to serialize scannable payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Stateless renderer for every document kind, parameterised by the issuer.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    issuer: IssuerProfile,
}

impl DocumentRenderer {
    pub fn new(issuer: IssuerProfile) -> Self {
        Self { issuer }
    }

    pub fn issuer(&self) -> &IssuerProfile {
        &self.issuer
    }
}

/// Payment -> period -> worker must form a chain.
fn check_relations(
    payment: &Payment,
    period: &PayrollPeriod,
    worker: &Worker,
) -> Result<(), DocumentError> {
    if payment.nomina_id != period.id {
        return Err(DocumentError::MissingRelation(format!(
            "Nómina {} del pago {} no encontrada",
            payment.nomina_id, payment.id
        )));
    }
    if period.trabajador_id != worker.id {
        return Err(DocumentError::MissingRelation(format!(
            "Trabajador {} de la nómina {} no encontrado",
            period.trabajador_id, period.id
        )));
    }
    Ok(())
}
