use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::documents::StoredDocument;

/// Result of asking for a payment's invoice.
#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOutcome {
    #[schema(example = 42)]
    pub pago_id: i32,
    #[schema(example = "NOM-00000042")]
    pub numero_factura: String,
    #[schema(example = "factura_nomina_42_1741183200000.pdf")]
    pub archivo: String,
    /// True when a stored invoice was found and nothing was rendered.
    pub existe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_emision: Option<DateTime<Utc>>,
}

/// Listing entry for a stored invoice.
#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    /// Payment id recovered from the file name.
    pub id: i32,
    pub numero_factura: String,
    pub archivo: String,
    pub fecha_creacion: DateTime<Utc>,
    pub estado: String,
}

impl InvoiceSummary {
    pub fn from_stored(document: &StoredDocument) -> Option<Self> {
        let id = document.business_key.as_deref()?.parse().ok()?;
        Some(Self {
            id,
            numero_factura: document.label.clone(),
            archivo: document.archivo.clone(),
            fecha_creacion: document.fecha_creacion,
            estado: document.estado.clone(),
        })
    }
}
