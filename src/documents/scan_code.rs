//! Scannable codes printed on receipts and invoices.

use chrono::NaiveDate;
use qrcode::{Color, QrCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocumentError;

/// Module matrix of a QR code plus the text it encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCode {
    payload: String,
    width: usize,
    modules: Vec<bool>,
}

impl ScanCode {
    pub fn encode(payload: impl Into<String>) -> Result<Self, DocumentError> {
        let payload = payload.into();
        let code = QrCode::new(payload.as_bytes())?;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();
        Ok(Self {
            width: code.width(),
            payload,
            modules,
        })
    }

    /// JSON-serializes `value` and encodes it.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, DocumentError> {
        Self::encode(serde_json::to_string(value)?)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(column, row)` of every dark module.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width.max(1);
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(index, _)| (index % width, index / width))
    }
}

/// Data embedded in a payment receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    pub pago_id: i32,
    pub trabajador: String,
    /// Rounded to cents; serialized as a JSON number.
    pub monto: Decimal,
    pub fecha: String,
    pub nomina_id: i32,
}

/// Data embedded in an invoice for fiscal verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub nit: String,
    pub numero_factura: String,
    pub fecha: NaiveDate,
    pub monto: String,
    pub codigo_control: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_builds_square_matrix() {
        let code = ScanCode::encode("NOM-00000042").unwrap();
        assert!(code.width() >= 21);
        assert_eq!(code.modules.len(), code.width() * code.width());
        assert!(code.dark_modules().count() > 0);
    }

    #[test]
    fn test_invoice_payload_field_names() {
        let payload = InvoicePayload {
            nit: "1234567890123".into(),
            numero_factura: "NOM-00000042".into(),
            fecha: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            monto: "1500.00".into(),
            codigo_control: "ABCDEF0123456789".into(),
        };
        let code = ScanCode::from_json(&payload).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(code.payload()).unwrap();
        assert_eq!(decoded["numeroFactura"], "NOM-00000042");
        assert_eq!(decoded["codigoControl"], "ABCDEF0123456789");
        assert_eq!(decoded["fecha"], "2025-03-05");
        assert_eq!(decoded["nit"], "1234567890123");
    }

    #[test]
    fn test_receipt_payload_field_names() {
        let payload = ReceiptPayload {
            pago_id: 42,
            trabajador: "Ana Paredes".into(),
            monto: Decimal::new(150050, 2),
            fecha: "5/3/2025".into(),
            nomina_id: 12,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["pago_id"], 42);
        assert_eq!(json["nomina_id"], 12);
        assert_eq!(json["trabajador"], "Ana Paredes");
        assert_eq!(json["monto"].as_f64(), Some(1500.5));
    }
}
