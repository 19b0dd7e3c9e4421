use chrono::{DateTime, Utc};

use super::canvas::{Canvas, Font, MARGIN, PAGE_WIDTH};
use super::common::{format_amount, format_date, format_datetime};
use super::scan_code::{ReceiptPayload, ScanCode};
use super::{check_relations, DocumentError, DocumentRenderer};
use crate::payment::models::Payment;
use crate::period::models::PayrollPeriod;
use crate::worker::models::{Worker, MAX_TEXT_LEN};

const QR_SIZE: f32 = 100.0;

fn dollars(amount: rust_decimal::Decimal) -> String {
    format!("${}", format_amount(amount))
}

impl DocumentRenderer {
    /// Single-page payment receipt with a scannable summary of the payment.
    pub fn layout_receipt(
        &self,
        payment: &Payment,
        period: &PayrollPeriod,
        worker: &Worker,
        generated_at: DateTime<Utc>,
    ) -> Result<Canvas, DocumentError> {
        check_relations(payment, period, worker)?;
        let issuer = self.issuer();
        let paid_on = payment.fecha_pago.unwrap_or(payment.fecha);

        let mut canvas = Canvas::new();
        canvas
            .bold(MARGIN, 50.0, 20.0, "SISTEMA DE NÓMINA")
            .text(MARGIN, 80.0, 16.0, "Comprobante de Pago");

        canvas
            .text(MARGIN, 120.0, 10.0, format!("Empresa: {}", issuer.razon_social))
            .text(MARGIN, 140.0, 10.0, format!("NIT: {}", issuer.nit))
            .text(MARGIN, 160.0, 10.0, format!("Dirección: {}", issuer.direccion))
            .text(MARGIN, 180.0, 10.0, format!("Teléfono: {}", issuer.telefono))
            .line((MARGIN, 205.0), (PAGE_WIDTH - MARGIN, 205.0));

        canvas
            .bold(MARGIN, 230.0, 14.0, "INFORMACIÓN DEL TRABAJADOR")
            .text(MARGIN, 260.0, 11.0, format!("Nombre: {}", worker.nombre))
            .text(MARGIN, 280.0, 11.0, format!("Tipo: {}", worker.tipo))
            .text(MARGIN, 300.0, 11.0, format!("Sueldo Base: {}", dollars(worker.sueldo)));

        canvas
            .bold(MARGIN, 340.0, 14.0, "DETALLES DE LA NÓMINA")
            .text(MARGIN, 370.0, 11.0, format!("Período: {}", format_date(period.fecha)))
            .text(MARGIN, 390.0, 11.0, format!("Cantidad Base: {}", dollars(period.cantidad)))
            .text(MARGIN, 410.0, 11.0, format!("Extras: {}", dollars(period.extra)))
            .text(MARGIN, 430.0, 11.0, format!("Total Nómina: {}", dollars(period.total())));

        canvas
            .bold(MARGIN, 470.0, 14.0, "INFORMACIÓN DEL PAGO")
            .text(MARGIN, 500.0, 11.0, format!("ID de Pago: {}", payment.id))
            .text(MARGIN, 520.0, 11.0, format!("Monto Pagado: {}", dollars(payment.monto)))
            .text(
                MARGIN,
                540.0,
                11.0,
                format!("Fecha de Pago: {}", format_date(paid_on.date_naive())),
            )
            .text(MARGIN, 560.0, 11.0, format!("Procesado por: {}", payment.is_user));

        let code = ScanCode::from_json(&ReceiptPayload {
            pago_id: payment.id,
            // Rows written before the length check existed may exceed it.
            trabajador: worker.nombre.chars().take(MAX_TEXT_LEN).collect(),
            monto: payment.monto.round_dp(2),
            fecha: paid_on.to_rfc3339(),
            nomina_id: period.id,
        })?;
        canvas.scan_code(PAGE_WIDTH - MARGIN - QR_SIZE, 470.0, QR_SIZE, &code);

        canvas
            .text(
                MARGIN,
                650.0,
                9.0,
                "Este es un comprobante de pago generado automáticamente",
            )
            .text(
                MARGIN,
                670.0,
                9.0,
                "Para verificar la autenticidad, escanee el código QR",
            )
            .text(
                MARGIN,
                690.0,
                9.0,
                format!("Generado el: {}", format_datetime(generated_at)),
            );
        canvas.centered(730.0, 8.0, Font::Regular, issuer.nombre.clone());

        Ok(canvas)
    }

    pub fn render_receipt(
        &self,
        payment: &Payment,
        period: &PayrollPeriod,
        worker: &Worker,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, DocumentError> {
        self.layout_receipt(payment, period, worker, generated_at)?
            .to_pdf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::models::PaymentStatus;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    fn fixture() -> (Payment, PayrollPeriod, Worker) {
        let worker = Worker {
            id: 7,
            nombre: "Ana Paredes".into(),
            tipo: "fijo".into(),
            sueldo: Decimal::new(3500, 0),
        };
        let period = PayrollPeriod {
            id: 12,
            trabajador_id: 7,
            fecha: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            cantidad: Decimal::new(1200, 0),
            extra: Decimal::new(300, 0),
        };
        let payment = Payment {
            id: 42,
            nomina_id: 12,
            monto: Decimal::new(1500, 0),
            fecha: Utc.with_ymd_and_hms(2025, 3, 5, 14, 0, 0).unwrap(),
            estado: PaymentStatus::Created,
            fecha_pago: None,
            referencia: None,
            is_user: "admin-1".into(),
        };
        (payment, period, worker)
    }

    #[test]
    fn test_receipt_lists_payment_fields() {
        let (payment, period, worker) = fixture();
        let canvas = DocumentRenderer::default()
            .layout_receipt(&payment, &period, &worker, Utc::now())
            .unwrap();
        assert!(canvas.contains_text("Nombre: Ana Paredes"));
        assert!(canvas.contains_text("Sueldo Base: $3500.00"));
        assert!(canvas.contains_text("Total Nómina: $1500.00"));
        assert!(canvas.contains_text("Monto Pagado: $1500.00"));
        assert!(canvas.contains_text("Fecha de Pago: 5/3/2025"));
        assert!(canvas.contains_text("Procesado por: admin-1"));
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn test_receipt_scan_code_payload() {
        let (payment, period, worker) = fixture();
        let canvas = DocumentRenderer::default()
            .layout_receipt(&payment, &period, &worker, Utc::now())
            .unwrap();
        let code = canvas.scan_codes().next().unwrap();
        let payload: ReceiptPayload = serde_json::from_str(code.payload()).unwrap();
        assert_eq!(payload.pago_id, 42);
        assert_eq!(payload.nomina_id, 12);
        assert_eq!(payload.trabajador, "Ana Paredes");
        assert_eq!(payload.monto, Decimal::new(1500, 0));

        let decoded: serde_json::Value = serde_json::from_str(code.payload()).unwrap();
        assert!(decoded["monto"].is_number());
    }

    #[test]
    fn test_receipt_with_longest_allowed_name() {
        let (payment, period, mut worker) = fixture();
        worker.nombre = "ñ".repeat(MAX_TEXT_LEN);
        let canvas = DocumentRenderer::default()
            .layout_receipt(&payment, &period, &worker, Utc::now())
            .unwrap();
        let code = canvas.scan_codes().next().unwrap();
        let payload: ReceiptPayload = serde_json::from_str(code.payload()).unwrap();
        assert_eq!(payload.trabajador.chars().count(), MAX_TEXT_LEN);
        assert!(canvas.to_pdf().unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_receipt_caps_oversized_legacy_name() {
        let (payment, period, mut worker) = fixture();
        worker.nombre = "x".repeat(3000);
        let canvas = DocumentRenderer::default()
            .layout_receipt(&payment, &period, &worker, Utc::now())
            .unwrap();
        let code = canvas.scan_codes().next().unwrap();
        let payload: ReceiptPayload = serde_json::from_str(code.payload()).unwrap();
        assert_eq!(payload.trabajador.len(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_receipt_rejects_broken_chain() {
        let (payment, mut period, worker) = fixture();
        period.trabajador_id = 99;
        let err = DocumentRenderer::default()
            .render_receipt(&payment, &period, &worker, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DocumentError::MissingRelation(_)));
    }

    #[test]
    fn test_receipt_renders_pdf() {
        let (payment, period, worker) = fixture();
        let bytes = DocumentRenderer::default()
            .render_receipt(&payment, &period, &worker, Utc::now())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
