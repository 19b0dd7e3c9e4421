use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::canvas::{Canvas, Font, MARGIN, PAGE_WIDTH};
use super::common::{format_amount, format_date, invoice_number};
use super::control_code::control_code;
use super::scan_code::{InvoicePayload, ScanCode};
use super::{check_relations, DocumentError, DocumentRenderer};
use crate::payment::models::Payment;
use crate::period::models::PayrollPeriod;
use crate::worker::models::Worker;

const TABLE_TOP: f32 = 350.0;
const QR_SIZE: f32 = 110.0;

/// Consumer-protection legend printed at the foot of an invoice, chosen by amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendTier {
    /// Up to 1000.
    A,
    /// Above 1000 up to 5000.
    B,
    /// Above 5000.
    C,
}

impl LegendTier {
    pub fn for_amount(amount: Decimal) -> Self {
        if amount <= Decimal::new(1000, 0) {
            Self::A
        } else if amount <= Decimal::new(5000, 0) {
            Self::B
        } else {
            Self::C
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::A => "Ley N° 453: Tienes derecho a recibir información sobre las características y contenidos de los servicios que utilices.",
            Self::B => "Ley N° 453: Es deber y derecho de todos los ciudadanos el cumplimiento y exigencia del cumplimiento de la Constitución Política del Estado y las leyes de la República.",
            Self::C => "Ley N° 453: Para efectos tributarios, verifique que los datos de la factura correspondan con la información de su proveedor.",
        }
    }
}

/// Laid-out invoice before serialization.
#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    pub canvas: Canvas,
    pub number: String,
    pub control_code: String,
    pub legend: LegendTier,
}

#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub number: String,
    pub control_code: String,
    pub legend: LegendTier,
    pub issued_at: DateTime<Utc>,
    pub pdf: Vec<u8>,
}

fn bolivianos(amount: Decimal) -> String {
    format!("Bs. {}", format_amount(amount))
}

impl DocumentRenderer {
    pub fn layout_invoice(
        &self,
        payment: &Payment,
        period: &PayrollPeriod,
        worker: &Worker,
        issued_at: DateTime<Utc>,
    ) -> Result<InvoiceLayout, DocumentError> {
        check_relations(payment, period, worker)?;
        let issuer = self.issuer();
        let number = invoice_number(payment.id);
        let code = control_code(&number, &issuer.nit, payment.monto, issued_at);
        let legend = LegendTier::for_amount(payment.monto);
        let paid_on = payment.fecha_pago.unwrap_or(payment.fecha);
        let concept = format!("Pago de Nómina - {}", worker.tipo);
        let right = PAGE_WIDTH - MARGIN;

        let mut canvas = Canvas::new();
        canvas
            .centered(40.0, 20.0, Font::Bold, "FACTURA BOLIVIANA")
            .centered(66.0, 12.0, Font::Bold, format!("Nº {}", number));

        canvas
            .bold(MARGIN, 100.0, 12.0, issuer.razon_social.clone())
            .text(MARGIN, 118.0, 9.0, format!("NIT: {}", issuer.nit))
            .text(MARGIN, 132.0, 9.0, format!("Nº Autorización: {}", issuer.autorizacion))
            .text(MARGIN, 146.0, 9.0, issuer.direccion.clone())
            .text(MARGIN, 160.0, 9.0, format!("Tel: {}  Email: {}", issuer.telefono, issuer.email))
            .text(
                MARGIN,
                174.0,
                9.0,
                format!("{} - {}", issuer.sucursal, issuer.municipio),
            )
            .line((MARGIN, 195.0), (right, 195.0));

        canvas
            .bold(MARGIN, 210.0, 12.0, "DATOS DEL PAGO DE NÓMINA")
            .text(MARGIN, 232.0, 10.0, format!("Trabajador: {}", worker.nombre))
            .text(MARGIN, 248.0, 10.0, format!("Tipo de Empleado: {}", worker.tipo))
            .text(MARGIN, 264.0, 10.0, format!("Concepto: {}", concept))
            .text(MARGIN, 280.0, 10.0, format!("Período: {}", format_date(period.fecha)))
            .text(
                MARGIN,
                296.0,
                10.0,
                format!("Fecha de Pago: {}", format_date(paid_on.date_naive())),
            );

        let columns = [MARGIN + 5.0, 300.0, 380.0, 470.0];
        canvas
            .fill_rect(MARGIN, TABLE_TOP, right - MARGIN, 20.0, 0.85)
            .bold(columns[0], TABLE_TOP + 5.0, 10.0, "DESCRIPCIÓN")
            .bold(columns[1], TABLE_TOP + 5.0, 10.0, "CANTIDAD")
            .bold(columns[2], TABLE_TOP + 5.0, 10.0, "PRECIO UNIT.")
            .bold(columns[3], TABLE_TOP + 5.0, 10.0, "TOTAL");
        let row = TABLE_TOP + 30.0;
        canvas
            .text(columns[0], row, 10.0, concept)
            .text(columns[1], row, 10.0, "1")
            .text(columns[2], row, 10.0, bolivianos(payment.monto))
            .text(columns[3], row, 10.0, bolivianos(payment.monto))
            .line((MARGIN, row + 20.0), (right, row + 20.0));

        let totals = row + 35.0;
        canvas
            .text(380.0, totals, 10.0, format!("SUBTOTAL: {}", bolivianos(payment.monto)))
            .text(380.0, totals + 16.0, 10.0, format!("DESCUENTO: {}", bolivianos(Decimal::ZERO)))
            .bold(380.0, totals + 34.0, 12.0, format!("TOTAL: {}", bolivianos(payment.monto)));

        let scan = ScanCode::from_json(&InvoicePayload {
            nit: issuer.nit.clone(),
            numero_factura: number.clone(),
            fecha: issued_at.date_naive(),
            monto: format_amount(payment.monto),
            codigo_control: code.clone(),
        })?;
        canvas.scan_code(MARGIN, totals, QR_SIZE, &scan);

        let footer = totals + QR_SIZE + 30.0;
        canvas
            .bold(MARGIN, footer, 10.0, format!("Código de Control: {}", code))
            .text(
                MARGIN,
                footer + 16.0,
                9.0,
                format!("Actividad Económica: {}", issuer.actividad_economica),
            );
        canvas.paragraph(
            MARGIN,
            footer + 36.0,
            8.0,
            right - MARGIN,
            &format!("\"{}\"", legend.text()),
        );

        Ok(InvoiceLayout {
            canvas,
            number,
            control_code: code,
            legend,
        })
    }

    pub fn render_invoice(
        &self,
        payment: &Payment,
        period: &PayrollPeriod,
        worker: &Worker,
        issued_at: DateTime<Utc>,
    ) -> Result<RenderedInvoice, DocumentError> {
        let layout = self.layout_invoice(payment, period, worker, issued_at)?;
        Ok(RenderedInvoice {
            pdf: layout.canvas.to_pdf()?,
            number: layout.number,
            control_code: layout.control_code,
            legend: layout.legend,
            issued_at,
        })
    }
}
