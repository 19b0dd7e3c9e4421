//! Paginated aggregate reports over payments or payroll periods.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::canvas::{Canvas, Font, MARGIN, PAGE_WIDTH};
use super::common::{format_amount, format_date};
use super::{DocumentError, DocumentRenderer};
use crate::payment::models::PaymentDetail;
use crate::period::models::PeriodWithWorker;

/// Rows past this offset continue on a new page.
pub const PAGE_BREAK_Y: f32 = 700.0;
const PAGE_TOP_Y: f32 = 50.0;
const ROW_HEIGHT: f32 = 20.0;
const TABLE_START_Y: f32 = 150.0;

pub const NO_RECORDS: &str = "No hay registros para el período seleccionado.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// One row per payment: worker, type, amount paid, payment date.
    Expenses,
    /// One row per payroll period: worker, type, base, extra, total.
    PayrollSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub trabajador: String,
    pub tipo: String,
    pub cantidad: Decimal,
    pub extra: Decimal,
    /// Amount counted towards the report total.
    pub monto: Decimal,
    pub fecha: NaiveDate,
}

impl ReportRow {
    pub fn from_payment(detail: &PaymentDetail) -> Self {
        Self {
            trabajador: detail.trabajador.nombre.clone(),
            tipo: detail.trabajador.tipo.clone(),
            cantidad: detail.nomina.cantidad,
            extra: detail.nomina.extra,
            monto: detail.payment.monto,
            fecha: detail.payment.fecha.date_naive(),
        }
    }

    pub fn from_period(entry: &PeriodWithWorker) -> Self {
        Self {
            trabajador: entry.trabajador.nombre.clone(),
            tipo: entry.trabajador.tipo.clone(),
            cantidad: entry.period.cantidad,
            extra: entry.period.extra,
            monto: entry.period.total(),
            fecha: entry.period.fecha,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub variant: ReportVariant,
    pub title: String,
    /// Printed under the title, e.g. "Período: 1/3/2025 - 31/3/2025".
    pub period_label: Option<String>,
    pub rows: Vec<ReportRow>,
    pub generated_at: DateTime<Utc>,
}

impl ReportRequest {
    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|row| row.monto).sum()
    }
}

fn dollars(amount: Decimal) -> String {
    format!("${}", format_amount(amount))
}

fn column_header(canvas: &mut Canvas, variant: ReportVariant, y: f32) {
    canvas.fill_rect(MARGIN, y - 4.0, PAGE_WIDTH - 2.0 * MARGIN, 18.0, 0.9);
    canvas
        .bold(MARGIN, y, 10.0, "#")
        .bold(80.0, y, 10.0, "Trabajador")
        .bold(200.0, y, 10.0, "Tipo");
    match variant {
        ReportVariant::Expenses => {
            canvas
                .bold(300.0, y, 10.0, "Monto")
                .bold(420.0, y, 10.0, "Fecha");
        }
        ReportVariant::PayrollSummary => {
            canvas
                .bold(300.0, y, 10.0, "Base")
                .bold(380.0, y, 10.0, "Extra")
                .bold(460.0, y, 10.0, "Total");
        }
    }
}

impl DocumentRenderer {
    pub fn layout_report(&self, request: &ReportRequest) -> Result<Canvas, DocumentError> {
        let mut canvas = Canvas::new();
        canvas.centered(PAGE_TOP_Y, 18.0, Font::Bold, request.title.clone());
        if let Some(label) = &request.period_label {
            canvas.centered(80.0, 12.0, Font::Regular, label.clone());
        }
        canvas.centered(
            100.0,
            10.0,
            Font::Regular,
            format!(
                "{} - Fecha de generación: {}",
                self.issuer().nombre,
                format_date(request.generated_at.date_naive())
            ),
        );

        if request.rows.is_empty() {
            canvas.text(MARGIN, TABLE_START_Y, 11.0, NO_RECORDS);
            return Ok(canvas);
        }

        column_header(&mut canvas, request.variant, TABLE_START_Y - 25.0);
        let mut y = TABLE_START_Y;
        for (index, row) in request.rows.iter().enumerate() {
            if y > PAGE_BREAK_Y {
                canvas.add_page();
                y = PAGE_TOP_Y;
            }
            canvas
                .text(MARGIN, y, 10.0, format!("{}", index + 1))
                .text(80.0, y, 10.0, row.trabajador.clone())
                .text(200.0, y, 10.0, row.tipo.clone());
            match request.variant {
                ReportVariant::Expenses => {
                    canvas
                        .text(300.0, y, 10.0, dollars(row.monto))
                        .text(420.0, y, 10.0, format_date(row.fecha));
                }
                ReportVariant::PayrollSummary => {
                    canvas
                        .text(300.0, y, 10.0, dollars(row.cantidad))
                        .text(380.0, y, 10.0, dollars(row.extra))
                        .text(460.0, y, 10.0, dollars(row.monto));
                }
            }
            y += ROW_HEIGHT;
        }

        if y > PAGE_BREAK_Y {
            canvas.add_page();
            y = PAGE_TOP_Y;
        }
        canvas
            .line((MARGIN, y + 5.0), (PAGE_WIDTH - MARGIN, y + 5.0))
            .text(MARGIN, y + 20.0, 11.0, format!("Total de registros: {}", request.rows.len()))
            .bold(
                350.0,
                y + 20.0,
                12.0,
                format!("TOTAL GENERAL: {}", dollars(request.total())),
            );

        Ok(canvas)
    }

    pub fn render_report(&self, request: &ReportRequest) -> Result<Vec<u8>, DocumentError> {
        self.layout_report(request)?.to_pdf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(monto: i64) -> ReportRow {
        ReportRow {
            trabajador: "Luis Quispe".into(),
            tipo: "eventual".into(),
            cantidad: Decimal::new(monto, 0),
            extra: Decimal::ZERO,
            monto: Decimal::new(monto, 0),
            fecha: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }
    }

    fn request(rows: Vec<ReportRow>) -> ReportRequest {
        ReportRequest {
            variant: ReportVariant::Expenses,
            title: "REPORTE GENERAL DE EGRESOS".into(),
            period_label: None,
            rows,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_sums_row_amounts() {
        let req = request(vec![row(100), row(250)]);
        assert_eq!(req.total(), Decimal::new(350, 0));
        let canvas = DocumentRenderer::default().layout_report(&req).unwrap();
        assert!(canvas.contains_text("TOTAL GENERAL: $350.00"));
        assert!(canvas.contains_text("Total de registros: 2"));
    }

    #[test]
    fn test_summary_variant_shows_base_and_extra() {
        let mut entry = row(1200);
        entry.extra = Decimal::new(300, 0);
        entry.monto = Decimal::new(1500, 0);
        let mut req = request(vec![entry]);
        req.variant = ReportVariant::PayrollSummary;
        let canvas = DocumentRenderer::default().layout_report(&req).unwrap();
        assert!(canvas.contains_text("$1200.00"));
        assert!(canvas.contains_text("$300.00"));
        assert!(canvas.contains_text("$1500.00"));
    }
}
