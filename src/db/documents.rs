//! Document issuance: receipts, invoices and reports

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;

use super::AppState;
use crate::documents::common::{format_date, invoice_number, month_bounds, month_name};
use crate::documents::store::monthly_key;
use crate::documents::{
    DocumentKind, ReportRequest, ReportRow, ReportVariant, StoredDocument,
};
use crate::error::ServiceError;
use crate::invoice::models::{InvoiceOutcome, InvoiceSummary};
use crate::payment::models::{PaymentDetail, ReportSummary};

/// Start of the first day and end of the last day of a month, in UTC.
pub fn month_range(month: u32, year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let (first, last) = month_bounds(month, year).ok_or_else(|| {
        ServiceError::validation(format!("Mes inválido: {}/{}", month, year))
    })?;
    let start = first.and_hms_opt(0, 0, 0);
    let end = last.and_hms_milli_opt(23, 59, 59, 999);
    match (start, end) {
        (Some(start), Some(end)) => Ok((Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))),
        _ => Err(ServiceError::Internal("invalid month boundaries".to_string())),
    }
}

impl AppState {
    pub async fn require_payment_detail(&self, id: i32) -> Result<PaymentDetail, ServiceError> {
        self.ledger
            .payment_detail(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Pago {} no encontrado", id)))
    }

    pub async fn issue_receipt(&self, detail: &PaymentDetail) -> Result<StoredDocument, ServiceError> {
        let key = detail.payment.id.to_string();
        let stored = self
            .documents
            .save_rendered(DocumentKind::Receipt, Some(&key), Utc::now(), |at| {
                self.renderer
                    .render_receipt(&detail.payment, &detail.nomina, &detail.trabajador, at)
            })
            .await?;
        log::info!("Receipt {} issued for payment {}", stored.archivo, key);
        Ok(stored)
    }

    /// Returns the stored invoice for the payment, rendering one only if none exists.
    pub async fn generate_invoice(&self, pago_id: i32) -> Result<InvoiceOutcome, ServiceError> {
        let key = pago_id.to_string();
        if let Some(path) = self
            .documents
            .find_by_business_key(DocumentKind::Invoice, &key)
            .await?
        {
            log::info!("Invoice already exists for payment {}: {}", pago_id, path.display());
            return Ok(InvoiceOutcome {
                pago_id,
                numero_factura: invoice_number(pago_id),
                archivo: file_name(&path),
                existe: true,
                codigo_control: None,
                fecha_emision: None,
            });
        }

        let detail = self.require_payment_detail(pago_id).await?;
        let mut control_code = None;
        let stored = self
            .documents
            .save_rendered(DocumentKind::Invoice, Some(&key), Utc::now(), |at| {
                let invoice = self.renderer.render_invoice(
                    &detail.payment,
                    &detail.nomina,
                    &detail.trabajador,
                    at,
                )?;
                control_code = Some(invoice.control_code);
                Ok(invoice.pdf)
            })
            .await?;
        log::info!(
            "Invoice {} generated for payment {}",
            invoice_number(pago_id),
            pago_id
        );

        Ok(InvoiceOutcome {
            pago_id,
            numero_factura: invoice_number(pago_id),
            archivo: stored.archivo,
            existe: false,
            codigo_control: control_code,
            fecha_emision: stored.issued_at,
        })
    }

    pub async fn invoice_path(&self, pago_id: i32) -> Result<PathBuf, ServiceError> {
        self.documents
            .find_by_business_key(DocumentKind::Invoice, &pago_id.to_string())
            .await?
            .ok_or_else(|| ServiceError::not_found("Factura no encontrada"))
    }

    pub async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, ServiceError> {
        let stored = self.documents.list(DocumentKind::Invoice).await?;
        Ok(stored.iter().filter_map(InvoiceSummary::from_stored).collect())
    }

    /// Report over every payment, newest first.
    pub async fn expense_report(&self) -> Result<ReportSummary, ServiceError> {
        let payments = self.ledger.list_payment_details().await?;
        let request = ReportRequest {
            variant: ReportVariant::Expenses,
            title: "REPORTE GENERAL DE EGRESOS".to_string(),
            period_label: Some(format!("Total de pagos: {}", payments.len())),
            rows: payments.iter().map(ReportRow::from_payment).collect(),
            generated_at: Utc::now(),
        };
        let stored = self.store_report(DocumentKind::ExpenseReport, None, &request).await?;
        Ok(ReportSummary {
            success: true,
            reporte_pdf: stored.path.display().to_string(),
            mes: None,
            anio: None,
            total_pagos: request.rows.len(),
            monto_total: request.total(),
            mensaje: "Reporte de egresos generado".to_string(),
        })
    }

    /// Report over payments created in the given calendar month.
    pub async fn monthly_expense_report(
        &self,
        month: u32,
        year: i32,
    ) -> Result<ReportSummary, ServiceError> {
        let (from, to) = month_range(month, year)?;
        let payments = self.ledger.payment_details_between(from, to).await?;
        let name = month_name(month).unwrap_or_default();
        let request = ReportRequest {
            variant: ReportVariant::Expenses,
            title: format!("REPORTE DE EGRESOS - {} {}", name, year),
            period_label: Some(format!("Total de pagos en {}: {}", name, payments.len())),
            rows: payments.iter().map(ReportRow::from_payment).collect(),
            generated_at: Utc::now(),
        };
        let key = monthly_key(month, year);
        let stored = self
            .store_report(DocumentKind::MonthlyReport, Some(&key), &request)
            .await?;
        Ok(ReportSummary {
            success: true,
            reporte_pdf: stored.path.display().to_string(),
            mes: Some(month),
            anio: Some(year),
            total_pagos: request.rows.len(),
            monto_total: request.total(),
            mensaje: format!("Reporte mensual {}/{} generado", month, year),
        })
    }

    /// Payroll periods dated in the month with base, extra and total per row.
    pub async fn payroll_summary_report(
        &self,
        month: u32,
        year: i32,
    ) -> Result<StoredDocument, ServiceError> {
        let (first, last) = month_bounds(month, year).ok_or_else(|| {
            ServiceError::validation(format!("Mes inválido: {}/{}", month, year))
        })?;
        let periods = self.ledger.periods_between(first, last).await?;
        let request = ReportRequest {
            variant: ReportVariant::PayrollSummary,
            title: "REPORTE MENSUAL DE NÓMINAS".to_string(),
            period_label: Some(format!(
                "Período: {} - {}",
                format_date(first),
                format_date(last)
            )),
            rows: periods.iter().map(ReportRow::from_period).collect(),
            generated_at: Utc::now(),
        };
        let key = monthly_key(month, year);
        self.store_report(DocumentKind::MonthlyReport, Some(&key), &request)
            .await
    }

    async fn store_report(
        &self,
        kind: DocumentKind,
        key: Option<&str>,
        request: &ReportRequest,
    ) -> Result<StoredDocument, ServiceError> {
        let stored = self
            .documents
            .save_rendered(kind, key, request.generated_at, |_| {
                self.renderer.render_report(request)
            })
            .await?;
        log::info!(
            "Report {} generated with {} rows",
            stored.archivo,
            request.rows.len()
        );
        Ok(stored)
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_month_range_covers_whole_days() {
        let (from, to) = month_range(2, 2024).unwrap();
        assert_eq!((from.day(), from.hour()), (1, 0));
        assert_eq!((to.day(), to.hour(), to.minute()), (29, 23, 59));
    }

    #[test]
    fn test_month_range_rejects_bad_month() {
        assert!(matches!(month_range(0, 2024), Err(ServiceError::Validation(_))));
        assert!(matches!(month_range(13, 2024), Err(ServiceError::Validation(_))));
    }
}
