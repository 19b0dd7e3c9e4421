use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use utoipa::IntoParams;

use crate::error::{parse_id, ServiceError};
use crate::payment::handlers::parse_month_year;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Month 1-12.
    pub mes: String,
    /// Year; `año` is accepted too.
    #[serde(alias = "año")]
    pub anio: String,
}

/// Streams a stored PDF as an attachment.
pub async fn send_pdf(
    req: &HttpRequest,
    path: &Path,
    download_name: &str,
) -> Result<HttpResponse, ServiceError> {
    let file = NamedFile::open_async(path).await.map_err(|e| {
        ServiceError::Io(format!("cannot open {}: {}", path.display(), e))
    })?;
    debug!("Streaming {} as {}", path.display(), download_name);
    Ok(file
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download_name.to_string())],
        })
        .into_response(req))
}

#[utoipa::path(
    context_path = "/api",
    tag = "PDF",
    get,
    path = "/pdf/comprobante/{pagoId}",
    params(("pagoId" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Receipt PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub async fn receipt_pdf(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "pagoId")?;
    info!("Executing receipt_pdf handler for payment {}", id);
    let detail = data.require_payment_detail(id).await?;
    let stored = data.issue_receipt(&detail).await?;
    send_pdf(&req, &stored.path, &stored.archivo).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "PDF",
    get,
    path = "/pdf/reporte",
    params(ReportQuery),
    responses(
        (status = 200, description = "Monthly payroll summary PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid month or year", body = ErrorResponse)
    )
)]
pub async fn payroll_report_pdf(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ServiceError> {
    let (month, year) = parse_month_year(&query.mes, &query.anio)?;
    info!("Executing payroll_report_pdf handler for {}/{}", month, year);
    let stored = data.payroll_summary_report(month, year).await?;
    send_pdf(&req, &stored.path, &stored.archivo).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pdf/comprobante/{pagoId}").route(web::get().to(receipt_pdf)))
        .service(web::resource("/pdf/reporte").route(web::get().to(payroll_report_pdf)));
}
