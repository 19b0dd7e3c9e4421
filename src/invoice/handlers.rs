use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};

use crate::error::{parse_id, ServiceError};
use crate::invoice::models::{InvoiceOutcome, InvoiceSummary};
use crate::pdf::handlers::send_pdf;
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Factura",
    get,
    path = "/factura/generar/{pagoId}",
    params(("pagoId" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Existing or newly generated invoice", body = InvoiceOutcome),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub async fn generate_invoice(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "pagoId")?;
    info!("Executing generate_invoice handler for payment {}", id);
    let outcome = data.generate_invoice(id).await?;
    debug!("Invoice {} (existing: {})", outcome.archivo, outcome.existe);
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Factura",
    get,
    path = "/factura/pdf/{pagoId}",
    params(("pagoId" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Stored invoice PDF", content_type = "application/pdf"),
        (status = 404, description = "No invoice stored for the payment", body = ErrorResponse)
    )
)]
pub async fn invoice_pdf(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "pagoId")?;
    info!("Executing invoice_pdf handler for payment {}", id);
    let file = data.invoice_path(id).await?;
    send_pdf(&req, &file, &format!("factura_nomina_{}.pdf", id)).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Factura",
    get,
    path = "/factura",
    responses(
        (status = 200, description = "Stored invoices, newest first", body = Vec<InvoiceSummary>)
    )
)]
pub async fn list_invoices(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing list_invoices handler");
    Ok(HttpResponse::Ok().json(data.list_invoices().await?))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/factura").route(web::get().to(list_invoices)))
        .service(web::resource("/factura/generar/{pagoId}").route(web::get().to(generate_invoice)))
        .service(web::resource("/factura/pdf/{pagoId}").route(web::get().to(invoice_pdf)));
}
