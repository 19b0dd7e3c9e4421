use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};

use crate::error::{parse_id, ServiceError};
use crate::payment::models::{
    CheckoutRequest, CheckoutResponse, ConfirmRequest, ConfirmedPayment, PaymentDetail,
    PaymentStats, RegisterPaymentRequest, RegisteredPaymentResponse, ReportSummary,
};
use crate::{AppState, ErrorResponse};

/// Header set by the API gateway with the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn acting_user(req: &HttpRequest) -> String {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Month 1-12 and year taken from path or query strings.
pub fn parse_month_year(mes: &str, anio: &str) -> Result<(u32, i32), ServiceError> {
    let month = mes
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ServiceError::validation(format!("mes '{}' must be between 1 and 12", mes)))?;
    let year = anio
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|y| (1900..=9999).contains(y))
        .ok_or_else(|| ServiceError::validation(format!("anio '{}' is not a valid year", anio)))?;
    Ok((month, year))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pago",
    post,
    path = "/pago/stripe/session",
    request_body = CheckoutRequest,
    params(("x-user-id" = Option<String>, Header, description = "Acting user")),
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 404, description = "Worker or payroll period not found", body = ErrorResponse),
        (status = 502, description = "Payment provider failure", body = ErrorResponse)
    )
)]
pub async fn create_checkout_session(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = acting_user(&req);
    info!(
        "Executing create_checkout_session handler: trabajador={}, nomina={}, monto={}, user={}",
        body.trabajador_id, body.nomina_id, body.monto, user
    );
    let response = data.create_checkout(&body, &user).await?;
    debug!("Checkout session {} for payment {}", response.session_id, response.pago_id);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pago",
    post,
    path = "/pago/confirmar/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Payment completed, invoice attached when generated", body = ConfirmedPayment),
        (status = 400, description = "Payment cannot be completed", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 502, description = "Session not paid or provider failure", body = ErrorResponse)
    )
)]
pub async fn confirm_checkout(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ConfirmRequest>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing confirm_checkout handler for payment {}", id);
    let confirmed = data.confirm_checkout(id, &body.session_id).await?;
    if confirmed.factura.is_none() {
        debug!("Payment {} confirmed without invoice", id);
    }
    Ok(HttpResponse::Ok().json(confirmed))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pago",
    get,
    path = "/pago",
    responses(
        (status = 200, description = "All payments, newest first", body = Vec<PaymentDetail>)
    )
)]
pub async fn list_payments(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing list_payments handler");
    Ok(HttpResponse::Ok().json(data.list_payments().await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pago",
    get,
    path = "/pago/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment with period and worker", body = PaymentDetail),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub async fn get_payment(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing get_payment handler for id: {}", id);
    Ok(HttpResponse::Ok().json(data.require_payment_detail(id).await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pago",
    get,
    path = "/pago/debug/estados",
    responses(
        (status = 200, description = "Payments counted per status", body = PaymentStats)
    )
)]
pub async fn payment_stats(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing payment_stats handler");
    let stats = data.payment_stats().await?;
    debug!("Payment status counts: {:?}", stats.estados_por_cantidad);
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pagar",
    post,
    path = "/pagar",
    request_body = RegisterPaymentRequest,
    params(("x-user-id" = Option<String>, Header, description = "Acting user")),
    responses(
        (status = 200, description = "Payment recorded and receipt issued", body = RegisteredPaymentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Payroll period not found", body = ErrorResponse)
    )
)]
pub async fn register_payment(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<RegisterPaymentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = acting_user(&req);
    info!(
        "Executing register_payment handler: nomina={}, user={}",
        body.nomina_id, user
    );
    Ok(HttpResponse::Ok().json(data.register_payment(&body, &user).await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pagar",
    post,
    path = "/pagar/confirmar/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment completed and receipt issued", body = RegisteredPaymentResponse),
        (status = 400, description = "Payment already completed", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
pub async fn confirm_manually(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing confirm_manually handler for payment {}", id);
    Ok(HttpResponse::Ok().json(data.confirm_manually(id).await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pagar",
    get,
    path = "/pagar/reporte-egresos",
    responses(
        (status = 200, description = "General expense report stored", body = ReportSummary)
    )
)]
pub async fn expense_report(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing expense_report handler");
    Ok(HttpResponse::Ok().json(data.expense_report().await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pagar",
    get,
    path = "/pagar/reporte-egresos/{mes}/{anio}",
    params(
        ("mes" = u32, Path, description = "Month 1-12"),
        ("anio" = i32, Path, description = "Year")
    ),
    responses(
        (status = 200, description = "Monthly expense report stored", body = ReportSummary),
        (status = 400, description = "Invalid month or year", body = ErrorResponse)
    )
)]
pub async fn monthly_expense_report(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (mes, anio) = path.into_inner();
    let (month, year) = parse_month_year(&mes, &anio)?;
    info!("Executing monthly_expense_report handler for {}/{}", month, year);
    Ok(HttpResponse::Ok().json(data.monthly_expense_report(month, year).await?))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pago").route(web::get().to(list_payments)))
        .service(web::resource("/pago/stripe/session").route(web::post().to(create_checkout_session)))
        .service(web::resource("/pago/confirmar/{id}").route(web::post().to(confirm_checkout)))
        .service(web::resource("/pago/debug/estados").route(web::get().to(payment_stats)))
        .service(web::resource("/pago/{id}").route(web::get().to(get_payment)))
        .service(
            web::resource("/pagar")
                .route(web::get().to(list_payments))
                .route(web::post().to(register_payment)),
        )
        .service(web::resource("/pagar/confirmar/{id}").route(web::post().to(confirm_manually)))
        .service(web::resource("/pagar/reporte-egresos").route(web::get().to(expense_report)))
        .service(
            web::resource("/pagar/reporte-egresos/{mes}/{anio}")
                .route(web::get().to(monthly_expense_report)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_acting_user_defaults_to_unknown() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(acting_user(&req), "unknown");
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "17"))
            .to_http_request();
        assert_eq!(acting_user(&req), "17");
    }

    #[test]
    fn test_parse_month_year() {
        assert_eq!(parse_month_year("3", "2025").unwrap(), (3, 2025));
        assert!(matches!(parse_month_year("13", "2025"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_month_year("0", "2025"), Err(ServiceError::Validation(_))));
        assert!(matches!(parse_month_year("3", "abc"), Err(ServiceError::Validation(_))));
    }
}
