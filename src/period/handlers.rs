use actix_web::{web, HttpResponse};
use log::info;

use crate::error::ServiceError;
use crate::period::models::{CreatePeriodRequest, PayrollPeriod, PeriodWithWorker};
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Nomina",
    get,
    path = "/nomina",
    responses(
        (status = 200, description = "Payroll periods with their worker", body = Vec<PeriodWithWorker>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_periods(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing list_periods handler");
    Ok(HttpResponse::Ok().json(data.list_periods().await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Nomina",
    post,
    path = "/nomina",
    request_body = CreatePeriodRequest,
    responses(
        (status = 201, description = "Payroll period created", body = PayrollPeriod),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn create_period(
    data: web::Data<AppState>,
    body: web::Json<CreatePeriodRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!(
        "Executing create_period handler for worker {}",
        body.trabajador_id
    );
    let period = data.create_period(&body).await?;
    Ok(HttpResponse::Created().json(period))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/nomina")
            .route(web::get().to(list_periods))
            .route(web::post().to(create_period)),
    );
}
