use actix_web::{web, HttpResponse};
use log::{debug, info};

use crate::error::{parse_id, ServiceError};
use crate::worker::models::{Worker, WorkerRequest};
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Trabajador",
    get,
    path = "/trabajador",
    responses(
        (status = 200, description = "List all workers", body = Vec<Worker>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_workers(data: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    info!("Executing list_workers handler");
    let workers = data.list_workers().await?;
    debug!("Returning {} workers", workers.len());
    Ok(HttpResponse::Ok().json(workers))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Trabajador",
    get,
    path = "/trabajador/{id}",
    params(("id" = i32, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker found", body = Worker),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn get_worker(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing get_worker handler for id: {}", id);
    Ok(HttpResponse::Ok().json(data.require_worker(id).await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Trabajador",
    post,
    path = "/trabajador",
    request_body = WorkerRequest,
    responses(
        (status = 201, description = "Worker created", body = Worker),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_worker(
    data: web::Data<AppState>,
    body: web::Json<WorkerRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!("Executing create_worker handler");
    let worker = data.create_worker(&body).await?;
    info!("Worker {} created", worker.id);
    Ok(HttpResponse::Created().json(worker))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Trabajador",
    put,
    path = "/trabajador/{id}",
    params(("id" = i32, Path, description = "Worker ID")),
    request_body = WorkerRequest,
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn update_worker(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<WorkerRequest>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing update_worker handler for id: {}", id);
    Ok(HttpResponse::Ok().json(data.update_worker(id, &body).await?))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Trabajador",
    delete,
    path = "/trabajador/{id}",
    params(("id" = i32, Path, description = "Worker ID")),
    responses(
        (status = 204, description = "Worker deleted"),
        (status = 400, description = "Worker still has payroll periods", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn delete_worker(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = parse_id(&path, "id")?;
    info!("Executing delete_worker handler for id: {}", id);
    data.delete_worker(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/trabajador")
            .route(web::get().to(list_workers))
            .route(web::post().to(create_worker)),
    )
    .service(
        web::resource("/trabajador/{id}")
            .route(web::get().to(get_worker))
            .route(web::put().to(update_worker))
            .route(web::delete().to(delete_worker)),
    );
}
