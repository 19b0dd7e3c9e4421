//! Worker and payroll period operations

use super::{AppState, WORKER_CACHE_KEY};
use crate::error::ServiceError;
use crate::period::models::{CreatePeriodRequest, PayrollPeriod, PeriodWithWorker};
use crate::worker::models::{Worker, WorkerRequest};

impl AppState {
    /// Worker list, served from cache when warm.
    pub async fn list_workers(&self) -> Result<Vec<Worker>, ServiceError> {
        if let Some(workers) = self.worker_cache.get(WORKER_CACHE_KEY).await {
            log::debug!("Worker list served from cache ({} entries)", workers.len());
            return Ok(workers);
        }
        let workers = self.ledger.list_workers().await?;
        self.worker_cache
            .insert(WORKER_CACHE_KEY.to_string(), workers.clone())
            .await;
        Ok(workers)
    }

    pub async fn require_worker(&self, id: i32) -> Result<Worker, ServiceError> {
        self.ledger
            .get_worker(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Trabajador {} no encontrado", id)))
    }

    pub async fn create_worker(&self, request: &WorkerRequest) -> Result<Worker, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;
        let worker = self.ledger.create_worker(request).await?;
        self.worker_cache.invalidate(WORKER_CACHE_KEY).await;
        Ok(worker)
    }

    pub async fn update_worker(
        &self,
        id: i32,
        request: &WorkerRequest,
    ) -> Result<Worker, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;
        let worker = self
            .ledger
            .update_worker(id, request)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Trabajador {} no encontrado", id)))?;
        self.worker_cache.invalidate(WORKER_CACHE_KEY).await;
        Ok(worker)
    }

    /// Refused while any payroll period still references the worker.
    pub async fn delete_worker(&self, id: i32) -> Result<(), ServiceError> {
        self.require_worker(id).await?;
        let periods = self.ledger.periods_for_worker(id).await?;
        if !periods.is_empty() {
            return Err(ServiceError::validation(format!(
                "No se puede eliminar el trabajador {}: tiene {} nóminas asociadas",
                id,
                periods.len()
            )));
        }
        self.ledger.delete_worker(id).await?;
        self.worker_cache.invalidate(WORKER_CACHE_KEY).await;
        Ok(())
    }

    pub async fn list_periods(&self) -> Result<Vec<PeriodWithWorker>, ServiceError> {
        Ok(self.ledger.list_periods().await?)
    }

    pub async fn create_period(
        &self,
        request: &CreatePeriodRequest,
    ) -> Result<PayrollPeriod, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;
        self.require_worker(request.trabajador_id).await?;
        Ok(self.ledger.create_period(request).await?)
    }
}
