//! Payroll ledger: CRUD over workers, payroll periods and payments.
//!
//! The service only talks to the [`PayrollLedger`] trait:
//! - `postgres` - sqlx implementation over the `trabajador`, `nomina` and `pagar` tables
//! - `memory` - process-local implementation for tests and local runs

mod memory;
mod postgres;

pub use memory::InMemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::payment::models::{NewPayment, Payment, PaymentDetail};
use crate::period::models::{CreatePeriodRequest, PayrollPeriod, PeriodWithWorker};
use crate::worker::models::{Worker, WorkerRequest};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt ledger row: {0}")]
    Corrupt(String),
}

/// An update that touched no row means the payment disappeared after it was read.
pub(crate) fn ensure_payment_updated(id: i32, rows_affected: u64) -> Result<(), LedgerError> {
    if rows_affected == 0 {
        return Err(LedgerError::Corrupt(format!(
            "payment {} vanished before update",
            id
        )));
    }
    Ok(())
}

#[async_trait]
pub trait PayrollLedger: Send + Sync {
    async fn list_workers(&self) -> Result<Vec<Worker>, LedgerError>;
    async fn get_worker(&self, id: i32) -> Result<Option<Worker>, LedgerError>;
    async fn create_worker(&self, request: &WorkerRequest) -> Result<Worker, LedgerError>;
    async fn update_worker(
        &self,
        id: i32,
        request: &WorkerRequest,
    ) -> Result<Option<Worker>, LedgerError>;
    /// Returns false when no worker had that id.
    async fn delete_worker(&self, id: i32) -> Result<bool, LedgerError>;

    async fn list_periods(&self) -> Result<Vec<PeriodWithWorker>, LedgerError>;
    async fn get_period(&self, id: i32) -> Result<Option<PayrollPeriod>, LedgerError>;
    async fn periods_for_worker(&self, worker_id: i32) -> Result<Vec<PayrollPeriod>, LedgerError>;
    /// Periods dated within `[from, to]`, oldest first.
    async fn periods_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PeriodWithWorker>, LedgerError>;
    async fn create_period(&self, request: &CreatePeriodRequest)
        -> Result<PayrollPeriod, LedgerError>;

    async fn create_payment(&self, payment: &NewPayment) -> Result<Payment, LedgerError>;
    async fn get_payment(&self, id: i32) -> Result<Option<Payment>, LedgerError>;
    /// Resolves a payment together with its period and worker.
    async fn payment_detail(&self, id: i32) -> Result<Option<PaymentDetail>, LedgerError>;
    /// All resolvable payments, newest first.
    async fn list_payment_details(&self) -> Result<Vec<PaymentDetail>, LedgerError>;
    /// Payments created within `[from, to]`, newest first.
    async fn payment_details_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentDetail>, LedgerError>;
    /// Persists status, payment date and reference of an existing payment.
    async fn update_payment(&self, payment: &Payment) -> Result<(), LedgerError>;
}
