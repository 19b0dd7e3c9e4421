use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{ensure_payment_updated, LedgerError, PayrollLedger};
use crate::payment::models::{NewPayment, Payment, PaymentDetail, PaymentStatus};
use crate::period::models::{CreatePeriodRequest, PayrollPeriod, PeriodWithWorker};
use crate::worker::models::{Worker, WorkerRequest};

#[derive(Default)]
struct Tables {
    workers: BTreeMap<i32, Worker>,
    periods: BTreeMap<i32, PayrollPeriod>,
    payments: BTreeMap<i32, Payment>,
    next_worker: i32,
    next_period: i32,
    next_payment: i32,
}

impl Tables {
    fn detail(&self, payment: &Payment) -> Option<PaymentDetail> {
        let period = self.periods.get(&payment.nomina_id)?;
        let worker = self.workers.get(&period.trabajador_id)?;
        Some(PaymentDetail {
            payment: payment.clone(),
            nomina: period.clone(),
            trabajador: worker.clone(),
        })
    }

    fn with_worker(&self, period: &PayrollPeriod) -> Option<PeriodWithWorker> {
        let worker = self.workers.get(&period.trabajador_id)?;
        Some(PeriodWithWorker {
            period: period.clone(),
            trabajador: worker.clone(),
        })
    }

    fn details_newest_first<'a>(
        &self,
        payments: impl Iterator<Item = &'a Payment>,
    ) -> Vec<PaymentDetail> {
        let mut details: Vec<PaymentDetail> = payments.filter_map(|p| self.detail(p)).collect();
        details.sort_by(|a, b| b.payment.fecha.cmp(&a.payment.fecha));
        details
    }
}

/// Ledger kept entirely in process memory. Identifiers are assigned sequentially from 1.
#[derive(Default)]
pub struct InMemoryLedger {
    tables: RwLock<Tables>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a payment row as-is; used to seed fixtures with a fixed identifier.
    pub fn insert_payment(&self, payment: Payment) {
        let mut tables = self.tables.write();
        tables.next_payment = tables.next_payment.max(payment.id);
        tables.payments.insert(payment.id, payment);
    }

    /// Removes a payroll period without checking for dependants.
    pub fn remove_period(&self, id: i32) {
        self.tables.write().periods.remove(&id);
    }
}

#[async_trait]
impl PayrollLedger for InMemoryLedger {
    async fn list_workers(&self) -> Result<Vec<Worker>, LedgerError> {
        Ok(self.tables.read().workers.values().cloned().collect())
    }

    async fn get_worker(&self, id: i32) -> Result<Option<Worker>, LedgerError> {
        Ok(self.tables.read().workers.get(&id).cloned())
    }

    async fn create_worker(&self, request: &WorkerRequest) -> Result<Worker, LedgerError> {
        let mut tables = self.tables.write();
        tables.next_worker += 1;
        let worker = Worker {
            id: tables.next_worker,
            nombre: request.nombre.clone(),
            tipo: request.tipo.clone(),
            sueldo: request.sueldo,
        };
        tables.workers.insert(worker.id, worker.clone());
        Ok(worker)
    }

    async fn update_worker(
        &self,
        id: i32,
        request: &WorkerRequest,
    ) -> Result<Option<Worker>, LedgerError> {
        let mut tables = self.tables.write();
        Ok(tables.workers.get_mut(&id).map(|worker| {
            worker.nombre = request.nombre.clone();
            worker.tipo = request.tipo.clone();
            worker.sueldo = request.sueldo;
            worker.clone()
        }))
    }

    async fn delete_worker(&self, id: i32) -> Result<bool, LedgerError> {
        Ok(self.tables.write().workers.remove(&id).is_some())
    }

    async fn list_periods(&self) -> Result<Vec<PeriodWithWorker>, LedgerError> {
        let tables = self.tables.read();
        Ok(tables
            .periods
            .values()
            .filter_map(|p| tables.with_worker(p))
            .collect())
    }

    async fn get_period(&self, id: i32) -> Result<Option<PayrollPeriod>, LedgerError> {
        Ok(self.tables.read().periods.get(&id).cloned())
    }

    async fn periods_for_worker(&self, worker_id: i32) -> Result<Vec<PayrollPeriod>, LedgerError> {
        Ok(self
            .tables
            .read()
            .periods
            .values()
            .filter(|p| p.trabajador_id == worker_id)
            .cloned()
            .collect())
    }

    async fn periods_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PeriodWithWorker>, LedgerError> {
        let tables = self.tables.read();
        let mut periods: Vec<PeriodWithWorker> = tables
            .periods
            .values()
            .filter(|p| p.fecha >= from && p.fecha <= to)
            .filter_map(|p| tables.with_worker(p))
            .collect();
        periods.sort_by(|a, b| a.period.fecha.cmp(&b.period.fecha));
        Ok(periods)
    }

    async fn create_period(
        &self,
        request: &CreatePeriodRequest,
    ) -> Result<PayrollPeriod, LedgerError> {
        let mut tables = self.tables.write();
        tables.next_period += 1;
        let period = PayrollPeriod {
            id: tables.next_period,
            trabajador_id: request.trabajador_id,
            fecha: request.fecha,
            cantidad: request.cantidad,
            extra: request.extra,
        };
        tables.periods.insert(period.id, period.clone());
        Ok(period)
    }

    async fn create_payment(&self, new_payment: &NewPayment) -> Result<Payment, LedgerError> {
        let mut tables = self.tables.write();
        tables.next_payment += 1;
        let payment = Payment {
            id: tables.next_payment,
            nomina_id: new_payment.nomina_id,
            monto: new_payment.monto,
            fecha: new_payment.fecha,
            estado: PaymentStatus::Created,
            fecha_pago: None,
            referencia: None,
            is_user: new_payment.is_user.clone(),
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, id: i32) -> Result<Option<Payment>, LedgerError> {
        Ok(self.tables.read().payments.get(&id).cloned())
    }

    async fn payment_detail(&self, id: i32) -> Result<Option<PaymentDetail>, LedgerError> {
        let tables = self.tables.read();
        Ok(tables.payments.get(&id).and_then(|p| tables.detail(p)))
    }

    async fn list_payment_details(&self) -> Result<Vec<PaymentDetail>, LedgerError> {
        let tables = self.tables.read();
        Ok(tables.details_newest_first(tables.payments.values()))
    }

    async fn payment_details_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentDetail>, LedgerError> {
        let tables = self.tables.read();
        Ok(tables.details_newest_first(
            tables
                .payments
                .values()
                .filter(|p| p.fecha >= from && p.fecha <= to),
        ))
    }

    async fn update_payment(&self, payment: &Payment) -> Result<(), LedgerError> {
        let mut tables = self.tables.write();
        let rows = match tables.payments.get_mut(&payment.id) {
            Some(stored) => {
                *stored = payment.clone();
                1
            }
            None => 0,
        };
        ensure_payment_updated(payment.id, rows)
    }
}
