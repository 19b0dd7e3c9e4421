use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{ensure_payment_updated, LedgerError, PayrollLedger};
use crate::payment::models::{NewPayment, Payment, PaymentDetail, PaymentStatus};
use crate::period::models::{CreatePeriodRequest, PayrollPeriod, PeriodWithWorker};
use crate::worker::models::{Worker, WorkerRequest};

const PAYMENT_DETAIL_SELECT: &str = r#"
    SELECT
        p.id, p.nomina_id, p.monto, p.fecha, p.estado, p.fecha_pago, p.referencia, p.is_user,
        n.trabajador_id, n.fecha AS nomina_fecha, n.cantidad, n.extra,
        t.nombre, t.tipo, t.sueldo
    FROM pagar p
    JOIN nomina n ON n.id = p.nomina_id
    JOIN trabajador t ON t.id = n.trabajador_id
"#;

const PERIOD_WITH_WORKER_SELECT: &str = r#"
    SELECT
        n.id, n.trabajador_id, n.fecha, n.cantidad, n.extra,
        t.nombre, t.tipo, t.sueldo
    FROM nomina n
    JOIN trabajador t ON t.id = n.trabajador_id
"#;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    nomina_id: i32,
    monto: Decimal,
    fecha: DateTime<Utc>,
    estado: Option<String>,
    fecha_pago: Option<DateTime<Utc>>,
    referencia: Option<String>,
    is_user: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = LedgerError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let estado = PaymentStatus::from_column(row.estado.as_deref()).map_err(LedgerError::Corrupt)?;
        Ok(Payment {
            id: row.id,
            nomina_id: row.nomina_id,
            monto: row.monto,
            fecha: row.fecha,
            estado,
            fecha_pago: row.fecha_pago,
            referencia: row.referencia,
            is_user: row.is_user,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentDetailRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    trabajador_id: i32,
    nomina_fecha: NaiveDate,
    cantidad: Decimal,
    extra: Decimal,
    nombre: String,
    tipo: String,
    sueldo: Decimal,
}

impl TryFrom<PaymentDetailRow> for PaymentDetail {
    type Error = LedgerError;

    fn try_from(row: PaymentDetailRow) -> Result<Self, Self::Error> {
        let nomina = PayrollPeriod {
            id: row.payment.nomina_id,
            trabajador_id: row.trabajador_id,
            fecha: row.nomina_fecha,
            cantidad: row.cantidad,
            extra: row.extra,
        };
        let trabajador = Worker {
            id: row.trabajador_id,
            nombre: row.nombre,
            tipo: row.tipo,
            sueldo: row.sueldo,
        };
        Ok(PaymentDetail {
            payment: row.payment.try_into()?,
            nomina,
            trabajador,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PeriodWithWorkerRow {
    #[sqlx(flatten)]
    period: PayrollPeriod,
    nombre: String,
    tipo: String,
    sueldo: Decimal,
}

impl From<PeriodWithWorkerRow> for PeriodWithWorker {
    fn from(row: PeriodWithWorkerRow) -> Self {
        let trabajador = Worker {
            id: row.period.trabajador_id,
            nombre: row.nombre,
            tipo: row.tipo,
            sueldo: row.sueldo,
        };
        PeriodWithWorker {
            period: row.period,
            trabajador,
        }
    }
}

fn into_details(rows: Vec<PaymentDetailRow>) -> Result<Vec<PaymentDetail>, LedgerError> {
    rows.into_iter().map(PaymentDetail::try_from).collect()
}

/// PostgreSQL-backed ledger.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayrollLedger for PgLedger {
    async fn list_workers(&self) -> Result<Vec<Worker>, LedgerError> {
        let workers = sqlx::query_as::<_, Worker>(
            "SELECT id, nombre, tipo, sueldo FROM trabajador ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(workers)
    }

    async fn get_worker(&self, id: i32) -> Result<Option<Worker>, LedgerError> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT id, nombre, tipo, sueldo FROM trabajador WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    async fn create_worker(&self, request: &WorkerRequest) -> Result<Worker, LedgerError> {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            INSERT INTO trabajador (nombre, tipo, sueldo)
            VALUES ($1, $2, $3)
            RETURNING id, nombre, tipo, sueldo
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.tipo)
        .bind(request.sueldo)
        .fetch_one(&self.pool)
        .await?;
        Ok(worker)
    }

    async fn update_worker(
        &self,
        id: i32,
        request: &WorkerRequest,
    ) -> Result<Option<Worker>, LedgerError> {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            UPDATE trabajador SET nombre = $2, tipo = $3, sueldo = $4
            WHERE id = $1
            RETURNING id, nombre, tipo, sueldo
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.tipo)
        .bind(request.sueldo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    async fn delete_worker(&self, id: i32) -> Result<bool, LedgerError> {
        let result = sqlx::query("DELETE FROM trabajador WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_periods(&self) -> Result<Vec<PeriodWithWorker>, LedgerError> {
        let query = format!("{} ORDER BY n.fecha DESC, n.id DESC", PERIOD_WITH_WORKER_SELECT);
        let rows = sqlx::query_as::<_, PeriodWithWorkerRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PeriodWithWorker::from).collect())
    }

    async fn get_period(&self, id: i32) -> Result<Option<PayrollPeriod>, LedgerError> {
        let period = sqlx::query_as::<_, PayrollPeriod>(
            "SELECT id, trabajador_id, fecha, cantidad, extra FROM nomina WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    async fn periods_for_worker(&self, worker_id: i32) -> Result<Vec<PayrollPeriod>, LedgerError> {
        let periods = sqlx::query_as::<_, PayrollPeriod>(
            "SELECT id, trabajador_id, fecha, cantidad, extra FROM nomina WHERE trabajador_id = $1",
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    async fn periods_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PeriodWithWorker>, LedgerError> {
        let query = format!(
            "{} WHERE n.fecha >= $1 AND n.fecha <= $2 ORDER BY n.fecha ASC, n.id ASC",
            PERIOD_WITH_WORKER_SELECT
        );
        let rows = sqlx::query_as::<_, PeriodWithWorkerRow>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PeriodWithWorker::from).collect())
    }

    async fn create_period(
        &self,
        request: &CreatePeriodRequest,
    ) -> Result<PayrollPeriod, LedgerError> {
        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            INSERT INTO nomina (trabajador_id, fecha, cantidad, extra)
            VALUES ($1, $2, $3, $4)
            RETURNING id, trabajador_id, fecha, cantidad, extra
            "#,
        )
        .bind(request.trabajador_id)
        .bind(request.fecha)
        .bind(request.cantidad)
        .bind(request.extra)
        .fetch_one(&self.pool)
        .await?;
        Ok(period)
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<Payment, LedgerError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO pagar (nomina_id, monto, fecha, is_user)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nomina_id, monto, fecha, estado, fecha_pago, referencia, is_user
            "#,
        )
        .bind(payment.nomina_id)
        .bind(payment.monto)
        .bind(payment.fecha)
        .bind(&payment.is_user)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn get_payment(&self, id: i32) -> Result<Option<Payment>, LedgerError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, nomina_id, monto, fecha, estado, fecha_pago, referencia, is_user
            FROM pagar WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn payment_detail(&self, id: i32) -> Result<Option<PaymentDetail>, LedgerError> {
        let query = format!("{} WHERE p.id = $1", PAYMENT_DETAIL_SELECT);
        let row = sqlx::query_as::<_, PaymentDetailRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(PaymentDetail::try_from).transpose()
    }

    async fn list_payment_details(&self) -> Result<Vec<PaymentDetail>, LedgerError> {
        let query = format!("{} ORDER BY p.fecha DESC, p.id DESC", PAYMENT_DETAIL_SELECT);
        let rows = sqlx::query_as::<_, PaymentDetailRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        into_details(rows)
    }

    async fn payment_details_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentDetail>, LedgerError> {
        let query = format!(
            "{} WHERE p.fecha >= $1 AND p.fecha <= $2 ORDER BY p.fecha DESC, p.id DESC",
            PAYMENT_DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, PaymentDetailRow>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        into_details(rows)
    }

    async fn update_payment(&self, payment: &Payment) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE pagar SET estado = $2, fecha_pago = $3, referencia = $4
            WHERE id = $1
            "#,
        )
        .bind(payment.id)
        .bind(payment.estado.as_str())
        .bind(payment.fecha_pago)
        .bind(payment.referencia.as_deref())
        .execute(&self.pool)
        .await?;
        ensure_payment_updated(payment.id, result.rows_affected())
    }
}
