use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::worker::models::Worker;

/// A payroll period ("nómina") owned by one worker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPeriod {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = 7)]
    pub trabajador_id: i32,
    #[schema(example = "2025-03-01", value_type = String, format = "date")]
    pub fecha: NaiveDate,
    #[schema(example = 1200.0)]
    pub cantidad: Decimal,
    #[schema(example = 300.0)]
    pub extra: Decimal,
}

impl PayrollPeriod {
    /// Base plus extra.
    pub fn total(&self) -> Decimal {
        self.cantidad + self.extra
    }
}

#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct PeriodWithWorker {
    #[serde(flatten)]
    pub period: PayrollPeriod,
    pub trabajador: Worker,
}

#[derive(Debug, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodRequest {
    #[schema(example = 7)]
    pub trabajador_id: i32,
    #[schema(example = "2025-03-01", value_type = String, format = "date")]
    pub fecha: NaiveDate,
    #[schema(example = 1200.0)]
    pub cantidad: Decimal,
    #[serde(default)]
    #[schema(example = 300.0)]
    pub extra: Decimal,
}

impl CreatePeriodRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.cantidad.is_sign_negative() || self.extra.is_sign_negative() {
            return Err("cantidad and extra must not be negative".to_string());
        }
        Ok(())
    }
}
