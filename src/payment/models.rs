use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::invoice::models::InvoiceOutcome;
use crate::period::models::PayrollPeriod;
use crate::worker::models::Worker;

pub const STATUS_PENDING: &str = "PENDIENTE";
pub const STATUS_COMPLETED: &str = "COMPLETADO";

/// Payment lifecycle. The only legal move is `Created -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "PENDIENTE")]
    Created,
    #[serde(rename = "COMPLETADO")]
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => STATUS_PENDING,
            Self::Completed => STATUS_COMPLETED,
        }
    }

    /// Reads the stored column; a missing value means the payment was never confirmed.
    pub fn from_column(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") | Some(STATUS_PENDING) | Some("PENDING") => Ok(Self::Created),
            Some(STATUS_COMPLETED) => Ok(Self::Completed),
            Some(other) => Err(format!("unknown payment status '{}'", other)),
        }
    }

    pub fn transition_to(self, next: PaymentStatus) -> Result<PaymentStatus, String> {
        match (self, next) {
            (Self::Created, Self::Completed) => Ok(next),
            (from, to) => Err(format!(
                "payment status cannot change from {} to {}",
                from.as_str(),
                to.as_str()
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = 12)]
    pub nomina_id: i32,
    #[schema(example = 1500.0)]
    pub monto: Decimal,
    pub fecha: DateTime<Utc>,
    pub estado: PaymentStatus,
    pub fecha_pago: Option<DateTime<Utc>>,
    #[schema(example = "cs_test_a1b2c3")]
    pub referencia: Option<String>,
    /// Identifier of the acting user as forwarded by the gateway.
    #[serde(rename = "is_user")]
    #[schema(example = "1")]
    pub is_user: String,
}

impl Payment {
    /// Marks the payment completed, stamping the payment date and reference.
    pub fn complete(
        &mut self,
        paid_at: DateTime<Utc>,
        reference: Option<String>,
    ) -> Result<(), String> {
        self.estado = self.estado.transition_to(PaymentStatus::Completed)?;
        self.fecha_pago = Some(paid_at);
        if reference.is_some() {
            self.referencia = reference;
        }
        Ok(())
    }
}

/// Fields needed to record a new payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub nomina_id: i32,
    pub monto: Decimal,
    pub fecha: DateTime<Utc>,
    pub is_user: String,
}

/// A payment joined with its payroll period and that period's worker.
#[derive(Debug, Serialize, Clone, PartialEq, ToSchema)]
pub struct PaymentDetail {
    #[serde(flatten)]
    pub payment: Payment,
    pub nomina: PayrollPeriod,
    pub trabajador: Worker,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = 7)]
    pub trabajador_id: i32,
    #[schema(example = 12)]
    pub nomina_id: i32,
    #[schema(example = 1500.0)]
    pub monto: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub pago_id: i32,
    pub session_id: String,
    pub url: Option<String>,
    pub trabajador: String,
    pub monto: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[schema(example = "cs_test_a1b2c3")]
    pub session_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentRequest {
    #[schema(example = 12)]
    pub nomina_id: i32,
    #[schema(example = 1500.0)]
    pub monto: Decimal,
}

impl RegisterPaymentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.monto <= Decimal::ZERO {
            return Err("monto must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPaymentResponse {
    pub success: bool,
    pub pago: Payment,
    #[serde(rename = "egresoPDF")]
    pub comprobante_pdf: String,
    pub mensaje: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub success: bool,
    #[serde(rename = "reportePDF")]
    pub reporte_pdf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anio: Option<i32>,
    pub total_pagos: usize,
    pub monto_total: Decimal,
    pub mensaje: String,
}

/// A checkout payment after confirmation, with its invoice when one could be issued.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmedPayment {
    #[serde(flatten)]
    pub detail: PaymentDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factura: Option<InvoiceOutcome>,
}

#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct StatusExample {
    pub id: i32,
    pub monto: Decimal,
    pub fecha: DateTime<Utc>,
    pub trabajador: String,
}

/// Count of payments per status with one example each.
#[derive(Debug, Serialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub total_pagos: usize,
    pub estados_por_cantidad: BTreeMap<String, usize>,
    pub ejemplos_por_estado: BTreeMap<String, StatusExample>,
}

impl PaymentStats {
    pub fn from_details(details: &[PaymentDetail]) -> Self {
        let mut stats = Self {
            total_pagos: details.len(),
            ..Self::default()
        };
        for detail in details {
            let estado = detail.payment.estado.as_str().to_string();
            *stats.estados_por_cantidad.entry(estado.clone()).or_insert(0) += 1;
            stats
                .ejemplos_por_estado
                .entry(estado)
                .or_insert_with(|| StatusExample {
                    id: detail.payment.id,
                    monto: detail.payment.monto,
                    fecha: detail.payment.fecha,
                    trabajador: detail.trabajador.nombre.clone(),
                });
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_created_to_completed_is_allowed() {
        assert_eq!(
            PaymentStatus::Created.transition_to(PaymentStatus::Completed),
            Ok(PaymentStatus::Completed)
        );
        assert!(PaymentStatus::Completed
            .transition_to(PaymentStatus::Completed)
            .is_err());
        assert!(PaymentStatus::Completed
            .transition_to(PaymentStatus::Created)
            .is_err());
        assert!(PaymentStatus::Created
            .transition_to(PaymentStatus::Created)
            .is_err());
    }

    #[test]
    fn test_status_column_reading() {
        assert_eq!(PaymentStatus::from_column(None), Ok(PaymentStatus::Created));
        assert_eq!(PaymentStatus::from_column(Some("PENDING")), Ok(PaymentStatus::Created));
        assert_eq!(
            PaymentStatus::from_column(Some("COMPLETADO")),
            Ok(PaymentStatus::Completed)
        );
        assert!(PaymentStatus::from_column(Some("ANULADO")).is_err());
    }

    #[test]
    fn test_status_serializes_as_stored_text() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"COMPLETADO\""
        );
    }

    #[test]
    fn test_register_request_rejects_non_positive_amounts() {
        let request = RegisterPaymentRequest {
            nomina_id: 1,
            monto: Decimal::ZERO,
        };
        assert!(request.validate().is_err());
    }
}
