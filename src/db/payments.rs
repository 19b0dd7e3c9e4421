//! Payment flows: card checkout, direct registration and confirmation

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::AppState;
use crate::error::ServiceError;
use crate::gateway::CheckoutSessionRequest;
use crate::payment::models::{
    CheckoutRequest, CheckoutResponse, ConfirmedPayment, NewPayment, Payment, PaymentDetail,
    PaymentStats, RegisterPaymentRequest, RegisteredPaymentResponse,
};

impl AppState {
    /// Records a pending payment and opens a checkout session for it.
    pub async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        acting_user: &str,
    ) -> Result<CheckoutResponse, ServiceError> {
        if request.monto <= Decimal::ZERO {
            return Err(ServiceError::validation("monto must be greater than zero"));
        }
        let worker = self.require_worker(request.trabajador_id).await?;
        let period = self
            .ledger
            .get_period(request.nomina_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Nómina {} no encontrada", request.nomina_id))
            })?;
        if period.trabajador_id != worker.id {
            return Err(ServiceError::validation(format!(
                "La nómina {} no pertenece al trabajador {}",
                period.id, worker.id
            )));
        }

        let payment = self
            .ledger
            .create_payment(&NewPayment {
                nomina_id: period.id,
                monto: request.monto,
                fecha: Utc::now(),
                is_user: acting_user.to_string(),
            })
            .await?;
        log::info!("Payment {} created for period {}", payment.id, period.id);

        let mut metadata = BTreeMap::new();
        metadata.insert("pago_id".to_string(), payment.id.to_string());
        metadata.insert("nomina_id".to_string(), period.id.to_string());
        metadata.insert("trabajador_id".to_string(), worker.id.to_string());
        metadata.insert("tipo".to_string(), "pago_nomina".to_string());

        let session = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                product_name: format!("Pago de Nómina - {}", worker.nombre),
                description: format!(
                    "Pago de sueldo y extras para {} ({})",
                    worker.nombre, worker.tipo
                ),
                amount: request.monto,
                success_url: format!(
                    "{}/pagos?success=true&pago_id={}&session_id={{CHECKOUT_SESSION_ID}}",
                    self.frontend_url, payment.id
                ),
                cancel_url: format!(
                    "{}/pagos?canceled=true&pago_id={}",
                    self.frontend_url, payment.id
                ),
                metadata,
            })
            .await?;
        log::info!("Checkout session {} opened for payment {}", session.id, payment.id);

        Ok(CheckoutResponse {
            pago_id: payment.id,
            session_id: session.id,
            url: session.url,
            trabajador: worker.nombre,
            monto: request.monto,
        })
    }

    /// Completes a checkout payment once the provider reports it paid, then invoices it.
    ///
    /// The payment stays completed even if the invoice cannot be produced.
    pub async fn confirm_checkout(
        &self,
        pago_id: i32,
        session_id: &str,
    ) -> Result<ConfirmedPayment, ServiceError> {
        let mut payment = self.require_payment(pago_id).await?;
        if !self.gateway.is_paid(session_id).await? {
            return Err(ServiceError::Upstream(
                "El pago no ha sido completado en Stripe".to_string(),
            ));
        }
        self.complete_payment(&mut payment, Some(session_id.to_string()))
            .await?;
        let detail = self.require_payment_detail(pago_id).await?;

        let factura = match self.generate_invoice(pago_id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                log::error!("Invoice generation failed for payment {}: {}", pago_id, e);
                None
            }
        };
        Ok(ConfirmedPayment { detail, factura })
    }

    /// Records a payment without the card provider and issues its receipt.
    pub async fn register_payment(
        &self,
        request: &RegisterPaymentRequest,
        acting_user: &str,
    ) -> Result<RegisteredPaymentResponse, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;
        if self.ledger.get_period(request.nomina_id).await?.is_none() {
            return Err(ServiceError::not_found(format!(
                "Nómina {} no encontrada",
                request.nomina_id
            )));
        }
        let payment = self
            .ledger
            .create_payment(&NewPayment {
                nomina_id: request.nomina_id,
                monto: request.monto,
                fecha: Utc::now(),
                is_user: acting_user.to_string(),
            })
            .await?;
        let detail = self.require_payment_detail(payment.id).await?;
        let receipt = self.issue_receipt(&detail).await?;

        Ok(RegisteredPaymentResponse {
            success: true,
            pago: payment,
            comprobante_pdf: receipt.path.display().to_string(),
            mensaje: "Pago creado exitosamente y PDF generado".to_string(),
        })
    }

    /// Completes a payment by hand and issues a fresh receipt.
    pub async fn confirm_manually(
        &self,
        pago_id: i32,
    ) -> Result<RegisteredPaymentResponse, ServiceError> {
        let mut payment = self.require_payment(pago_id).await?;
        self.complete_payment(&mut payment, None).await?;
        let detail = self.require_payment_detail(pago_id).await?;
        let receipt = self.issue_receipt(&detail).await?;

        Ok(RegisteredPaymentResponse {
            success: true,
            pago: detail.payment,
            comprobante_pdf: receipt.path.display().to_string(),
            mensaje: "Pago confirmado exitosamente - Estado actualizado a COMPLETADO".to_string(),
        })
    }

    pub async fn list_payments(&self) -> Result<Vec<PaymentDetail>, ServiceError> {
        Ok(self.ledger.list_payment_details().await?)
    }

    pub async fn payment_stats(&self) -> Result<PaymentStats, ServiceError> {
        let details = self.ledger.list_payment_details().await?;
        Ok(PaymentStats::from_details(&details))
    }

    async fn require_payment(&self, id: i32) -> Result<Payment, ServiceError> {
        self.ledger
            .get_payment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Pago {} no encontrado", id)))
    }

    async fn complete_payment(
        &self,
        payment: &mut Payment,
        reference: Option<String>,
    ) -> Result<(), ServiceError> {
        payment
            .complete(Utc::now(), reference)
            .map_err(ServiceError::Validation)?;
        self.ledger.update_payment(payment).await?;
        log::info!("Payment {} marked {}", payment.id, payment.estado.as_str());
        Ok(())
    }
}
