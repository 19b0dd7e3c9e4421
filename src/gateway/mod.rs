//! Payment capability: external checkout sessions and their paid status.

mod stripe;

pub use stripe::{StripeConfig, StripeGateway};

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment provider is not configured")]
    NotConfigured,
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("payment amount {0} cannot be expressed in cents")]
    InvalidAmount(Decimal),
    #[error("checkout session id '{0}' is malformed")]
    InvalidSessionId(String),
}

/// What the provider needs to open a card checkout for one payroll payment.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub description: String,
    pub amount: Decimal,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Whether the session reached the paid state.
    async fn is_paid(&self, session_id: &str) -> Result<bool, GatewayError>;
}

/// Stand-in used when no provider key is configured; every call fails.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_checkout_session(
        &self,
        _request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn is_paid(&self, _session_id: &str) -> Result<bool, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}
