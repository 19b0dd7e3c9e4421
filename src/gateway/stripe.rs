//! Stripe Checkout over its REST API.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use uuid::Uuid;

use super::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};

const DEFAULT_API_BASE: &str = "https://api.stripe.com";
const CURRENCY: &str = "usd";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SessionBody {
    id: String,
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub struct StripeGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/v1/checkout/sessions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// `GET` target for one session; ids are restricted to Stripe's own alphabet.
    fn session_url(&self, session_id: &str) -> Result<reqwest::Url, GatewayError> {
        let well_formed = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !well_formed {
            return Err(GatewayError::InvalidSessionId(session_id.to_string()));
        }
        let mut url = reqwest::Url::parse(&self.sessions_url())
            .map_err(|_| GatewayError::InvalidSessionId(session_id.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidSessionId(session_id.to_string()))?
            .push(session_id);
        Ok(url)
    }

    async fn read_session(response: reqwest::Response) -> Result<SessionBody, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SessionBody>().await?);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message.unwrap_or_default(),
            Err(_) => String::new(),
        };
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Stripe handles amounts in the smallest currency unit.
pub fn to_cents(amount: Decimal) -> Result<i64, GatewayError> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .filter(|cents| *cents > 0)
        .ok_or(GatewayError::InvalidAmount(amount))
}

/// Form fields for `POST /v1/checkout/sessions`.
pub fn session_form(request: &CheckoutSessionRequest) -> Result<Vec<(String, String)>, GatewayError> {
    let cents = to_cents(request.amount)?;
    let item = "line_items[0]";
    let mut form = vec![
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("mode".to_string(), "payment".to_string()),
        (format!("{item}[quantity]"), "1".to_string()),
        (format!("{item}[price_data][currency]"), CURRENCY.to_string()),
        (format!("{item}[price_data][unit_amount]"), cents.to_string()),
        (
            format!("{item}[price_data][product_data][name]"),
            request.product_name.clone(),
        ),
        (
            format!("{item}[price_data][product_data][description]"),
            request.description.clone(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
        form.push((
            format!("{item}[price_data][product_data][metadata][{key}]"),
            value.clone(),
        ));
    }
    Ok(form)
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let form = session_form(request)?;
        log::debug!("Creating Stripe checkout session for {}", request.product_name);

        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.config.secret_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&form)
            .send()
            .await?;

        let session = Self::read_session(response).await?;
        log::info!("Stripe checkout session created: {}", session.id);
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn is_paid(&self, session_id: &str) -> Result<bool, GatewayError> {
        let url = self.session_url(session_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let session = Self::read_session(response).await?;
        log::debug!(
            "Stripe session {} payment_status={:?}",
            session.id,
            session.payment_status
        );
        Ok(session.payment_status.as_deref() == Some("paid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn gateway() -> StripeGateway {
        StripeGateway::new(
            StripeConfig {
                secret_key: "sk_test_key".to_string(),
                api_base: "http://127.0.0.1:9/".to_string(),
            },
            reqwest::Client::new(),
        )
    }

    fn request(amount: Decimal) -> CheckoutSessionRequest {
        let mut metadata = BTreeMap::new();
        metadata.insert("pago_id".to_string(), "42".to_string());
        CheckoutSessionRequest {
            product_name: "Pago de Nómina - Ana Paredes".to_string(),
            description: "Pago de sueldo y extras".to_string(),
            amount,
            success_url: "http://localhost:5173/pagos?success=true".to_string(),
            cancel_url: "http://localhost:5173/pagos?canceled=true".to_string(),
            metadata,
        }
    }

    #[test]
    fn test_to_cents_rounds_half_cents() {
        assert_eq!(to_cents(Decimal::new(150000, 2)).unwrap(), 150000);
        assert_eq!(to_cents(Decimal::new(10005, 3)).unwrap(), 1001);
    }

    #[test]
    fn test_to_cents_rejects_zero() {
        assert!(matches!(
            to_cents(Decimal::ZERO),
            Err(GatewayError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_session_form_carries_amount_and_metadata() {
        let form = session_form(&request(Decimal::new(1500, 0))).unwrap();
        let lookup = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(lookup("line_items[0][price_data][unit_amount]"), Some("150000"));
        assert_eq!(lookup("metadata[pago_id]"), Some("42"));
        assert_eq!(lookup("mode"), Some("payment"));
    }

    #[test]
    fn test_session_url_appends_one_segment() {
        let url = gateway().session_url("cs_test_a1B2c3").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v1/checkout/sessions/cs_test_a1B2c3"
        );
    }

    #[test]
    fn test_session_url_rejects_foreign_characters() {
        for id in ["", "../../v1/customers", "cs_test/refunds", "cs_test?expand=x", "cs test", "cs%2F"] {
            assert!(
                matches!(
                    gateway().session_url(id),
                    Err(GatewayError::InvalidSessionId(_))
                ),
                "{:?}",
                id
            );
        }
    }

    #[tokio::test]
    async fn test_is_paid_rejects_malformed_id_before_sending() {
        // Nothing listens on port 9, so only an early rejection yields InvalidSessionId.
        let result = gateway().is_paid("../../v1/balance").await;
        assert!(matches!(result, Err(GatewayError::InvalidSessionId(_))));
    }
}
