#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use nomina_service::gateway::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway,
};
use nomina_service::ledger::{InMemoryLedger, PayrollLedger};
use nomina_service::payment::models::{Payment, PaymentStatus};
use nomina_service::period::models::{CreatePeriodRequest, PayrollPeriod};
use nomina_service::worker::models::{Worker, WorkerRequest};
use nomina_service::AppState;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const FRONTEND_URL: &str = "http://localhost:5173";

/// Gateway double: every session gets a fixed id, `is_paid` answers from a flag.
#[derive(Default)]
pub struct MockGateway {
    paid: AtomicBool,
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
}

impl MockGateway {
    pub fn paid() -> Self {
        let gateway = Self::default();
        gateway.set_paid(true);
        gateway
    }

    pub fn set_paid(&self, paid: bool) {
        self.paid.store(paid, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.requests.lock().push(request.clone());
        Ok(CheckoutSession {
            id: "cs_test_mock".to_string(),
            url: Some("https://checkout.test/cs_test_mock".to_string()),
        })
    }

    async fn is_paid(&self, _session_id: &str) -> Result<bool, GatewayError> {
        Ok(self.paid.load(Ordering::SeqCst))
    }
}

pub struct Fixture {
    pub ledger: Arc<InMemoryLedger>,
    pub gateway: Arc<MockGateway>,
    pub state: AppState,
    pub worker: Worker,
    pub period: PayrollPeriod,
}

pub fn test_state(
    ledger: Arc<InMemoryLedger>,
    gateway: Arc<MockGateway>,
    documents_dir: &Path,
) -> AppState {
    AppState::new_with_parts(ledger, gateway, documents_dir, FRONTEND_URL)
}

/// Seeds one worker ("Ana Paredes", fijo) with one period of 1200 + 300.
pub async fn fixture(documents_dir: &Path, gateway: MockGateway) -> Fixture {
    let ledger = Arc::new(InMemoryLedger::new());
    let gateway = Arc::new(gateway);
    let worker = ledger
        .create_worker(&WorkerRequest {
            nombre: "Ana Paredes".to_string(),
            tipo: "fijo".to_string(),
            sueldo: Decimal::new(3500, 0),
        })
        .await
        .unwrap();
    let period = ledger
        .create_period(&CreatePeriodRequest {
            trabajador_id: worker.id,
            fecha: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            cantidad: Decimal::new(1200, 0),
            extra: Decimal::new(300, 0),
        })
        .await
        .unwrap();
    let state = test_state(ledger.clone(), gateway.clone(), documents_dir);
    Fixture {
        ledger,
        gateway,
        state,
        worker,
        period,
    }
}

/// Pending payment with a fixed id, dated in March 2025.
pub fn seed_payment(fixture: &Fixture, id: i32, monto: Decimal) -> Payment {
    let payment = Payment {
        id,
        nomina_id: fixture.period.id,
        monto,
        fecha: Utc.with_ymd_and_hms(2025, 3, 20, 14, 30, 0).unwrap(),
        estado: PaymentStatus::Created,
        fecha_pago: None,
        referencia: None,
        is_user: "1".to_string(),
    };
    fixture.ledger.insert_payment(payment.clone());
    payment
}
