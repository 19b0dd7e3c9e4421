use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod invoice;
pub mod ledger;
pub mod payment;
pub mod pdf;
pub mod period;
pub mod worker;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        worker::handlers::list_workers,
        worker::handlers::get_worker,
        worker::handlers::create_worker,
        worker::handlers::update_worker,
        worker::handlers::delete_worker,
        period::handlers::list_periods,
        period::handlers::create_period,
        payment::handlers::create_checkout_session,
        payment::handlers::confirm_checkout,
        payment::handlers::list_payments,
        payment::handlers::get_payment,
        payment::handlers::payment_stats,
        payment::handlers::register_payment,
        payment::handlers::confirm_manually,
        payment::handlers::expense_report,
        payment::handlers::monthly_expense_report,
        invoice::handlers::generate_invoice,
        invoice::handlers::invoice_pdf,
        invoice::handlers::list_invoices,
        pdf::handlers::receipt_pdf,
        pdf::handlers::payroll_report_pdf
    ),
    components(
        schemas(
            worker::models::Worker,
            worker::models::WorkerRequest,
            period::models::PayrollPeriod,
            period::models::PeriodWithWorker,
            period::models::CreatePeriodRequest,
            payment::models::Payment,
            payment::models::PaymentStatus,
            payment::models::PaymentDetail,
            payment::models::CheckoutRequest,
            payment::models::CheckoutResponse,
            payment::models::ConfirmRequest,
            payment::models::ConfirmedPayment,
            payment::models::RegisterPaymentRequest,
            payment::models::RegisteredPaymentResponse,
            payment::models::ReportSummary,
            payment::models::PaymentStats,
            payment::models::StatusExample,
            invoice::models::InvoiceOutcome,
            invoice::models::InvoiceSummary,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Trabajador", description = "Worker CRUD endpoints."),
        (name = "Nomina", description = "Payroll period endpoints."),
        (name = "Pago", description = "Card checkout payments."),
        (name = "Pagar", description = "Direct payments and expense reports."),
        (name = "Factura", description = "Payroll invoices."),
        (name = "PDF", description = "Receipt and payroll report downloads.")
    ),
    servers(
        (url = "http://127.0.0.1:3005", description = "Localhost")
    )
)]
pub struct ApiDoc;

/// Registers every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(worker::handlers::config)
        .configure(period::handlers::config)
        .configure(payment::handlers::config)
        .configure(invoice::handlers::config)
        .configure(pdf::handlers::config);
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let app_state = match AppState::from_config(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialise application state. Check DATABASE_URL and that the database is running. Error: {:#}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("nomina_service")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let mut origins = vec![config.frontend_url.clone()];
    if let Some(gateway) = &config.gateway_url {
        origins.push(gateway.trim_end_matches('/').to_string());
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-user-id"),
                header::HeaderName::from_static("x-user-name"),
                header::HeaderName::from_static("x-user-role"),
            ])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
