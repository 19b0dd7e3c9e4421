mod common;

#[cfg(test)]
mod api_tests {
    use super::common::{fixture, seed_payment, MockGateway};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use nomina_service::ledger::PayrollLedger;
    use nomina_service::payment::models::PaymentStatus;
    use nomina_service::{configure_api, ErrorResponse};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(web::scope("/api").configure(configure_api)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_unknown_worker_is_404_json() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::get().uri("/api/trabajador/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "NotFound");
        assert!(body.message.contains("999"));
        assert!(!body.timestamp.is_empty());
    }

    #[actix_web::test]
    async fn test_non_numeric_id_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        for uri in ["/api/trabajador/abc", "/api/pago/x1", "/api/factura/generar/abc"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.error, "ValidationFailure");
        }
    }

    #[actix_web::test]
    async fn test_worker_crud() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/trabajador")
            .set_json(json!({"nombre": "Luis Quispe", "tipo": "eventual", "sueldo": 2100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/trabajador/{}", id))
            .set_json(json!({"nombre": "Luis Quispe", "tipo": "fijo", "sueldo": 2500}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["tipo"], "fijo");

        let req = test::TestRequest::get().uri("/api/trabajador").to_request();
        let workers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(workers.len(), 2);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/trabajador/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/trabajador").to_request();
        let workers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(workers.len(), 1);
    }

    #[actix_web::test]
    async fn test_worker_with_periods_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/trabajador/{}", fx.worker.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(fx.ledger.get_worker(fx.worker.id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_invalid_worker_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/trabajador")
            .set_json(json!({"nombre": " ", "tipo": "fijo", "sueldo": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/trabajador")
            .set_json(json!({"nombre": "n".repeat(3000), "tipo": "fijo", "sueldo": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.message.contains("255"));

        let req = test::TestRequest::put()
            .uri(&format!("/api/trabajador/{}", fx.worker.id))
            .set_json(json!({"nombre": "n".repeat(256), "tipo": "fijo", "sueldo": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_create_period_for_unknown_worker() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/nomina")
            .set_json(json!({"trabajadorId": 999, "fecha": "2025-03-01", "cantidad": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/nomina").to_request();
        let periods: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0]["trabajador"]["nombre"], "Ana Paredes");
    }

    #[actix_web::test]
    async fn test_register_payment_records_acting_user() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/pagar")
            .insert_header(("x-user-id", "15"))
            .set_json(json!({"nominaId": fx.period.id, "monto": 1500}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert!(body["egresoPDF"].as_str().unwrap().contains("comprobante_nomina_"));

        let id = body["pago"]["id"].as_i64().unwrap() as i32;
        let payment = fx.ledger.get_payment(id).await.unwrap().unwrap();
        assert_eq!(payment.is_user, "15");
    }

    #[actix_web::test]
    async fn test_stats_route_is_not_shadowed_by_id_route() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        seed_payment(&fx, 3, Decimal::new(500, 0));
        let app = app!(fx.state.clone());

        let req = test::TestRequest::get().uri("/api/pago/debug/estados").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["totalPagos"], 1);
        assert_eq!(stats["estadosPorCantidad"]["PENDIENTE"], 1);
    }

    #[actix_web::test]
    async fn test_confirm_checkout_route() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::paid()).await;
        seed_payment(&fx, 42, Decimal::new(1500, 0));
        let app = app!(fx.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/pago/confirmar/42")
            .set_json(json!({"sessionId": "cs_test_mock"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["estado"], "COMPLETADO");
        assert_eq!(body["factura"]["numeroFactura"], "NOM-00000042");

        let payment = fx.ledger.get_payment(42).await.unwrap().unwrap();
        assert_eq!(payment.estado, PaymentStatus::Completed);
    }

    #[actix_web::test]
    async fn test_invoice_download() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        seed_payment(&fx, 42, Decimal::new(1500, 0));
        let app = app!(fx.state.clone());

        let req = test::TestRequest::get().uri("/api/factura/pdf/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/factura/generar/42").to_request();
        let outcome: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome["existe"], false);

        let req = test::TestRequest::get().uri("/api/factura/pdf/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("factura_nomina_42.pdf"));
        let bytes = test::read_body(resp).await;
        assert!(bytes.starts_with(b"%PDF-"));

        let req = test::TestRequest::get().uri("/api/factura").to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], 42);
    }

    #[actix_web::test]
    async fn test_payroll_report_accepts_ano_alias() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        let app = app!(fx.state.clone());

        let req = test::TestRequest::get()
            .uri("/api/pdf/reporte?mes=3&a%C3%B1o=2025")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap(),
            "application/pdf"
        );

        let req = test::TestRequest::get()
            .uri("/api/pdf/reporte?mes=13&anio=2025")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_receipt_download() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), MockGateway::default()).await;
        seed_payment(&fx, 8, Decimal::new(700, 0));
        let app = app!(fx.state.clone());

        let req = test::TestRequest::get().uri("/api/pdf/comprobante/8").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/pdf/comprobante/9").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
