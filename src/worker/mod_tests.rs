#[cfg(test)]
mod tests {
    use crate::worker::models::{Worker, WorkerRequest, MAX_TEXT_LEN};
    use rust_decimal::Decimal;

    fn request(nombre: &str, tipo: &str, sueldo: Decimal) -> WorkerRequest {
        WorkerRequest {
            nombre: nombre.to_string(),
            tipo: tipo.to_string(),
            sueldo,
        }
    }

    #[test]
    fn test_worker_request_valid() {
        let req = request("Ana Paredes", "fijo", Decimal::new(3500, 0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_worker_request_rejects_blank_fields() {
        assert!(request("  ", "fijo", Decimal::ONE).validate().is_err());
        assert!(request("Ana", "", Decimal::ONE).validate().is_err());
    }

    #[test]
    fn test_worker_request_text_length_limit() {
        let at_limit = "ñ".repeat(MAX_TEXT_LEN);
        let over_limit = "a".repeat(MAX_TEXT_LEN + 1);
        assert!(request(&at_limit, &at_limit, Decimal::ONE).validate().is_ok());
        assert_eq!(
            request(&over_limit, "fijo", Decimal::ONE).validate().unwrap_err(),
            "nombre must be at most 255 characters"
        );
        assert_eq!(
            request("Ana", &over_limit, Decimal::ONE).validate().unwrap_err(),
            "tipo must be at most 255 characters"
        );
    }

    #[test]
    fn test_worker_request_rejects_negative_salary() {
        let req = request("Ana", "fijo", Decimal::new(-1, 0));
        assert_eq!(req.validate().unwrap_err(), "sueldo must not be negative");
    }

    #[test]
    fn test_worker_deserializes_numeric_salary() {
        let json = r#"{"id": 7, "nombre": "Ana Paredes", "tipo": "fijo", "sueldo": 3500.5}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.sueldo, Decimal::new(35005, 1));
    }
}
