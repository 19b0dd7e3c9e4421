use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound, in characters, for `nombre` and `tipo`.
pub const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema, sqlx::FromRow)]
pub struct Worker {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Ana Paredes")]
    pub nombre: String,
    /// Free-text category, e.g. "fijo" or "eventual".
    #[schema(example = "fijo")]
    pub tipo: String,
    #[schema(example = 3500.0)]
    pub sueldo: Decimal,
}

#[derive(Debug, Deserialize, Clone, ToSchema)]
pub struct WorkerRequest {
    #[schema(example = "Ana Paredes")]
    pub nombre: String,
    #[schema(example = "fijo")]
    pub tipo: String,
    #[schema(example = 3500.0)]
    pub sueldo: Decimal,
}

impl WorkerRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.nombre.trim().is_empty() {
            return Err("nombre must not be empty".to_string());
        }
        if self.tipo.trim().is_empty() {
            return Err("tipo must not be empty".to_string());
        }
        if self.nombre.chars().count() > MAX_TEXT_LEN {
            return Err(format!("nombre must be at most {} characters", MAX_TEXT_LEN));
        }
        if self.tipo.chars().count() > MAX_TEXT_LEN {
            return Err(format!("tipo must be at most {} characters", MAX_TEXT_LEN));
        }
        if self.sueldo.is_sign_negative() {
            return Err("sueldo must not be negative".to_string());
        }
        Ok(())
    }
}
