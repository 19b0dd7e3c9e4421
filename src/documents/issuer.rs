/// Identity of the company issuing receipts and invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerProfile {
    pub nit: String,
    pub razon_social: String,
    pub nombre: String,
    pub autorizacion: String,
    pub direccion: String,
    pub telefono: String,
    pub email: String,
    pub sucursal: String,
    pub municipio: String,
    pub actividad_economica: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            nit: "1234567890123".to_string(),
            razon_social: "CITYLIGHTS NOMINAS S.R.L.".to_string(),
            nombre: "CITYLIGHTS NOMINAS".to_string(),
            autorizacion: "29040011008".to_string(),
            direccion: "Av. Arce #2345, Edificio Torre Empresarial, Piso 16, La Paz, Bolivia"
                .to_string(),
            telefono: "+591 2 2345679".to_string(),
            email: "nominas@citylights.com".to_string(),
            sucursal: "Departamento de RRHH".to_string(),
            municipio: "La Paz".to_string(),
            actividad_economica: "820200 - Actividades de servicios de apoyo administrativo"
                .to_string(),
        }
    }
}
