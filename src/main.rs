#[actix_web::main]
async fn main() -> std::io::Result<()> {
    nomina_service::run().await
}
