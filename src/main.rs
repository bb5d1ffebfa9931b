#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    syllabus_seeker::run().await
}
