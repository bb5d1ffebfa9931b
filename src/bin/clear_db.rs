#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let report = syllabus_seeker::clear_database().await?;
    println!("Removed {} rows", report.total());
    Ok(())
}
