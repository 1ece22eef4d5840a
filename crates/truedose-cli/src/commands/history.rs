use truedose_core::Database;

pub fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let results = db.recent_results(limit)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
