//! Find With Sort Example
//!
//! Runs a two-group find (Timer readings OR Manual readings, excluding
//! zero values), sorted newest first, with a script after the request.
//!
//! Run with: FM_HOST=fm.example.com FM_PASSWORD=secret cargo run --example find_with_sort

use fmdata_rs::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let host = std::env::var("FM_HOST").unwrap_or_else(|_| "localhost".to_string());
    let password = std::env::var("FM_PASSWORD").unwrap_or_default();

    let credentials = DatabaseCredentials::user("iot", "device", password)?;
    let mut client = Client::from_config(&ClientConfig::new(host), credentials, None)?;
    client.log_in().await?;

    let request = FindRequest::new(vec![
        FindCriteria::new(vec![FindCriteriaField::new("sensor", "Timer")]),
        FindCriteria::new(vec![FindCriteriaField::new("sensor", "Manual")]),
        FindCriteria::omit(vec![FindCriteriaField::new("value", "0")]),
    ])
    .limit(20)
    .sort(SortCriteria::default().descend("created").ascend("sensor"))
    .scripts(ScriptParameters::script("LogFind", "readings"));

    println!("Payload: {}\n", request.to_payload());

    match client.perform_find("iot", "readings", &request).await {
        Ok(body) => println!("Found: {}", body),
        Err(e) if e.is_application() => println!("Data API rejected the find: {}", e),
        Err(e) => println!("Find failed: {}", e),
    }

    client.log_out().await?;
    Ok(())
}
