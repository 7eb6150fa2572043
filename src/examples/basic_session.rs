//! Basic Session Example
//!
//! Logs in, creates a record, finds it again and logs out.
//!
//! Run with: FM_HOST=fm.example.com FM_PASSWORD=secret cargo run --example basic_session

use fmdata_rs::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let host = std::env::var("FM_HOST").unwrap_or_else(|_| "localhost".to_string());
    let password = std::env::var("FM_PASSWORD").unwrap_or_default();

    let db_name = "iot";
    let layout = "readings";

    let credentials = DatabaseCredentials::user(db_name, "device", password)?;
    let mut client = Client::from_config(&ClientConfig::new(host), credentials, None)?;

    client.log_in().await?;
    println!("Logged in, token: {}\n", client.token());

    let fields = vec![
        RecordField::text("sensor", "Timer"),
        RecordField::number("value", 21.5),
    ];
    let created = client.create_record(db_name, layout, &fields, None).await?;
    println!("Created: {}\n", created);

    let request = FindRequest::new(vec![FindCriteria::new(vec![FindCriteriaField::new(
        "sensor", "Timer",
    )])]);
    let found = client.perform_find(db_name, layout, &request).await?;
    println!("Found: {}\n", found);

    client.log_out().await?;
    println!("Logged out");

    Ok(())
}
