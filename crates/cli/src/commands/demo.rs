//! `productdesk demo`: Run the predefined demo questions.

use productdesk_agent::DEMO_QUERIES;

use super::{build_coordinator, load_config};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let coordinator = build_coordinator(&config)?;

    println!("NVIDIA Sales Agent - Demo Mode");
    println!("{}", "-".repeat(50));

    for (i, query) in DEMO_QUERIES.iter().enumerate() {
        println!();
        println!("Demo Query {}: {query}", i + 1);
        println!();
        let answer = coordinator.process_query(query).await;
        println!();
        println!("NVIDIA Sales Agent:");
        println!("{answer}");

        if i + 1 < DEMO_QUERIES.len() {
            println!();
            println!("{}", "-".repeat(50));
        }
    }

    println!();
    println!("Demo completed! Thank you for using the NVIDIA Sales Agent.");

    Ok(())
}
