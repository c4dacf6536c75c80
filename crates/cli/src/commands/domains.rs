//! `productdesk domains`: List the product domains.

use productdesk_agent::CATALOG;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Product domains ({}):", CATALOG.len());
    println!();
    for entry in CATALOG {
        println!("  • {}", entry.domain);
        println!("      {}", entry.description);
    }
    Ok(())
}
