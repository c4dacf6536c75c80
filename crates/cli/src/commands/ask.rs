//! `productdesk ask`: Interactive or single-question mode.

use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_coordinator, load_config};

/// Words that end an interactive session.
const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", "goodbye"];

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.contains(&line.trim().to_lowercase().as_str())
}

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let coordinator = build_coordinator(&config)?;

    if let Some(question) = message {
        let answer = coordinator.process_query(&question).await;
        println!("{answer}");
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║     NVIDIA Sales Agent - Interactive Mode     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", coordinator.client().provider_name());
    println!("  Model:     {}", coordinator.client().model());
    println!("  Domains:   {}", coordinator.registry().len());
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or 'quit' to end the session.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        println!();
        let answer = coordinator.process_query(line).await;
        println!();
        for text in answer.lines() {
            println!("  Sales Agent > {text}");
        }
        println!();
    }

    println!();
    println!("  Thank you for using the NVIDIA Sales Agent. Goodbye!");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("  Goodbye "));
        assert!(is_exit("BYE"));
        assert!(!is_exit("exit strategy for GPUs?"));
    }
}
