//! trial-scout - CLI entry point.
//!
//! With arguments, answers the given question once. Without arguments,
//! runs the demo questions and then an interactive prompt.

use std::io::{self, BufRead, Write};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trial_scout::{agent::Agent, config::Config};

const DEMO_QUESTIONS: &[&str] = &[
    "How many trials are currently recruiting for diabetes?",
    "What are typical eligibility criteria for Ulcerative Colitis trials?",
    "Which clinical sites in Spain have been used for depression trials?",
    "Show me Phase 3 Asthma trials",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trial_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.default_model);

    let agent = Agent::new(config);

    // One-shot mode: the question is passed on the command line.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let question = args.join(" ");
        ask(&agent, &question).await;
        return Ok(());
    }

    // Demo questions, then interactive mode.
    for (i, question) in DEMO_QUESTIONS.iter().enumerate() {
        println!("\n{}", "=".repeat(80));
        println!("QUESTION {}: {}", i + 1, question);
        println!("{}", "=".repeat(80));
        ask(&agent, question).await;
    }

    println!("\n{}", "=".repeat(80));
    println!("INTERACTIVE MODE (quit/exit/q to leave)");
    println!("{}", "=".repeat(80));

    let stdin = io::stdin();
    loop {
        print!("\nYour question: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        ask(&agent, question).await;
    }

    Ok(())
}

/// Answer one question, printing the result or the error.
async fn ask(agent: &Agent, question: &str) {
    match agent.answer(question, None).await {
        Ok(answer) => println!("\nANSWER:\n{}", answer),
        Err(e) => eprintln!("Error: {:#}", e),
    }
}
