use clap::Parser;
use serde_json::json;
use sysbrain::providers::OllamaClient;
use sysbrain::{Cli, Config, pipeline};
use tokio::io::AsyncReadExt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    // Logs go to stderr: stdout carries exactly one JSON document.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let config = Config::from_cli(Cli::parse());

    let mut raw_input = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut raw_input).await {
        println!("{}", json!({ "error": format!("failed to read stdin: {e}") }));
        std::process::exit(1);
    }

    let client = OllamaClient::new(Some(&config.ollama_url), config.timeout_secs);
    let outcome = pipeline::run(&raw_input, &config, &client).await;

    println!("{}", outcome.document);
    std::process::exit(outcome.exit_code);
}
