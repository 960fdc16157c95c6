//! Filesystem delta tracker: report files added or removed under a root
//! directory since the previous run.

use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use sysbrain::delta::DeltaScanner;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Track file additions and removals under a directory between runs.
#[derive(Parser, Debug)]
#[command(name = "delta-tracker")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Directory to scan (default: current directory)
    pub root: Option<PathBuf>,
}

fn header(title: &str) {
    println!("\n{title}\n{}", "=".repeat(title.len()));
}

fn section(title: &str, items: &BTreeSet<String>) {
    header(title);
    if items.is_empty() {
        println!("(none)");
    } else {
        for item in items {
            println!("{item}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let scanner = DeltaScanner::new(&root);
    let report = scanner.run()?;

    section("ADDED FILES", &report.added);
    section("REMOVED FILES", &report.removed);

    header("SCAN SUMMARY");
    println!("Root Path : {}", root.display());
    println!("Added     : {} file(s)", report.added.len());
    println!("Removed   : {} file(s)", report.removed.len());
    println!("Seen      : {} file(s)", report.seen.len());
    println!("Baseline saved at : {}", scanner.baseline_path().display());
    println!("Changes logged at : {}", scanner.change_log_path().display());

    Ok(())
}
