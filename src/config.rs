use clap::{Parser, ValueEnum};
use directories::UserDirs;
use serde::Serialize;
use std::path::PathBuf;

// ── Defaults ──────────────────────────────────────────────────────

pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 200_000;
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

// ── CLI surface ───────────────────────────────────────────────────

/// `sysbrain` - deterministic LLM reasoning pipeline over a local Ollama endpoint.
#[derive(Parser, Debug)]
#[command(name = "sysbrain")]
#[command(version = "0.1.0")]
#[command(about = "Reads a query on stdin, asks a local model, prints one validated JSON document.", long_about = None)]
pub struct Cli {
    /// Model to ask the Ollama endpoint for
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Reasoning mode (plan adds step-by-step recommendations)
    #[arg(long, value_enum, default_value_t = Mode::Advise)]
    pub mode: Mode,

    /// Append a record of this interaction to the SQLite memory log
    #[arg(long)]
    pub memory: bool,

    /// Inference timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Ollama base URL
    #[arg(long, default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Directory holding the memory database (default: ~/.sysbrain/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Reasoning mode requested of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Advise,
    Plan,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Advise => "advise",
            Mode::Plan => "plan",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resolved configuration ────────────────────────────────────────

/// Immutable configuration value built once at process start and passed
/// down through every component call. Core logic never reads arguments,
/// the environment, or any other ambient source.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub mode: Mode,
    pub memory: bool,
    pub timeout_secs: u64,
    pub max_input_chars: usize,
    pub ollama_url: String,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
        Self {
            model: cli.model,
            mode: cli.mode,
            memory: cli.memory,
            timeout_secs: cli.timeout,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            ollama_url: cli.ollama_url,
            db_path: data_dir.join("memory.sqlite"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".sysbrain").join("data"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sysbrain").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_resolve() {
        let config = Config::from_cli(cli(&[]));
        assert_eq!(config.model, "mistral");
        assert_eq!(config.mode, Mode::Advise);
        assert!(!config.memory);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_input_chars, 200_000);
        assert_eq!(config.ollama_url, "http://127.0.0.1:11434");
        assert!(config.db_path.ends_with("memory.sqlite"));
    }

    #[test]
    fn plan_mode_parses() {
        let config = Config::from_cli(cli(&["--mode", "plan", "--memory"]));
        assert_eq!(config.mode, Mode::Plan);
        assert!(config.memory);
    }

    #[test]
    fn data_dir_override_wins() {
        let config = Config::from_cli(cli(&["--data-dir", "/tmp/brain"]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/brain/memory.sqlite"));
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Advise).unwrap(), "\"advise\"");
        assert_eq!(Mode::Plan.as_str(), "plan");
    }

    #[test]
    fn rejects_unknown_mode() {
        let parsed =
            Cli::try_parse_from(["sysbrain", "--mode", "dream"]);
        assert!(parsed.is_err());
    }
}
