use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use qnabot::config::{Config, parse_confidence_threshold};
use qnabot::consts::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TOP, ENV_LOG, MAX_TOP};
use qnabot::retriever::Retriever;
use qnabot::service::azure::AzureQaService;
use qnabot::session::{Session, SessionOptions, parse_question};
use qnabot::spinner;

#[derive(Parser)]
#[command(
    name = "qnabot",
    version,
    about = "Ask a hosted question answering knowledge base from the terminal."
)]
struct Cli {
    /// Minimum confidence score (0-1) an answer needs
    #[arg(
        short = 'c',
        long,
        default_value_t = DEFAULT_CONFIDENCE_THRESHOLD,
        value_parser = parse_confidence_threshold
    )]
    threshold: f64,

    /// Number of ranked candidates to request
    #[arg(long, default_value_t = DEFAULT_TOP, value_parser = clap::value_parser!(u32).range(1..=MAX_TOP as i64))]
    top: u32,

    /// Print service errors instead of the "no answer" fallback
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Request timeout in seconds (transport default when unset)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Dotenv file to read settings from (default: ./.env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Ask a single question and exit (non-interactive)
    #[arg(short, long, value_parser = parse_question)]
    question: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match Config::load(cli.env_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration Error: {e}");
            println!("\nPlease ensure you have:");
            println!("1. Created an Azure AI Language resource");
            println!("2. Enabled Question Answering feature");
            println!("3. Set the required environment variables in .env file");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let service = AzureQaService::new(
        &config.endpoint,
        &config.key,
        cli.timeout.map(Duration::from_secs),
    )?;
    let retriever = Retriever::new(Arc::new(service), &config).with_top(cli.top);

    let options = SessionOptions {
        confidence_threshold: cli.threshold,
        strict: cli.strict,
        spinner: io::stdout()
            .is_terminal()
            .then(spinner::stderr_output),
    };
    let mut session = Session::new(retriever, options);
    let mut stdout = io::stdout();

    // Single question mode
    if let Some(question) = cli.question {
        session.respond(&question, &mut stdout).await?;
        return Ok(());
    }

    // Ctrl+C ends the session, at the prompt or mid-question
    tokio::select! {
        result = session.run(BufReader::new(tokio::io::stdin()), &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => println!(),
    }

    Ok(())
}
