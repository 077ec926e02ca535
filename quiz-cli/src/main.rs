//! Quiz Chain CLI
//!
//! Solve a chain of web quizzes from the terminal, or serve the start endpoint.

mod server;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use quiz_core::{ChainOutcome, ChainRequest, HopResult};
use quiz_net::FetchConfig;
use quiz_runtime::{solve_quiz_chain, ChainConfig};

use server::ServerConfig;

#[derive(Parser)]
#[command(name = "quiz-chain")]
#[command(author, version, about = "Quiz Chain: heuristic solver for chained web quizzes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a quiz chain starting at a URL
    Run {
        /// Caller identity sent with every submission (or set QUIZ_EMAIL)
        #[arg(short, long, env = "QUIZ_EMAIL")]
        email: String,

        /// Shared secret sent with every submission (or set QUIZ_SECRET)
        #[arg(short, long, env = "QUIZ_SECRET")]
        secret: String,

        /// First quiz URL
        #[arg(short, long)]
        url: String,

        /// Output file for the outcome (default: outcome_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        limits: Limits,
    },

    /// Serve POST /solve_quiz and GET /health
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Secret callers must present (or set QUIZ_SECRET)
        #[arg(short, long, env = "QUIZ_SECRET")]
        secret: String,

        #[command(flatten)]
        limits: Limits,
    },
}

#[derive(Args)]
struct Limits {
    /// Chain time budget in seconds (or set QUIZ_BUDGET_SECS)
    #[arg(long, default_value_t = quiz_core::DEFAULT_BUDGET_SECS, env = "QUIZ_BUDGET_SECS")]
    budget: u64,

    /// Longest honored pause between hops, in seconds
    #[arg(long, default_value_t = quiz_core::MAX_DELAY_SECS)]
    max_delay: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = quiz_core::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Fixed User-Agent header (default: a random browser agent)
    #[arg(long, env = "QUIZ_USER_AGENT")]
    user_agent: Option<String>,
}

impl Limits {
    fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default().with_timeout(self.timeout);
        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent),
            None => config,
        }
    }

    fn chain_config(&self) -> ChainConfig {
        ChainConfig::default()
            .with_budget(Duration::from_secs(self.budget))
            .with_max_delay(Duration::from_secs(self.max_delay))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            email,
            secret,
            url,
            output,
            limits,
        } => run_chain(ChainRequest::new(&email, &secret, &url), output, &limits).await,
        Commands::Serve {
            host,
            port,
            secret,
            limits,
        } => {
            server::serve(ServerConfig {
                host,
                port,
                secret,
                fetch: limits.fetch_config(),
                chain: limits.chain_config(),
            })
            .await
        }
    }
}

async fn run_chain(request: ChainRequest, output: Option<PathBuf>, limits: &Limits) -> Result<()> {
    println!("🧩 Quiz Chain\n");
    println!("🔗 Start: {}", request.start_url);
    println!("⏱️  Budget: {}s (max pause {}s)\n", limits.budget, limits.max_delay);

    let outcome = solve_quiz_chain(request, &limits.fetch_config(), limits.chain_config()).await;
    print_outcome(&outcome);

    let output_path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("outcome_{}.json", timestamp))
    });
    fs::write(&output_path, serde_json::to_string_pretty(&outcome)?)?;
    println!("\n📄 Outcome saved to: {}", output_path.display());

    Ok(())
}

fn print_outcome(outcome: &ChainOutcome) {
    for (i, hop) in outcome.hops.iter().enumerate() {
        match hop {
            HopResult::Solved {
                quiz_url,
                category,
                answer,
                server_response,
                ..
            } => {
                let verdict = match server_response.get("correct").and_then(|c| c.as_bool()) {
                    Some(true) => "✅",
                    Some(false) => "❌",
                    None => "❔",
                };
                println!("{} {}. [{}] {} -> {:?}", verdict, i + 1, category, quiz_url, answer);
            }
            HopResult::Failed { quiz_url, error } => {
                println!("⚠️  {}. {} failed: {}", i + 1, quiz_url, error);
            }
        }
    }

    println!(
        "\n🏁 {} hop(s) in {:.2}s, {} failed ({:?})",
        outcome.total_hops,
        outcome.elapsed_secs,
        outcome.failed_hops(),
        outcome.status
    );
    if let Some(message) = &outcome.message {
        println!("   {}", message);
    }
}
