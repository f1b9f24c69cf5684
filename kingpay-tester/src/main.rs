use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use kingpay_tester::client::overview::fetch_wallet_overview;
use kingpay_tester::client::{AuthProvider, SupabaseClient};
use kingpay_tester::runner::modules::{parse_module_filter, PRIORITY, SEQUENCE};
use kingpay_tester::utils::config::Config;
use kingpay_tester::{report, runner};

#[derive(Parser)]
#[command(name = "kingpay-tester")]
#[command(version = "0.1.0")]
#[command(about = "Sequential endpoint coverage runner for the KingPay backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the endpoint coverage suite
    Run {
        /// Only run these modules from the main list (priority modules always run).
        /// Can be specified multiple times.
        #[arg(short, long)]
        module: Vec<String>,

        /// Pause between modules in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Per-call timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,

        /// Directory for test-results.json and junit.xml
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List modules in execution order
    Modules,

    /// Sign in and show the wallet overview
    Overview,

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            module,
            delay_ms,
            timeout_secs,
            report,
        } => {
            let mut config = Config::load()?;
            if let Some(ms) = delay_ms {
                config.module_delay_ms = ms;
            }
            if let Some(secs) = timeout_secs {
                config.call_timeout = Duration::from_secs(secs);
            }

            let only = parse_module_filter(&module)?;

            match runner::run_tests(&config, only, report.as_deref()).await {
                Ok(run) => {
                    if run.interrupted {
                        println!("{} Run was interrupted.", "⚠".yellow());
                    }
                }
                Err(e) => {
                    eprintln!("\n{} {}", "✗ Run aborted:".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Modules => {
            println!("{}", "Priority (always run):".bold());
            for m in PRIORITY {
                println!("  {:<20} {}", m.slug().cyan(), m.title());
            }
            println!("{}", "Main list:".bold());
            for m in SEQUENCE {
                println!("  {:<20} {}", m.slug().cyan(), m.title());
            }
        }

        Commands::Overview => {
            let config = Config::load()?;
            let (Some(email), Some(password)) = (&config.email, &config.password) else {
                anyhow::bail!("TEST_REAL_EMAIL and TEST_REAL_PASSWORD must be set");
            };
            let client =
                SupabaseClient::new(&config.backend_url, &config.anon_key, config.call_timeout)?;
            let session = client.sign_in_with_password(email, password).await?;

            let overview = fetch_wallet_overview(&client, &session).await;
            println!(
                "{} {} of 3 reads resolved",
                "▶".green().bold(),
                overview.resolved()
            );
            match &overview.wallet {
                Ok(wallet) => println!("  Wallet: {}", wallet.to_string().cyan()),
                Err(e) => println!("  Wallet: {}", e.to_string().red()),
            }
            match &overview.financial {
                Ok(financial) => println!("  Financial: {}", financial.to_string().cyan()),
                Err(e) => println!("  Financial: {}", e.to_string().red()),
            }
            match &overview.extract {
                Ok(entries) => println!("  Extract: {} entries", entries.len().to_string().cyan()),
                Err(e) => println!("  Extract: {}", e.to_string().red()),
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
