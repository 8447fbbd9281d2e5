use clap::{Parser, Subcommand};
use ferrous_policy_domain::config::CliOverrides;
use ferrous_policy_domain::ListFormat;
use ferrous_policy_infrastructure::filter::{ListParser, PolicyEngine};
use tracing::info;

mod bootstrap;

#[derive(Parser)]
#[command(name = "ferrous-policy")]
#[command(version)]
#[command(about = "Ferrous Policy - DNS domain filtering decision core")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Start with filtering disabled
    #[arg(long)]
    disabled: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate domain names against the configured policy
    Check {
        #[arg(required = true)]
        domains: Vec<String>,

        /// Print one JSON object per result
        #[arg(long)]
        json: bool,
    },

    /// Parse a blocklist (URL or file) and report how many entries it yields
    Parse {
        location: String,

        /// domains, hosts, adblock or auto
        #[arg(short, long, default_value = "auto")]
        format: ListFormat,
    },

    /// Load every configured source and print stats as JSON
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        enabled: cli.disabled.then_some(false),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;

    bootstrap::init_logging(&config.logging);
    info!("Starting Ferrous Policy v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Check { domains, json } => {
            let engine = PolicyEngine::new(config.policy)?;
            engine.loaded().await;

            for domain in &domains {
                let result = engine.evaluate(domain);
                if json {
                    println!("{}", serde_json::to_string(&result)?);
                } else {
                    println!("{:<48} {:<6} {}", domain, result.action, result.list_name);
                }
            }
            engine.close().await;
        }
        Command::Parse { location, format } => {
            let parser = ListParser::with_timeout(config.policy.fetch_timeout())?;
            let trie = parser.parse_source(&location, format).await?;
            println!("{} domains", trie.len());
        }
        Command::Stats => {
            let engine = PolicyEngine::new(config.policy)?;
            engine.loaded().await;

            let report = serde_json::json!({
                "stats": engine.stats(),
                "sources": engine.sources(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            engine.close().await;
        }
    }

    Ok(())
}
