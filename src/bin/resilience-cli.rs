use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "resilience-cli")]
#[command(about = "Inspect and exercise the resilient client service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show breaker state and active configuration
    Health,
    /// Issue guarded calls through the passthrough endpoint
    Call {
        /// Number of calls to issue
        #[arg(short, long, default_value_t = 1)]
        count: u32,

        /// Pause between calls in milliseconds
        #[arg(short, long, default_value_t = 0)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Call { count, interval_ms } => {
            for i in 0..count {
                if i > 0 && interval_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
                let res = client.get(format!("{}/call", cli.url)).send().await?;
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = match res.json().await {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: service returned status {} with unreadable body: {}", status, e);
            return Ok(());
        }
    };
    println!("{} {}", status.as_u16(), serde_json::to_string_pretty(&json)?);
    Ok(())
}
