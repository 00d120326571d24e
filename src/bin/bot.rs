use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use socialnet::client::config::DEFAULT_CONFIG;
use socialnet::client::{Bot, BotConfig};
use socialnet::core::logging::init_tracing;

#[derive(Parser)]
#[command(name = "bot")]
#[command(about = "Demonstrates functionality of the system.", long_about = None)]
struct Args {
    /// Config file name
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    filename: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("socialnet=info,bot=info");
    let args = Args::parse();

    let config = Arc::new(BotConfig::load(&args.filename)?);
    let mut bot = Bot::new(config)?;
    bot.run().await?;

    let today = chrono::Utc::now().date_naive();
    let analytics = bot.likes_analytics(0, Some(today), None).await?;

    // Analytics for the first generated user go to stdout for jq piping
    println!("{}", serde_json::to_string(&analytics)?);
    Ok(())
}
