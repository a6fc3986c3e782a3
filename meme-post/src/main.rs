//! meme-post - run one scheduled posting pass over all configured accounts

use clap::Parser;
use std::path::PathBuf;

use libmemecast::logging::{LogFormat, LoggingConfig};
use libmemecast::platforms::reddit::{RedditCredentials, RedditPlatform};
use libmemecast::platforms::Platform;
use libmemecast::{AccountJob, Config, Result, Runner};

#[derive(Parser, Debug)]
#[command(name = "meme-post")]
#[command(about = "Post scheduled content to Reddit accounts", long_about = None)]
struct Cli {
    /// Config file path (defaults to $MEMECAST_CONFIG or the XDG location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force debug mode: no submissions, no file deletion, no delays
    #[arg(short, long)]
    debug: bool,

    /// Log output format (text, json, pretty)
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format: LogFormat = match cli.log_format.parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(3);
        }
    };
    LoggingConfig::new(format, "info".to_string(), cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if cli.debug {
        config.settings.debug_mode = true;
    }

    let mut jobs = Vec::with_capacity(config.accounts.len());
    for account in &config.accounts {
        let mut platform = RedditPlatform::new(RedditCredentials {
            username: account.username.clone(),
            client_id: account.client_id.clone(),
            client_secret: account.client_secret.clone(),
            password: account.password.clone(),
        })?;
        // Dry runs never touch the network, so skip the token exchange too.
        if !config.settings.debug_mode {
            platform.authenticate().await?;
        }
        jobs.push(AccountJob {
            account: account.clone(),
            platform: Box::new(platform),
        });
    }

    let mut runner = Runner::new(config.settings.clone());
    let ledger = runner.run(&jobs).await;
    print!("{}", ledger);

    Ok(())
}
