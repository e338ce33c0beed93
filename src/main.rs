use clap::Parser;
use claim_intake::cli::{self, Cli, Command};
use claim_intake::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Serve => cli::serve::run(config).await,
        Command::Extract(args) => cli::extract::run(config, args).await,
    }
}
