/// plex-cli - Plex.tv account management from the terminal
use clap::Parser;
use plex_account::{Account, ReqwestClient};
use plex_cli::{run, Cli, CliConfig};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr keeps stdout clean for JSON output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plex_cli=info,plex_account=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    let client = ReqwestClient::new(config.client)?;
    debug!(base_url = %client.base_url(), "Using Plex.tv endpoint");

    let mut account = match cli.token.or(config.token) {
        Some(token) => Account::with_token(&client, token),
        None => Account::new(&client),
    };

    let output = run(cli.command, &mut account).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
