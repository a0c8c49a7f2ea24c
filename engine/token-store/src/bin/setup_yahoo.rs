//! Authorize the app against Yahoo and store the first token pair

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use token_store::{TokenService, TokenStoreConfig, YahooOAuthClient};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = TokenStoreConfig::from_env()?;
    let oauth = YahooOAuthClient::new(&config.oauth)?;

    println!("\nOpen this URL in a browser and authorize the app:\n");
    println!("  {}\n", oauth.authorization_url());
    println!("You will be redirected to {}?code=XXXXXX", config.oauth.redirect_url);
    print!("Paste the code here: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().lock().read_line(&mut code).context("Failed to read authorization code")?;
    let code = code.trim();
    if code.is_empty() {
        anyhow::bail!("No code provided");
    }

    info!("Exchanging authorization code for tokens");
    let tokens = oauth.exchange_code(code).await.context("Token exchange failed")?;

    let service = TokenService::from_config(&config).await?;
    service.set_tokens(tokens).await?;

    info!("Authorization successful, tokens stored");
    Ok(())
}
