use std::process::ExitCode;
use std::sync::Arc;

use aicook_client::{BackendClient, ClientConfig};
use aicook_core::session::Session;
use aicook_core::DishId;
use aicook_sync::{resync, AppContext, SyncError};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod render;

use args::{Cli, Commands, FeedCommand};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("AICOOK_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aicook=info,aicook_sync=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(sync) = e.downcast_ref::<SyncError>() {
                let message = sync.user_message();
                if !message.is_empty() {
                    eprintln!("{message}");
                }
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.api_url)?;
    tracing::debug!(api_url = %config.api_url, "Using backend");
    let backend = BackendClient::new(&config).context("Failed to build HTTP client")?;

    let session = match cli.token {
        Some(token) => Session::with_token(token),
        None => Session::new(),
    };
    let ctx = AppContext::new(Arc::new(backend)).with_session(Arc::new(session));

    match cli.command {
        Commands::Feed { feed } => show_feed(&ctx, &feed).await,
        Commands::Toggle { id } => {
            let is_favorite = ctx.toggle_favorite(id.as_str()).await?;
            let state = if is_favorite { "favorited" } else { "unfavorited" };
            println!("{} {} {state}", render::heart(is_favorite), DishId::from(id));
            Ok(())
        }
        Commands::Favorites => {
            let mut ids: Vec<DishId> = resync::refresh_favorites(&ctx)
                .await
                .context("Failed to fetch favorites")?
                .ok_or(SyncError::AuthenticationRequired)?
                .into_iter()
                .collect();
            ids.sort();
            for id in &ids {
                println!("{id}");
            }
            tracing::info!(count = ids.len(), "Listed favorites");
            Ok(())
        }
    }
}

/// Environment configuration, with `--api-url` taking precedence.
fn load_config(api_url: Option<String>) -> anyhow::Result<ClientConfig> {
    config_from(api_url, |key| std::env::var(key).ok())
}

/// `--api-url` stands in for `AICOOK_API_URL`, so both are validated the
/// same way and an unusable env URL is ignored when the flag is given.
fn config_from(
    api_url: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientConfig> {
    ClientConfig::from_lookup(|key| match (key, &api_url) {
        ("AICOOK_API_URL", Some(url)) => Some(url.clone()),
        _ => env(key),
    })
    .context("Invalid client configuration")
}

async fn show_feed(ctx: &AppContext, feed: &FeedCommand) -> anyhow::Result<()> {
    let mut screen = ctx.mount(feed.source());
    screen.load().await?;
    for _ in 1..feed.pages() {
        if screen.load_more().await? == 0 {
            break;
        }
    }

    if screen.dishes().is_empty() {
        println!("No dishes.");
    }
    for dish in screen.dishes() {
        println!("{}", render::dish_row(dish));
    }
    tracing::info!(feed = %screen.source(), count = screen.dishes().len(), "Listed feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flag_replaces_an_invalid_env_url() {
        let config = config_from(
            Some("https://api.example.com/".into()),
            env(&[
                ("AICOOK_API_URL", "not a url"),
                ("AICOOK_REQUEST_TIMEOUT_SECS", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn flag_must_be_an_http_url() {
        let err = config_from(Some("ftp://x".into()), env(&[])).unwrap_err();
        assert!(format!("{err:#}").contains("ftp://x"));
    }

    #[test]
    fn env_url_is_used_without_the_flag() {
        let config = config_from(None, env(&[("AICOOK_API_URL", "http://10.0.0.2:8000")])).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2:8000");

        assert!(config_from(None, env(&[("AICOOK_API_URL", "nope")])).is_err());
    }
}
