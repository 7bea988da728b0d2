use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use futures::future::join_all;
use github_favorites::cli::{Cli, Command};
use github_favorites::config::Settings;
use github_favorites::confirm::{AutoConfirm, Confirm, StdinConfirm};
use github_favorites::github::GitHubClient;
use github_favorites::starred::StarredFeed;
use github_favorites::{AddOutcome, FavoritesStore, UserRecord};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Library logs stay quiet unless RUST_LOG asks for them
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;

    let client = GitHubClient::new(
        settings.api_url.clone(),
        settings.token.clone(),
        settings.timeout,
    )
    .context("Failed to build GitHub client")?;

    if let Command::Starred { login, pages } = &cli.command {
        return show_starred(client, login, *pages).await;
    }

    let storage = settings.file_store()?;
    let store = FavoritesStore::initialize(client, storage, settings.store_options()).await;

    match cli.command {
        Command::List => {
            let users = store.snapshot();
            if users.is_empty() {
                let hint = "No saved users. Add one with `github-favorites add <login>`.";
                println!("{}", hint.dimmed());
            }
            for user in &users {
                print_user(user);
            }
        }
        Command::Add { logins } => {
            let outcomes = join_all(logins.iter().map(|login| store.add(login))).await;
            for (login, outcome) in logins.iter().zip(outcomes) {
                match outcome {
                    AddOutcome::Added(user) => {
                        println!("{} {}", "✅ Added".green(), user.login.bold());
                    }
                    AddOutcome::AlreadyExists => {
                        println!("{} {}", "⚠️ Already saved:".yellow(), login);
                    }
                    AddOutcome::LookupFailed(reason) => {
                        println!("{} {} ({})", "❌ Could not add".red(), login, reason);
                    }
                }
            }
        }
        Command::Remove { target, by_name, yes } => {
            let confirmer: Box<dyn Confirm> = if yes {
                Box::new(AutoConfirm(true))
            } else {
                Box::new(StdinConfirm)
            };

            let removed = if by_name {
                store.confirm_and_remove_by_name(&target, confirmer.as_ref()).await
            } else {
                store.confirm_and_remove(&target, confirmer.as_ref()).await
            };

            match removed {
                Some(0) => println!("{} {}", "Nothing removed, not saved:".yellow(), target),
                Some(count) => println!("{} {} ({})", "🗑️ Removed".green(), target, count),
                None => println!("{}", "Nothing removed".dimmed()),
            }
        }
        Command::Show { login } => match store.find(&login) {
            Some(user) => print_user(&user),
            None => println!("{} {}", "Not saved:".yellow(), login),
        },
        Command::Starred { .. } => {}
    }

    if store.is_dirty() {
        eprintln!("{}", "Warning: favorites could not be saved to disk".red());
    }

    Ok(())
}

fn print_user(user: &UserRecord) {
    println!("{} {}", user.display_name().bold(), format!("@{}", user.login).cyan());
    println!("  {}", user.display_bio());
    println!("  {}", user.avatar_url.dimmed());
}

async fn show_starred(client: GitHubClient, login: &str, pages: u32) -> Result<()> {
    let mut feed = StarredFeed::new(client, login);
    feed.load_first()
        .await
        .with_context(|| format!("Failed to load starred repositories for {}", login))?;

    for _ in 1..pages {
        if feed.load_more().await? == 0 {
            break;
        }
    }

    println!("{} {}", "⭐ Starred by".bold().green(), login.bold());
    println!("{}", "=".repeat(50).dimmed());
    for repo in feed.items() {
        println!("{} - {}", repo.name.bold(), repo.owner.login);
        println!("  {}", repo.html_url.dimmed());
    }
    if feed.is_exhausted() {
        println!("{}", "(end of list)".dimmed());
    }

    Ok(())
}
