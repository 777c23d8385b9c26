//! Command-line interface for the tbooke client.
//!
//! Provides commands for logging in and out, inspecting the session,
//! and browsing the learning-content feed with search and filters.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::{ApiError, HttpApi, TbookeApi};
use crate::catalog::{CatalogStatus, ContentCatalog};
use crate::session::{SessionStore, TokenStore};

/// tbooke - client for the Tbooke learning platform
#[derive(Parser, Debug)]
#[command(name = "tbooke")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist a session token
    Login {
        /// Account email
        #[arg(short, long, env = "TBOOKE_EMAIL")]
        email: Option<String>,

        /// Account password
        #[arg(short, long, env = "TBOOKE_PASSWORD")]
        password: Option<String>,
    },

    /// End the session and remove the persisted token
    Logout,

    /// Show the authenticated user's profile
    Profile,

    /// Browse the learning-content feed
    Learning {
        /// Search by title or creator name
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by category (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Filter by topic id (repeatable)
        #[arg(short, long)]
        topic: Vec<String>,

        /// Maximum number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show session status
    Status,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Login { email, password } => login(email, password).await,
            Commands::Logout => logout().await,
            Commands::Profile => show_profile().await,
            Commands::Learning {
                search,
                category,
                topic,
                limit,
            } => browse_learning(search, category, topic, limit).await,
            Commands::Status => show_status().await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the API client and a session store around it
fn build_session() -> Result<(Arc<HttpApi>, SessionStore)> {
    let api = Arc::new(HttpApi::from_config()?);
    let dyn_api: Arc<dyn TbookeApi> = api.clone();
    let tokens = TokenStore::open_default()?;
    Ok((api, SessionStore::new(dyn_api, tokens)))
}

/// Validate credentials before any network round trip
fn validate_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    let email = email.map(|e| e.trim().to_string()).unwrap_or_default();
    let password = password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Please enter both email and password".to_string(),
        ));
    }

    Ok((email, password))
}

/// Log in and persist the session token
async fn login(email: Option<String>, password: Option<String>) -> Result<()> {
    let (email, password) = match validate_credentials(email, password) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (api, session) = build_session()?;

    let token = match api.login(&email, &password).await {
        Ok(token) => token,
        Err(ApiError::Unauthorized) => {
            eprintln!("Login failed: incorrect email or password.");
            std::process::exit(1);
        }
        Err(ApiError::BadRequest(message)) => {
            eprintln!("Login failed: {}", message);
            std::process::exit(1);
        }
        Err(e @ (ApiError::Network | ApiError::Timeout)) => {
            eprintln!("{}. Please check your internet connection and try again.", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}. Please try again.", e);
            std::process::exit(1);
        }
    };

    session.save_token(&token).await;

    match session.profile() {
        Some(profile) => println!("Logged in as {}", profile.display_name()),
        None => {
            // Token is current even though the profile fetch failed
            if session.is_authenticated() {
                println!("Logged in (profile unavailable right now)");
            } else {
                eprintln!("Login failed: the server rejected the new session.");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// End the session
async fn logout() -> Result<()> {
    let (_api, session) = build_session()?;
    session.logout().await;
    println!("Logged out");
    Ok(())
}

/// Show the authenticated user's profile
async fn show_profile() -> Result<()> {
    let (_api, session) = build_session()?;
    session.initialize().await;

    if !session.is_authenticated() {
        eprintln!("Not logged in. Run `tbooke login` first.");
        std::process::exit(1);
    }

    let Some(profile) = session.profile() else {
        eprintln!(
            "Could not fetch profile: {}",
            session.error().unwrap_or_else(|| "unknown error".to_string())
        );
        std::process::exit(1);
    };

    println!("Name:          {}", profile.display_name());
    if let Some(username) = &profile.user.username {
        println!("Username:      {}", username);
    }
    if let Some(email) = &profile.user.email {
        println!("Email:         {}", email);
    }
    println!(
        "Account type:  {}",
        if profile.is_institution() {
            "Educational Institution"
        } else {
            "Educator/Student"
        }
    );
    println!(
        "Subscribed:    {}",
        if session.is_subscribed() { "yes" } else { "no" }
    );
    println!("Notifications: {}", session.notification_count());

    Ok(())
}

/// Browse the learning-content feed
async fn browse_learning(
    search: Option<String>,
    categories: Vec<String>,
    topics: Vec<String>,
    limit: usize,
) -> Result<()> {
    let (api, session) = build_session()?;
    session.initialize().await;

    if !session.is_authenticated() {
        eprintln!("Not logged in. Run `tbooke login` first.");
        std::process::exit(1);
    }

    let dyn_api: Arc<dyn TbookeApi> = api;
    let mut catalog = ContentCatalog::new(dyn_api);
    catalog.fetch_all(session.auth_token().as_deref()).await;

    if catalog.status() == CatalogStatus::Failed {
        eprintln!("Could not fetch contents. Please try again later.");
        std::process::exit(1);
    }

    if let Some(query) = search {
        catalog.search_now(query);
    }
    for category in &categories {
        catalog.toggle_category(category);
    }
    for topic in &topics {
        catalog.toggle_topic(topic);
    }

    let filtered = catalog.filtered();

    if filtered.is_empty() {
        println!("No contents found matching your criteria.");
        return Ok(());
    }

    println!(
        "{} of {} contents",
        filtered.len().min(limit),
        catalog.items().len()
    );
    println!("{}", "-".repeat(60));

    for item in filtered.iter().take(limit) {
        println!("{}", item.display_title());
        println!(
            "  by {} · {} · {} visits",
            item.author_name(),
            item.format_date(),
            item.visit_count()
        );

        let item_categories = item.categories();
        if !item_categories.is_empty() {
            println!("  Categories: {}", item_categories.join(", "));
        }

        let excerpt = item
            .excerpt(100)
            .unwrap_or_else(|| "No description available.".to_string());
        println!("  {}", excerpt);
        println!();
    }

    Ok(())
}

/// Show session status
async fn show_status() -> Result<()> {
    let (_api, session) = build_session()?;
    session.initialize().await;

    let state = session.snapshot();

    println!(
        "Session:       {}",
        if state.is_authenticated() {
            "logged in"
        } else {
            "logged out"
        }
    );
    if let Some(profile) = &state.profile {
        println!("User:          {}", profile.display_name());
        println!(
            "Subscribed:    {}",
            if state.is_subscribed { "yes" } else { "no" }
        );
        println!("Notifications: {}", state.notification_count);
    }
    if let Some(error) = &state.error {
        println!("Last error:    {}", error);
    }

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = crate::config::config()?;

    println!("API base:    {}", config.api_base);
    println!("Home:        {}", config.home.display());
    println!("Token file:  {}", config.token_path().display());
    println!("Timeout:     {}s", config.timeout_seconds);
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        assert!(validate_credentials(None, None).is_err());
        assert!(validate_credentials(Some("a@b.c".to_string()), None).is_err());
        assert!(validate_credentials(Some("  ".to_string()), Some("pw".to_string())).is_err());
    }

    #[test]
    fn test_credentials_email_trimmed() {
        let (email, password) =
            validate_credentials(Some(" a@b.c ".to_string()), Some("pw".to_string())).unwrap();
        assert_eq!(email, "a@b.c");
        assert_eq!(password, "pw");
    }
}
