//! caretab - command-line shell around the hospital-management session core.
//!
//! Stands in for the browser shell: it initializes the session from the
//! persisted token, runs one action, and prints where the shell would
//! navigate. Usage:
//!
//!   caretab login [email]    authenticate and remember the email
//!   caretab whoami           show the current identity
//!   caretab home             show the role-appropriate entry route
//!   caretab logout           end the session everywhere

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use caretab_core::{
    home_route, ApiClient, AuthBus, Config, Session, SessionState, TokenCell, TokenStore,
};

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() -> ExitCode {
    eprintln!("usage: caretab <login [email] | whoami | home | logout>");
    ExitCode::from(2)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        return usage();
    };

    match run(command, args.get(2).map(String::as_str)).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &str, arg: Option<&str>) -> Result<ExitCode> {
    let mut config = Config::load().context("Failed to load configuration")?;
    let base_url = std::env::var("CARETAB_API_URL")
        .unwrap_or_else(|_| config.api_base_url().to_string());

    let token = TokenCell::new();
    let client = ApiClient::new(base_url, token.clone())?;
    let store = TokenStore::new(Config::token_dir()?);
    let bus = AuthBus::new();
    let session = Session::new(Arc::new(client), store, &bus, token);

    session.initialize().await;

    match command {
        "login" => {
            let email = match arg {
                Some(email) => email.to_string(),
                None => match config.last_email.clone() {
                    Some(email) => email,
                    None => prompt_email()?,
                },
            };
            let password = rpassword::prompt_password(format!("Password for {email}: "))
                .context("Failed to read password")?;

            if let Err(e) = session.login(&email, &password).await {
                eprintln!("Login failed: {e}");
                return Ok(ExitCode::FAILURE);
            }

            config.last_email = Some(email);
            if let Err(e) = config.save() {
                tracing::warn!(error = %e, "could not save configuration");
            }

            match session.state() {
                SessionState::Authenticated(user) => {
                    info!(user_id = user.id, "login complete");
                    println!("Logged in as {} ({})", user.full_name, user.role);
                    println!("Home route: {}", home_route(Some(user.role)).path());
                    Ok(ExitCode::SUCCESS)
                }
                // Token exchange worked but the identity fetch failed;
                // the session already failed closed.
                _ => {
                    eprintln!("Login did not complete; please try again");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        "whoami" => {
            match session.current_user() {
                Some(user) => {
                    println!("{} <{}>", user.full_name, user.email);
                    println!("Role: {}", user.role);
                    if let Some(hospital_id) = user.hospital_id {
                        println!("Hospital: {hospital_id}");
                    }
                }
                None => println!("Not logged in"),
            }
            Ok(ExitCode::SUCCESS)
        }
        "home" => {
            println!("{}", home_route(session.role()).path());
            Ok(ExitCode::SUCCESS)
        }
        "logout" => {
            session.logout();
            println!("Logged out");
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(usage()),
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin()
        .read_line(&mut email)
        .context("Failed to read email")?;
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("No email given");
    }
    Ok(email.to_string())
}
