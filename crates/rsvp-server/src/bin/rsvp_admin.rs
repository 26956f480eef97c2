//! Operator tool: provision admin accounts and load the guest roster.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};

use rsvp_api::auth::{MIN_PASSWORD_LEN, hash_password};
use rsvp_api::config::parse_whitelist;
use rsvp_core::guests::import_guests;
use rsvp_core::roster::parse_guest_csv;
use rsvp_core::{AdminStore, StoreError};
use rsvp_db::Database;
use rsvp_types::models::{AdminRole, AdminUser};

#[derive(Debug, Parser)]
#[command(name = "rsvp-admin", about = "Provision admin users and guest rosters", version)]
struct Cli {
    /// SQLite database file. Falls back to `RSVP_DB_PATH`, then `rsvp.db`.
    #[arg(long, value_name = "path")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an admin user. The password is read from stdin.
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// `admin` or `viewer`.
        #[arg(long, default_value = "admin")]
        role: AdminRole,
    },
    /// Create one household per CSV row.
    ImportGuests {
        #[arg(long, value_name = "path")]
        file: PathBuf,
        /// Parse and report without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvp_core=info,rsvp_db=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .or_else(|| std::env::var("RSVP_DB_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("rsvp.db"));

    match cli.command {
        Command::CreateAdmin { email, name, role } => {
            let whitelist = parse_whitelist(&std::env::var("ADMIN_EMAIL_WHITELIST").unwrap_or_default());
            let password = read_password()?;
            let db = Database::open(&db_path)?;
            create_admin(&db, &whitelist, &email, &name, role, &password)?;
            println!("Created {} account for {}", role, email.trim().to_lowercase());
        }
        Command::ImportGuests { file, dry_run } => {
            let reader = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            let roster = parse_guest_csv(reader)?;

            if dry_run {
                for guest in &roster.guests {
                    println!(
                        "{} (party of {}, {} household members)",
                        guest.primary_guest,
                        guest.max_party_size,
                        guest.household_members.len()
                    );
                }
                println!("Dry run: {} to import, {} skipped", roster.guests.len(), roster.skipped);
                return Ok(());
            }

            let db = Database::open(&db_path)?;
            let skipped = roster.skipped;
            let summary = import_guests(&db, roster.guests, Utc::now())?;
            println!(
                "Imported {}, failed {}, skipped {}",
                summary.imported, summary.failed, skipped
            );
        }
    }

    Ok(())
}

/// First line of stdin, without the trailing newline.
fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn create_admin(
    store: &dyn AdminStore,
    whitelist: &[String],
    email: &str,
    name: &str,
    role: AdminRole,
    password: &str,
) -> Result<()> {
    let email = email.trim().to_lowercase();
    let name = name.trim();
    if email.is_empty() || name.is_empty() {
        bail!("email and name are required");
    }
    if !whitelist.contains(&email) {
        bail!("{} is not in ADMIN_EMAIL_WHITELIST", email);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    if store.get_admin(&email)?.is_some() {
        bail!("admin {} already exists", email);
    }

    let now = Utc::now();
    let admin = AdminUser {
        email: email.clone(),
        password_hash: hash_password(password)?,
        name: name.to_string(),
        role,
        created_at: now,
        updated_at: now,
        last_login: None,
    };
    match store.create_admin(&admin) {
        Ok(()) => Ok(()),
        Err(StoreError::Conflict(_)) => bail!("admin {} already exists", email),
        Err(e) => Err(e.into()),
    }
}
