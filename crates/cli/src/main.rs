//! Hridved CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hv-cli migrate
//!
//! # Ensure admin@example.com exists as an admin
//! hv-cli admin create-default --password "a-better-password"
//!
//! # Grant admin rights to an existing account
//! hv-cli admin promote someone@example.com
//!
//! # List accounts
//! hv-cli users list
//!
//! # Fill derived blog fields on old rows
//! hv-cli blogs backfill
//!
//! # Seed blog posts from YAML
//! hv-cli seed blogs --file crates/cli/seed/blogs.yaml --clear
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hv-cli")]
#[command(author, version, about = "Hridved API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Blog maintenance
    Blogs {
        #[command(subcommand)]
        action: BlogsAction,
    },
    /// Seed the database from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Ensure the default admin account exists
    CreateDefault {
        /// Password for a newly created account
        #[arg(short, long, default_value = commands::admin::DEFAULT_PASSWORD)]
        password: String,
    },
    /// Make an existing user an admin
    Promote {
        /// Email of the account to promote
        email: String,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Print every account with its admin flag
    List,
}

#[derive(Subcommand)]
enum BlogsAction {
    /// Fill missing slugs, descriptions and meta fields
    Backfill,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert published blog posts from a YAML file
    Blogs {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,

        /// Delete every existing post first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::CreateDefault { password } => {
                commands::admin::create_default(&password).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list().await?,
        },
        Commands::Blogs { action } => match action {
            BlogsAction::Backfill => commands::blogs::backfill().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Blogs { file, clear } => commands::seed::blogs(&file, clear).await?,
        },
    }
    Ok(())
}
