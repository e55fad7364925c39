//! Lumiere CLI - operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first super admin (password from LUMIERE_ADMIN_PASSWORD or stdin)
//! lumiere-cli admin create -e owner@lumiere.shop -r super_admin
//!
//! # Inspect and adjust admin accounts
//! lumiere-cli admin list
//! lumiere-cli admin set-role -e staff@lumiere.shop -r manager
//! lumiere-cli admin deactivate -e staff@lumiere.shop
//!
//! # Load products from YAML (validate only with --dry-run)
//! lumiere-cli seed products catalog.yaml
//!
//! # Create the storefront session table
//! lumiere-cli migrate sessions
//! ```
//!
//! All commands read `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lumiere_core::AdminRole;

mod commands;

#[derive(Parser)]
#[command(name = "lumiere-cli")]
#[command(author, version, about = "Lumiere operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Create tables owned by third-party crates
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account
    Create {
        #[arg(short, long)]
        email: String,

        /// `staff`, `manager`, or `super_admin`
        #[arg(short, long, default_value = "staff")]
        role: AdminRole,
    },
    /// List admin accounts
    List,
    /// Change an admin's role
    SetRole {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        role: AdminRole,
    },
    /// Re-enable a deactivated admin
    Activate {
        #[arg(short, long)]
        email: String,
    },
    /// Block an admin from signing in; live sessions stop resolving
    Deactivate {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        file: PathBuf,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the tower-sessions table used by the storefront
    Sessions,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumiere_cli=info,lumiere_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create { email, role } => {
                let password = commands::admin::read_password()?;
                commands::admin::create(&email, &password, role).await?;
            }
            AdminAction::List => commands::admin::list().await?,
            AdminAction::SetRole { email, role } => {
                commands::admin::set_role(&email, role).await?;
            }
            AdminAction::Activate { email } => commands::admin::set_active(&email, true).await?,
            AdminAction::Deactivate { email } => {
                commands::admin::set_active(&email, false).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
    }
    Ok(())
}
