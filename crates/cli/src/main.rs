//! `materials` — command-line front end for the materials inventory.
//!
//! Configure the backend through the environment (`MATERIALS_API_URL`,
//! `MATERIALS_API_KEY`, optionally `MATERIALS_DATABASE_URL`), then run:
//!
//! ```bash
//! materials --email ana@example.com stock --below-min
//! materials exit "Luva" 4 --to "Ana"
//! ```
//!
//! See `materials --help` for all available commands and options.

mod app;
mod commands;
mod render;

use clap::{Args, Parser, Subcommand};

use materials_auth::Role;
use materials_core::{CollaboratorId, InviteId, ItemId, UserId};

#[derive(Parser)]
#[command(name = "materials", about = "Materials inventory control", version)]
struct Cli {
    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct Credentials {
    /// Account email
    #[arg(long, global = true, env = "MATERIALS_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "MATERIALS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Current stock levels
    Stock {
        /// Free-text filter over category, name, SKU, unit and balance
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        include_inactive: bool,
        /// Only items below their minimum
        #[arg(long)]
        below_min: bool,
    },
    /// Record a stock entry (ADMIN)
    Entry {
        /// Item id or unique search text
        item: String,
        quantity: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Record a stock exit to a collaborator (ADMIN, LEAD)
    Exit {
        /// Item id or unique search text
        item: String,
        quantity: String,
        /// Receiving collaborator id or unique search text
        #[arg(long = "to")]
        receiver: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Movement history, newest first
    History {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Quantity received per collaborator
    Ranking,
    /// Dashboard over the trailing window
    Dashboard {
        /// Keep running and refresh on every change
        #[arg(long)]
        watch: bool,
    },
    /// Manage the item catalog
    #[command(subcommand)]
    Items(ItemCommand),
    /// Manage collaborators
    #[command(subcommand)]
    Collaborators(CollaboratorCommand),
    /// Manage users, roles and invites (ADMIN)
    #[command(subcommand)]
    Users(UserCommand),
    /// Create an account
    Signup {
        email: String,
        /// Full name stored on the profile
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ItemCommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create an item, or update it when --id is given
    Save {
        #[arg(long)]
        id: Option<ItemId>,
        #[arg(long)]
        category: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long, default_value = "UNIDADE")]
        unit: String,
        #[arg(long, default_value_t = 0)]
        min_stock: i64,
        #[arg(long)]
        inactive: bool,
    },
    /// Delete an item (deactivated instead when it has history)
    Delete { id: ItemId },
}

#[derive(Subcommand)]
pub enum CollaboratorCommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a collaborator, or update it when --id is given
    Save {
        #[arg(long)]
        id: Option<CollaboratorId>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a collaborator (deactivated instead when it has history)
    Delete { id: CollaboratorId },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Profiles and pending invites
    List,
    Invite {
        email: String,
        #[arg(long, default_value = "VIEWER")]
        role: Role,
    },
    Uninvite { id: InviteId },
    SetRole { user_id: UserId, role: Role },
}

#[tokio::main]
async fn main() {
    materials_observability::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = materials_infra::MaterialsConfig::from_env()?;

    if let Commands::Signup { email, name } = &cli.command {
        return commands::signup::run(&config, email, cli.credentials.password.as_deref(), name.as_deref()).await;
    }

    let app = app::App::connect(config, &cli.credentials).await?;
    let result = match cli.command {
        Commands::Stock {
            search,
            category,
            include_inactive,
            below_min,
        } => commands::stock::run(&app, search, category, include_inactive, below_min).await,
        Commands::Entry { item, quantity, note } => {
            commands::movements::entry(&app, &item, &quantity, note).await
        }
        Commands::Exit {
            item,
            quantity,
            receiver,
            note,
        } => commands::movements::exit(&app, &item, &quantity, receiver.as_deref(), note).await,
        Commands::History { limit } => commands::reports::history(&app, limit).await,
        Commands::Ranking => commands::reports::ranking(&app).await,
        Commands::Dashboard { watch } => commands::dashboard::run(&app, watch).await,
        Commands::Items(cmd) => commands::catalog::items(&app, cmd).await,
        Commands::Collaborators(cmd) => commands::catalog::collaborators(&app, cmd).await,
        Commands::Users(cmd) => commands::users::run(&app, cmd).await,
        Commands::Signup { .. } => Ok(()),
    };
    app.close().await;
    result
}
