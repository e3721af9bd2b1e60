//! Terminal front end for the PMO assessment trainer.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use services::{AppServices, Clock};
use trainer_core::model::{ResourceKind, Role, UserId, UserUpdate};

mod commands;

#[derive(Parser)]
#[command(name = "pmo-trainer", version, about = "PMO interview practice and learning hub")]
struct Cli {
    /// SQLite database URL or file path
    #[arg(
        long = "db",
        global = true,
        env = "TRAINER_DB_URL",
        default_value = "sqlite:trainer.sqlite3"
    )]
    db_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default categories, learning resources and admin account
    Seed {
        /// Overwrite existing data
        #[arg(long)]
        force: bool,
    },

    /// Take the assessment interactively
    Assess,

    /// Browse the Learning Hub
    Hub {
        /// Show the shelves of one category
        #[arg(long)]
        category: Option<String>,

        /// Restrict to one resource kind (e.g. videos, eBooks, externalSites)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,

        /// Only show resources whose title or description contains this text
        #[arg(long, requires = "category")]
        search: Option<String>,
    },

    /// Manage categories (admin)
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Manage learning resources (admin)
    #[command(subcommand)]
    Resources(ResourceCommand),

    /// Manage user accounts (admin)
    #[command(subcommand)]
    Users(UserCommand),

    /// Show or change the welcome message and channel URL (admin)
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Log in
    Login {
        username: String,
        #[arg(long, env = "TRAINER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out
    Logout,
}

#[derive(Subcommand)]
enum CategoryCommand {
    List,
    Add { name: String },
    Remove { name: String },
}

#[derive(Subcommand)]
enum ResourceCommand {
    Add {
        #[arg(long)]
        category: String,
        #[arg(long, value_parser = parse_kind)]
        kind: ResourceKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        link: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Extra fields such as duration=10m or author=Jane
        #[arg(long = "detail", value_parser = parse_detail)]
        details: Vec<(String, String)>,
    },
    Remove {
        #[arg(long)]
        category: String,
        #[arg(long, value_parser = parse_kind)]
        kind: ResourceKind,
        /// 1-based position on the shelf
        #[arg(long)]
        position: usize,
    },
    /// Replace every shelf with the bundled resources, keeping categories
    Reset,
}

#[derive(Subcommand)]
enum UserCommand {
    List,
    Add {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        admin: bool,
    },
    Update {
        id: UserId,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, conflicts_with = "user")]
        admin: bool,
        #[arg(long)]
        user: bool,
    },
    Remove { id: UserId },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        welcome_message: Option<String>,
        #[arg(long)]
        channel_url: Option<String>,
    },
}

fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_key(raw).ok_or_else(|| {
        let known: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.key()).collect();
        format!("unknown resource kind '{raw}' (expected one of {})", known.join(", "))
    })
}

fn parse_detail(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        process::exit(2);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_dir(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, Clock::default())
        .await
        .with_context(|| format!("failed to open {db_url}"))?;

    match cli.command {
        Commands::Seed { force } => commands::session::seed(&services, force).await,
        Commands::Assess => commands::assess::execute(&services).await,
        Commands::Hub {
            category,
            kind,
            search,
        } => {
            commands::hub::execute(&services, category.as_deref(), kind, search.as_deref()).await
        }
        Commands::Categories(cmd) => match cmd {
            CategoryCommand::List => commands::admin::list_categories(&services).await,
            CategoryCommand::Add { name } => commands::admin::add_category(&services, &name).await,
            CategoryCommand::Remove { name } => {
                commands::admin::remove_category(&services, &name).await
            }
        },
        Commands::Resources(cmd) => match cmd {
            ResourceCommand::Add {
                category,
                kind,
                title,
                link,
                description,
                details,
            } => {
                commands::admin::add_resource(
                    &services,
                    &category,
                    kind,
                    commands::admin::resource_draft(title, link, description, details),
                )
                .await
            }
            ResourceCommand::Remove {
                category,
                kind,
                position,
            } => {
                let Some(index) = position.checked_sub(1) else {
                    bail!("positions start at 1");
                };
                commands::admin::remove_resource(&services, &category, kind, index).await
            }
            ResourceCommand::Reset => commands::admin::reset_resources(&services).await,
        },
        Commands::Users(cmd) => match cmd {
            UserCommand::List => commands::admin::list_users(&services).await,
            UserCommand::Add {
                username,
                email,
                password,
                admin,
            } => commands::admin::add_user(&services, username, email, password, admin).await,
            UserCommand::Update {
                id,
                username,
                email,
                password,
                admin,
                user,
            } => {
                let role = match (admin, user) {
                    (true, _) => Some(Role::Admin),
                    (_, true) => Some(Role::User),
                    _ => None,
                };
                let update = UserUpdate {
                    username,
                    email,
                    password,
                    role,
                };
                commands::admin::update_user(&services, id, update).await
            }
            UserCommand::Remove { id } => commands::admin::remove_user(&services, id).await,
        },
        Commands::Settings(cmd) => match cmd {
            SettingsCommand::Show => commands::admin::show_settings(&services).await,
            SettingsCommand::Set {
                welcome_message,
                channel_url,
            } => commands::admin::save_settings(&services, welcome_message, channel_url).await,
        },
        Commands::Login { username, password } => {
            commands::session::login(&services, &username, &password).await
        }
        Commands::Logout => commands::session::logout(&services).await,
    }
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the directory holding the database file.
fn prepare_sqlite_dir(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database URL: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database URL: {db_url}");
    }

    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn memory_and_absolute_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/trainer.db"),
            "sqlite:///tmp/trainer.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/trainer.db"), "sqlite:///tmp/trainer.db");
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:trainer.sqlite3");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("trainer.sqlite3"));
    }

    #[test]
    fn kinds_and_details_parse() {
        assert_eq!(parse_kind("externalSites"), Ok(ResourceKind::ExternalSites));
        assert!(parse_kind("podcasts").is_err());
        assert_eq!(
            parse_detail("duration = 10m"),
            Ok(("duration".to_owned(), "10m".to_owned()))
        );
        assert!(parse_detail("novalue").is_err());
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "pmo-trainer",
            "--db",
            "sqlite::memory:",
            "resources",
            "remove",
            "--category",
            "Governance",
            "--kind",
            "videos",
            "--position",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.db_url, "sqlite::memory:");
        assert!(matches!(
            cli.command,
            Commands::Resources(ResourceCommand::Remove { position: 2, .. })
        ));
    }

    #[test]
    fn hub_search_needs_a_category() {
        let cli = Cli::try_parse_from([
            "pmo-trainer",
            "hub",
            "--category",
            "Governance",
            "--search",
            "risk",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Hub { search: Some(ref term), .. } if term == "risk"
        ));

        assert!(Cli::try_parse_from(["pmo-trainer", "hub", "--search", "risk"]).is_err());
    }

    #[test]
    fn users_update_takes_partial_fields() {
        let cli = Cli::try_parse_from([
            "pmo-trainer",
            "users",
            "update",
            "3",
            "--email",
            "casey@example.com",
            "--admin",
        ])
        .unwrap();
        let Commands::Users(UserCommand::Update {
            id,
            username,
            email,
            admin,
            user,
            ..
        }) = cli.command
        else {
            panic!("expected users update");
        };
        assert_eq!(id, UserId::new(3));
        assert_eq!(username, None);
        assert_eq!(email.as_deref(), Some("casey@example.com"));
        assert!(admin && !user);

        assert!(
            Cli::try_parse_from(["pmo-trainer", "users", "update", "3", "--admin", "--user"])
                .is_err()
        );
    }

    #[test]
    fn resources_reset_parses() {
        let cli = Cli::try_parse_from(["pmo-trainer", "resources", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Resources(ResourceCommand::Reset)));
    }
}
