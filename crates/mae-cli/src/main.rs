use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::App;

#[derive(Parser)]
#[command(name = "mae")]
#[command(about = "Mae - private logbook client", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding MAE_BACKEND_URL and config.toml
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account (does not log in)
    Signup {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Show or save the backend URL
    Config {
        /// New backend URL to save in config.toml
        url: Option<String>,
    },
    /// List the categories and their fields
    Categories,
    /// List the entries of a category
    List { category: String },
    /// Add an entry
    Add {
        category: String,
        /// Field value, repeatable: --set date=2024-05-01
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = commands::entries::parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Edit an entry, starting from its current values
    Edit {
        category: String,
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = commands::entries::parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Delete an entry
    Delete {
        category: String,
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Roll the dice of a category
    Roll {
        #[arg(default_value = "de10")]
        category: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let app = App::new(cli.config, cli.backend_url)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, &email, password).await,
        Commands::Signup { email, password } => {
            commands::auth::signup(&app, &email, password).await
        }
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Whoami => commands::auth::whoami(&app).await,
        Commands::Config { url } => commands::config::run(&app, url.as_deref()),
        Commands::Categories => commands::entries::categories(),
        Commands::List { category } => commands::entries::list(&app, &category).await,
        Commands::Add { category, values } => commands::entries::add(&app, &category, values).await,
        Commands::Edit {
            category,
            id,
            values,
        } => commands::entries::edit(&app, &category, &id, values).await,
        Commands::Delete { category, id, yes } => {
            commands::entries::delete(&app, &category, &id, yes).await
        }
        Commands::Roll { category } => commands::entries::roll(&app, &category).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            commands::output::error(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_assignments() {
        let cli = Cli::try_parse_from([
            "mae",
            "add",
            "punitions",
            "--set",
            "date=2024-05-01",
            "--set",
            "description=Copier 100 lignes",
        ])
        .unwrap();

        match cli.command {
            Commands::Add { category, values } => {
                assert_eq!(category, "punitions");
                assert_eq!(
                    values,
                    vec![
                        ("date".to_string(), "2024-05-01".to_string()),
                        ("description".to_string(), "Copier 100 lignes".to_string()),
                    ]
                );
            }
            _ => panic!("Expected Add"),
        }
    }

    #[test]
    fn test_roll_defaults_to_de10() {
        let cli = Cli::try_parse_from(["mae", "roll", "--backend-url", "http://x"]).unwrap();
        assert_eq!(cli.backend_url.as_deref(), Some("http://x"));
        assert!(matches!(cli.command, Commands::Roll { category } if category == "de10"));
    }
}
