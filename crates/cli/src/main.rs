//! Broker portal CLI - database migrations and customer management.
//!
//! # Usage
//!
//! ```bash
//! # Run portal database migrations
//! portal-cli migrate
//!
//! # Create a customer (password read from PORTAL_NEW_CUSTOMER_PASSWORD)
//! portal-cli customer create -e jane@example.com -f Jane -l Doe -t Individual
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(author, version, about = "Broker portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Create a new customer
    Create {
        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Customer type (`Individual` or `Business`)
        #[arg(short = 't', long, default_value = "Individual")]
        customer_type: String,
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Customer { action } => match action {
            CustomerAction::Create {
                email,
                first_name,
                last_name,
                customer_type,
            } => {
                commands::customer::create(&email, &first_name, &last_name, &customer_type)
                    .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_customer_create() {
        let cli = Cli::try_parse_from([
            "portal-cli", "customer", "create", "-e", "a@b.com", "-f", "A", "-l", "B",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Customer {
                action: CustomerAction::Create { ref customer_type, .. }
            }) if customer_type == "Individual"
        ));
    }
}
