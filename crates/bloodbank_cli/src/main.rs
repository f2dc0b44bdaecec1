//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `bloodbank_core` wiring against a
//!   real database file.
//! - Keep output deterministic for quick local sanity checks.

use bloodbank_core::{init_logging, open_db_with_config, BloodBankId, BloodBankSystem, EngineConfig};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process;

/// Blood bank inventory engine smoke tool
#[derive(Parser, Debug)]
#[command(name = "bloodbank")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file; overrides BLOODBANK_DB_PATH
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Print versions and row counts per entity kind
    Status,
    /// List blood banks with their on-hand quantity
    Inventory,
    /// Apply a signed quantity delta to one blood bank
    Adjust {
        blood_bank_id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            process::exit(2);
        }
    };
    if cli.db.is_some() {
        config.db_path = cli.db.clone();
    }

    if let Err(err) = init_logging(&config) {
        eprintln!("failed to initialize logging: {err}");
        process::exit(3);
    }

    if let Err(err) = run(&cli.command, &config) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(command: &Commands, config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_with_config(config)?;
    let system = BloodBankSystem::try_new(&conn)?;
    info!("event=cli_command module=cli status=start command={command:?}");

    match command {
        Commands::Status => {
            println!("bloodbank_core ping={}", bloodbank_core::ping());
            println!("bloodbank_core version={}", bloodbank_core::core_version());
            for (kind, count) in system.entity_counts()? {
                println!("{kind}={count}");
            }
        }
        Commands::Inventory => {
            for bank in system.blood_banks().list_all()? {
                println!(
                    "{} quantity={} groups={}",
                    bank.id,
                    bank.quantity,
                    bank.joined_blood_groups()
                );
            }
        }
        Commands::Adjust {
            blood_bank_id,
            delta,
        } => {
            let id: BloodBankId = blood_bank_id.parse()?;
            let adjustment = system.adjust_quantity(&id, *delta)?;
            println!(
                "{id} previous={} delta={} current={}",
                adjustment.previous, adjustment.delta, adjustment.current
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn parses_status() {
        let cli = Cli::parse_from(["bloodbank", "status"]);
        assert_eq!(cli.command, Commands::Status);
        assert!(cli.db.is_none());
    }

    #[test]
    fn parses_negative_adjust_delta() {
        let cli = Cli::parse_from(["bloodbank", "--db", "/tmp/bb.sqlite", "adjust", "BB1", "-15"]);
        assert_eq!(
            cli.command,
            Commands::Adjust {
                blood_bank_id: "BB1".to_string(),
                delta: -15,
            }
        );
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/bb.sqlite")));
    }

    #[test]
    fn rejects_non_numeric_delta() {
        assert!(Cli::try_parse_from(["bloodbank", "adjust", "BB1", "ten"]).is_err());
    }
}
