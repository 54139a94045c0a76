use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use blumen::commands::{add, check, drill, reset};
use blumen::config;
use blumen::crud::DB;
use blumen::hint::RevealPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "blumen",
    version,
    about = "Flower name flashcards for the terminal.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drill flower cards until they are learned
    Drill {
        /// Seed the card and hint randomness for a reproducible session
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Add a new flower card with an image
    Add,
    /// Show deck progress and answer statistics
    Check {
        /// Print a plain summary instead of the TUI dashboard
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
    /// Wipe all learning progress (cards and images are kept)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Manage settings
    Config {
        /// Hint reveal policy: 'leftmost' or 'random'
        #[arg(long, value_name = "POLICY", conflicts_with = "show")]
        reveal: Option<String>,
        /// Answer log retention: a number of entries, or 'all'
        #[arg(long, value_name = "N|all", conflicts_with = "show")]
        log_keep: Option<String>,
        /// Print the current settings
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Drill { seed } => {
            let db = DB::new().await?;
            let config = config::load()?;
            drill::run(&db, &config, seed).await?;
        }
        Command::Add => {
            let db = DB::new().await?;
            add::run(&db).await?;
        }
        Command::Check { plain } => {
            let db = DB::new().await?;
            let _ = check::run(&db, plain).await?;
        }
        Command::Reset { yes } => {
            let db = DB::new().await?;
            reset::run(&db, yes).await?;
        }
        Command::Config {
            reveal,
            log_keep,
            show,
        } => handle_config_command(reveal, log_keep, show)?,
    }

    Ok(())
}

fn handle_config_command(
    reveal: Option<String>,
    log_keep: Option<String>,
    show: bool,
) -> Result<()> {
    let mut settings = config::load()?;
    let mut action_taken = false;

    if let Some(policy) = reveal {
        settings.reveal_policy = parse_reveal_policy(&policy)?;
        config::save(&settings)?;
        println!("Hint reveal policy set to '{}'.", policy.to_lowercase());
        action_taken = true;
    }

    if let Some(keep) = log_keep {
        settings.log_retention = parse_log_retention(&keep)?;
        config::save(&settings)?;
        match settings.log_retention {
            Some(n) => println!("Answer log now keeps the newest {n} entries."),
            None => println!("Answer log is now unbounded."),
        }
        action_taken = true;
    }

    if show {
        let policy = match settings.reveal_policy {
            RevealPolicy::Leftmost => "leftmost",
            RevealPolicy::Random => "random",
        };
        println!("Hint reveal policy: {policy}");
        match settings.log_retention {
            Some(n) => println!("Answer log retention: newest {n} entries"),
            None => println!("Answer log retention: unbounded"),
        }
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --reveal, --log-keep, or --show.");
    }
    Ok(())
}

fn parse_reveal_policy(value: &str) -> Result<RevealPolicy> {
    match value.to_lowercase().as_str() {
        "leftmost" => Ok(RevealPolicy::Leftmost),
        "random" => Ok(RevealPolicy::Random),
        other => bail!("Unknown reveal policy '{other}'. Use 'leftmost' or 'random'."),
    }
}

fn parse_log_retention(value: &str) -> Result<Option<u32>> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => bail!("Log retention must be a positive number or 'all', got '{value}'."),
    }
}
