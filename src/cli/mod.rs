use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::{
    TransactionInput, UserId, end_of_day, format_cents, format_timestamp, start_of_day,
};
use crate::io::{ExportFormat, Exporter, write_csv, write_json};

/// Daybook - minimal personal ledger
#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Record credits and debits, query balances and history")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(long, env = "DAYBOOK_DB", default_value = "daybook.db", global = true)]
    pub database: String,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a transaction
    Add {
        /// Transaction type: credit or debit
        transaction_type: String,

        /// Amount as a non-negative decimal (e.g., "50.00" or "50")
        amount: String,

        /// Description of the transaction
        #[arg(short, long)]
        description: String,

        /// Owning user id
        #[arg(short, long, default_value = "1")]
        user: String,

        /// Date and time (YYYY-MM-DDTHH:MM[:SS], defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Show a user's balance at the end of a day
    Balance {
        /// User id
        #[arg(short, long, default_value = "1")]
        user: String,

        /// Day (YYYY-MM-DD); transactions up to 23:59:59 are included. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List a user's transactions between two days (inclusive)
    List {
        /// User id
        #[arg(short, long, default_value = "1")]
        user: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Export a user's transactions between two days to a file
    Export {
        /// User id
        #[arg(short, long, default_value = "1")]
        user: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Format: json, csv
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Verify ledger integrity
    Check,
}

impl Cli {
    /// Install the stderr log subscriber. `RUST_LOG` takes precedence over `--verbose`.
    pub fn init_logging(&self) {
        let default_directive = if self.verbose {
            "daybook=debug"
        } else {
            "daybook=warn"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        // A subscriber may already be installed when embedded; keep that one.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok();
    }

    pub async fn run(self) -> Result<()> {
        let service = if matches!(self.command, Commands::Init) {
            LedgerService::init(&self.database).await?
        } else {
            LedgerService::connect(&self.database)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open {}. Run `daybook init` first.",
                        self.database
                    )
                })?
        };

        match self.command {
            Commands::Init => {
                println!("Initialized ledger at {}", self.database);
            }
            Commands::Add {
                transaction_type,
                amount,
                description,
                user,
                at,
            } => {
                let datetime =
                    at.unwrap_or_else(|| format_timestamp(&Local::now().naive_local()));
                let input = TransactionInput {
                    transaction_type: Some(transaction_type),
                    amount: Some(amount),
                    description: Some(description),
                    user_id: Some(user),
                    datetime: Some(datetime),
                };
                let transaction = service.record_input(&input).await?;
                println!("Transaction added with ID {}.", transaction.id);
            }
            Commands::Balance { user, date } => {
                let user_id = UserId::parse(&user)?;
                let day = match date {
                    Some(d) => parse_day(&d)?,
                    None => Local::now().date_naive(),
                };
                let balance = service.balance_as_of(user_id, end_of_day(day)).await?;
                println!("Balance: {}", format_cents(balance));
            }
            Commands::List {
                user,
                start,
                end,
                format,
            } => {
                let user_id = UserId::parse(&user)?;
                let (start, end) = parse_day_range(&start, &end)?;
                let transactions = service.list_in_range(user_id, start, end).await?;

                let stdout = std::io::stdout();
                match format.to_lowercase().as_str() {
                    "table" => print_table(&transactions),
                    "json" => {
                        write_json(&transactions, stdout.lock())?;
                    }
                    "csv" => {
                        write_csv(&transactions, stdout.lock())?;
                    }
                    other => anyhow::bail!("Unknown format: {}. Use table, json or csv.", other),
                }
            }
            Commands::Export {
                user,
                start,
                end,
                format,
                output,
            } => {
                let user_id = UserId::parse(&user)?;
                let (start, end) = parse_day_range(&start, &end)?;
                let format = ExportFormat::from_str(&format)
                    .ok_or_else(|| anyhow::anyhow!("Unknown format: {}. Use json or csv.", format))?;

                let exporter = Exporter::new(&service);
                let count = match output {
                    Some(path) => {
                        let file = std::fs::File::create(&path)
                            .with_context(|| format!("Failed to create {}", path))?;
                        exporter
                            .export_range(user_id, start, end, format, file)
                            .await?
                    }
                    None => {
                        exporter
                            .export_range(user_id, start, end, format, std::io::stdout().lock())
                            .await?
                    }
                };
                eprintln!("Exported {} transactions", count);
            }
            Commands::Check => run_check_command(&service).await?,
        }

        service.store().close().await;
        Ok(())
    }
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Transactions: {}", report.transaction_count);
    println!("Users:        {}", report.user_count);
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

fn print_table(transactions: &[crate::domain::Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<6} {:<20} {:<7} {:>12} DESCRIPTION",
        "ID", "DATETIME", "TYPE", "AMOUNT"
    );
    println!("{}", "-".repeat(70));
    for t in transactions {
        println!(
            "{:<6} {:<20} {:<7} {:>12} {}",
            t.id,
            format_timestamp(&t.datetime),
            t.transaction_type.as_str(),
            format_cents(t.amount_cents),
            truncate(&t.description, 30)
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a calendar day in YYYY-MM-DD form.
fn parse_day(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", date_str))
}

/// Widen two days into the timestamps `start 00:00:00` and `end 23:59:59`.
fn parse_day_range(
    start: &str,
    end: &str,
) -> Result<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
    Ok((start_of_day(parse_day(start)?), end_of_day(parse_day(end)?)))
}
