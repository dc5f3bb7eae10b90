use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use pesa_core::{BudgetSettings, CategoryId, CategoryRule, Transaction};
use pesa_finance::{Ledger, Messenger, dispatch_detached, ingest, process_message_at};
use pesa_ingest::{MessageParser, ParseError};

mod config;
mod messenger;
mod state;

use state::JsonStore;

#[derive(Parser, Debug)]
#[command(name = "pesa", version, about = "M-PESA SMS ledger with budget alerts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write ~/.pesa/config.toml with defaults
    Init,

    /// Parse a message without storing it (dry run)
    Parse {
        /// Message text, or "-" to read stdin
        message: String,
    },

    /// Parse, categorize and store a message; alert if the balance is below budget
    Ingest {
        /// Message text, or "-" to read stdin
        message: String,
    },

    /// List stored transactions, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Export stored transactions
    Export {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Move a stored transaction to another category
    Recategorize { id: u64, category: u32 },

    /// Delete a stored transaction
    Delete { id: u64 },

    /// Category rule commands
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Category commands
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// Budget threshold commands
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Append a rule. Patterns use LIKE syntax: % any text, _ one character
    Add {
        #[arg(long)]
        counterparty: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: u32,
    },
    /// Show rules in evaluation order
    List,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    Add {
        name: String,
        #[arg(long, default_value = "#607d8b")]
        color: String,
    },
    List,
    Rename {
        id: u32,
        name: String,
    },
    /// Delete a category; its transactions move to Other
    Delete { id: u32 },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Set the balance threshold and alert recipient
    Set {
        #[arg(long)]
        threshold: Option<Decimal>,
        #[arg(long)]
        target: Option<String>,
        /// Turn alerts on
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Turn alerts off
        #[arg(long)]
        disable: bool,
        /// Remove the threshold
        #[arg(long, conflicts_with = "threshold")]
        clear: bool,
    },
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            config::init_config()?;
            let store = JsonStore::open_default()?;
            store.save()?;
            println!("Ledger: {}", store.path().display());
        }

        Command::Parse { message } => {
            let raw = read_message(&message)?;
            let cfg = config::load_config()?;
            let parser = MessageParser::new(cfg.timezone()?);
            let store = JsonStore::open_default()?;
            let ledger = store.ledger();

            let outcome = process_message_at(&parser, &raw, ledger.rules(), ledger.budget(), Utc::now())
                .map_err(unparseable_hint)?;
            let report = serde_json::json!({
                "transaction": outcome.transaction,
                "category": category_name(ledger, outcome.transaction.category),
                "notify": outcome.notify(),
                "notification": outcome.notification,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Ingest { message } => {
            let raw = read_message(&message)?;
            let cfg = config::load_config()?;
            let parser = MessageParser::new(cfg.timezone()?);
            debug!(timezone = %parser.timezone(), "ingesting message");
            let mut store = JsonStore::open_default()?;

            let ingested = match ingest(&mut store, &parser, &raw, Utc::now()) {
                Ok(i) => i,
                Err(e) => match e.downcast::<ParseError>() {
                    Ok(parse_err) => return Err(unparseable_hint(parse_err)),
                    Err(other) => return Err(other),
                },
            };

            let txn = &ingested.outcome.transaction;
            println!(
                "Stored #{}: {} Ksh{} | {} | balance Ksh{} | {}",
                ingested.id,
                txn.direction.as_str(),
                txn.amount,
                txn.counterparty,
                txn.balance,
                category_name(store.ledger(), txn.category),
            );
            if txn.timestamp_estimated() {
                println!("Note: message date did not parse; recorded at processing time");
            }

            if let Some(notification) = ingested.outcome.notification {
                println!("Balance below budget: alerting {}", notification.target);
                info!(
                    recipient = %notification.target,
                    webhook = cfg.notify.webhook_url.is_some(),
                    "dispatching low-balance alert"
                );
                let handle = dispatch_detached(build_messenger(&cfg)?, notification, cfg.notify_timeout());
                // The process would drop the task on exit; wait for its bounded run.
                if let Err(e) = handle.await {
                    warn!(error = %e, "alert task did not finish");
                }
            }
        }

        Command::List { limit } => {
            let store = JsonStore::open_default()?;
            let ledger = store.ledger();
            let txns = ledger.transactions();
            if txns.is_empty() {
                println!("No transactions yet. Run: pesa ingest \"<message>\"");
            }
            for stored in txns.iter().take(limit) {
                print_transaction(ledger, stored.id, &stored.transaction);
            }
        }

        Command::Export { csv } => {
            let store = JsonStore::open_default()?;
            let count = export_csv(store.ledger(), &csv)?;
            println!("Exported {} transactions to {}", count, csv.display());
        }

        Command::Recategorize { id, category } => {
            let mut store = JsonStore::open_default()?;
            store.ledger_mut().recategorize(id, CategoryId(category))?;
            store.save()?;
            println!("Transaction #{id} -> {}", category_name(store.ledger(), Some(CategoryId(category))));
        }

        Command::Delete { id } => {
            let mut store = JsonStore::open_default()?;
            if !store.ledger_mut().delete_transaction(id) {
                bail!("no transaction with id {id}");
            }
            store.save()?;
            println!("Deleted transaction #{id}");
        }

        Command::Rules { command } => match command {
            RulesCommand::Add {
                counterparty,
                description,
                category,
            } => {
                let mut store = JsonStore::open_default()?;
                store.ledger_mut().add_rule(CategoryRule {
                    counterparty_pattern: counterparty,
                    description_pattern: description,
                    category_id: CategoryId(category),
                })?;
                store.save()?;
                println!("Rule #{} added", store.ledger().rules().len());
            }
            RulesCommand::List => {
                let store = JsonStore::open_default()?;
                let ledger = store.ledger();
                for (i, rule) in ledger.rules().iter().enumerate() {
                    println!(
                        "{:>3}. counterparty={} description={} -> {}",
                        i + 1,
                        rule.counterparty_pattern.as_deref().unwrap_or("NULL"),
                        rule.description_pattern.as_deref().unwrap_or("NULL"),
                        category_name(ledger, Some(rule.category_id)),
                    );
                }
            }
        },

        Command::Categories { command } => match command {
            CategoriesCommand::Add { name, color } => {
                let mut store = JsonStore::open_default()?;
                let id = store.ledger_mut().add_category(&name, &color)?;
                store.save()?;
                println!("Category {id}: {name}");
            }
            CategoriesCommand::List => {
                let store = JsonStore::open_default()?;
                for c in store.ledger().categories() {
                    println!("{:>3}  {:<20} {}", c.id, c.name, c.color);
                }
            }
            CategoriesCommand::Rename { id, name } => {
                let mut store = JsonStore::open_default()?;
                store.ledger_mut().rename_category(CategoryId(id), &name)?;
                store.save()?;
                println!("Category {id}: {name}");
            }
            CategoriesCommand::Delete { id } => {
                let mut store = JsonStore::open_default()?;
                let removed = store.ledger_mut().delete_category(CategoryId(id))?;
                store.save()?;
                println!("Deleted {} (transactions moved to Other)", removed.name);
            }
        },

        Command::Budget { command } => match command {
            BudgetCommand::Set {
                threshold,
                target,
                enable,
                disable,
                clear,
            } => {
                let mut store = JsonStore::open_default()?;
                let mut budget = store.ledger().budget().clone();
                if let Some(t) = threshold {
                    if t.is_sign_negative() {
                        bail!("threshold must not be negative");
                    }
                    budget.threshold = Some(t);
                }
                if clear {
                    budget.threshold = None;
                }
                if let Some(t) = target {
                    budget.notify_target = t;
                }
                if enable {
                    budget.notifications_enabled = true;
                }
                if disable {
                    budget.notifications_enabled = false;
                }
                store.ledger_mut().set_budget(budget);
                store.save()?;
                print_budget(store.ledger().budget());
            }
            BudgetCommand::Show => {
                let store = JsonStore::open_default()?;
                print_budget(store.ledger().budget());
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pesa=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_message(arg: &str) -> Result<String> {
    let raw = if arg == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).context("read message from stdin")?;
        s
    } else {
        arg.to_string()
    };
    if raw.trim().is_empty() {
        bail!("empty message");
    }
    Ok(raw)
}

fn unparseable_hint(err: ParseError) -> anyhow::Error {
    if err.is_unparseable() {
        warn!(error = %err, "message matched no known shape");
        anyhow::anyhow!("could not parse the message, check format ({err})")
    } else {
        anyhow::Error::new(err)
    }
}

fn build_messenger(cfg: &config::Config) -> Result<Arc<dyn Messenger>> {
    Ok(match &cfg.notify.webhook_url {
        Some(url) => Arc::new(messenger::WebhookMessenger::new(url.clone())),
        None => Arc::new(messenger::OutboxMessenger::new(state::outbox_path()?)),
    })
}

fn category_name(ledger: &Ledger, id: Option<CategoryId>) -> String {
    id.and_then(|id| ledger.categories().iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "Other".to_string())
}

fn print_transaction(ledger: &Ledger, id: u64, txn: &Transaction) {
    println!(
        "#{:<4} {} {:<8} Ksh{:>12} | {:<32} | {:<40} | bal Ksh{} | {}",
        id,
        txn.timestamp.format("%Y-%m-%d %H:%M"),
        txn.direction.as_str(),
        txn.amount,
        txn.counterparty,
        txn.description,
        txn.balance,
        category_name(ledger, txn.category),
    );
}

fn print_budget(budget: &BudgetSettings) {
    match budget.threshold {
        Some(t) => println!("Threshold: Ksh{t}"),
        None => println!("Threshold: (none)"),
    }
    println!(
        "Alerts: {}",
        if budget.notifications_enabled { "on" } else { "off" }
    );
    println!(
        "Recipient: {}",
        if budget.notify_target.is_empty() { "(none)" } else { budget.notify_target.as_str() }
    );
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: u64,
    timestamp_utc: String,
    direction: &'static str,
    amount: Decimal,
    counterparty: &'a str,
    description: &'a str,
    balance: Decimal,
    category: String,
    code: Option<&'a str>,
}

fn export_csv(ledger: &Ledger, path: &std::path::Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    let txns = ledger.transactions();
    for stored in &txns {
        let txn = &stored.transaction;
        wtr.serialize(ExportRow {
            id: stored.id,
            timestamp_utc: txn.timestamp.to_rfc3339(),
            direction: txn.direction.as_str(),
            amount: txn.amount,
            counterparty: &txn.counterparty,
            description: &txn.description,
            balance: txn.balance,
            category: category_name(ledger, txn.category),
            code: txn.code.as_deref(),
        })?;
    }
    wtr.flush()?;
    Ok(txns.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_finance::LedgerStore;

    #[test]
    fn test_export_csv_writes_header_and_rows() {
        let mut ledger = Ledger::new();
        let outcome = process_message_at(
            &MessageParser::default(),
            "QAE4FG5HI6 Confirmed. You paid to JAVA HOUSE Ksh250.00 on 6/3/24 at 2:30 PM. New M-PESA balance is Ksh550.00.",
            &[],
            &BudgetSettings::default(),
            Utc::now(),
        )
        .unwrap();
        ledger.insert_transaction(outcome.transaction).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(export_csv(&ledger, &path).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,timestamp_utc,direction,amount,counterparty,description,balance,category,code"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,2024-03-06T11:30:00+00:00,paid,250.00,JAVA HOUSE,Paid,550.00,Other,QAE4FG5HI6"));
    }

    #[test]
    fn test_unparseable_hint_wording() {
        let err = unparseable_hint(ParseError::NoMatchingShape);
        assert!(err.to_string().starts_with("could not parse the message, check format"));
    }

    #[test]
    fn test_cli_parses_budget_set() {
        let cli = Cli::try_parse_from(["pesa", "budget", "set", "--threshold", "1000.00", "--enable"]).unwrap();
        match cli.command {
            Command::Budget {
                command: BudgetCommand::Set { threshold, enable, .. },
            } => {
                assert_eq!(threshold, Some(Decimal::new(100000, 2)));
                assert!(enable);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
