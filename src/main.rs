// Expense Ledger - CLI
// Runs one message through the configured ledger, same path as the webhook

use anyhow::{Context, Result};
use std::env;

use expense_ledger::{render, Config, Ledger};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        std::process::exit(2);
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    let ledger = Ledger::from_config(&config).context("Failed to open store")?;

    if args.len() == 1 && args[0] == "init" {
        run_init(&ledger, &config)?;
    } else {
        run_message(&ledger, &args.join(" "))?;
    }

    Ok(())
}

fn run_init(ledger: &Ledger, config: &Config) -> Result<()> {
    println!("🗄️  Initializing worksheet '{}'", config.worksheet);
    ledger
        .ensure_initialized()
        .context("Failed to initialize worksheet")?;
    println!("✓ Worksheet ready ({} aliases loaded)", config.aliases.len());
    Ok(())
}

fn run_message(ledger: &Ledger, text: &str) -> Result<()> {
    let sender = env::var("LEDGER_CLI_SENDER").unwrap_or_else(|_| "cli".to_string());

    let result = ledger.handle_message(text, &sender);
    println!("{}", render(&result));

    // Reply already printed; backend faults still fail the process
    match result {
        Err(e) if !e.is_user_error() => Err(e).context("Ledger request failed"),
        _ => Ok(()),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("   expense-ledger init");
    eprintln!("   expense-ledger gasto <monto> <categoria> [detalle]");
    eprintln!("   expense-ledger hoy | mes | resumen [persona]");
    eprintln!();
    eprintln!("   Store: LEDGER_STORE=memory: | csv:<dir> | sqlite:<path>");
}
