//! # Command Line
//!
//! Argument parsing and output for the `caixa` binary. Input is parsed at
//! this boundary (decimal amounts into centavos, `YYYY-MM-DD` dates) and
//! handed to the commands.
//!
//! ```text
//! caixa [--config <file>] [--demo] [--json] <command>
//!
//!   open      --amount 200,00 [--date 2025-06-05] [--time 08:30] [--notes ...]
//!   move      --kind in|out --amount 150 --description "..." [--method pix]
//!   close     --amount 650 [--notes ...]
//!   status
//!   history   [--limit 10]
//!   estoque   move | alerts | history
//!   financas  summary | list | add | remove
//!   painel    [--date 2025-06-05]
//!   orcamento --item "Vidro temperado 8mm;2;250,00" [--item ...]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};
use vidracaria_core::finance::EntryFilter;
use vidracaria_core::quote::{quote_totals, QuoteLine};
use vidracaria_core::{
    EntryKind, Money, MovementKind, PaymentMethod, RecordId, StockReason,
};

use crate::commands::caixa::{CashRegisterLifecycle, MovementRequest};
use crate::commands::estoque::{self, StockMovementRequest};
use crate::commands::financas::{self, EntryRequest};
use crate::commands::painel;
use crate::error::CaixaResult;
use crate::state::{Clock, ConfigState, StoreState, SystemClock};

#[derive(Debug, Parser)]
#[command(name = "caixa", version, about = "Cash register, stock and ledger for the glass shop")]
pub struct Cli {
    /// Config file [default: <config dir>/caixa.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run against the demo data instead of the database
    #[arg(long, global = true)]
    pub demo: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the cash register
    Open {
        /// Opening cash, e.g. 200,00
        #[arg(long, allow_hyphen_values = true)]
        amount: Money,
        /// [default: today]
        #[arg(long)]
        date: Option<NaiveDate>,
        /// HH:MM [default: now]
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record money coming in or going out
    Move {
        /// in | out
        #[arg(long)]
        kind: MovementKind,
        #[arg(long, allow_hyphen_values = true)]
        amount: Money,
        #[arg(long)]
        description: String,
        /// cash | credit_card | debit_card | pix | bank_transfer | check | other
        #[arg(long, default_value = "cash")]
        method: PaymentMethod,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Close the register against the counted cash
    Close {
        /// Cash counted in the drawer
        #[arg(long, allow_hyphen_values = true)]
        amount: Money,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the open register, its movements and balance
    Status,

    /// List past closings, most recent first
    History {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Stock movements and alerts
    #[command(subcommand)]
    Estoque(EstoqueCommand),

    /// Ledger entries and reports
    #[command(subcommand)]
    Financas(FinancasCommand),

    /// Month totals, stock alerts, register balance and today's cash
    Painel {
        /// [default: today]
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Line and quote totals
    Orcamento {
        /// description;quantity;unit price, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<QuoteLine>,
    },
}

#[derive(Debug, Subcommand)]
pub enum EstoqueCommand {
    /// Register a stock entry or exit
    Move {
        #[arg(long)]
        code: String,
        /// in | out
        #[arg(long)]
        kind: MovementKind,
        #[arg(long, allow_hyphen_values = true)]
        quantity: i64,
        /// purchase | return | sale | loss | adjustment
        #[arg(long)]
        reason: StockReason,
        /// [default: today]
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Stock value and products at or below their minimum
    Alerts,

    /// Stock movements, most recent first
    History {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct EntryFilterArgs {
    /// income | expense
    #[arg(long)]
    pub kind: Option<EntryKind>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl From<EntryFilterArgs> for EntryFilter {
    fn from(args: EntryFilterArgs) -> Self {
        EntryFilter {
            kind: args.kind,
            category: args.category,
            from: args.from,
            to: args.to,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum FinancasCommand {
    /// Totals, monthly series and category breakdown
    Summary {
        /// Number of months in the series
        #[arg(long, default_value_t = 6)]
        months: u32,
        /// Last month of the series [default: today]
        #[arg(long)]
        reference: Option<NaiveDate>,
        #[command(flatten)]
        filter: EntryFilterArgs,
    },

    /// List entries, most recent first
    List {
        #[command(flatten)]
        filter: EntryFilterArgs,
    },

    /// Add an income or expense
    Add {
        /// income | expense
        #[arg(long)]
        kind: EntryKind,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: Money,
        /// [default: today]
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an entry
    Remove { id: RecordId },
}

// =============================================================================
// Execution
// =============================================================================

/// Loads configuration, opens the store and runs one command.
pub async fn execute(cli: Cli) -> CaixaResult<()> {
    let mut config = ConfigState::load(cli.config)?;
    if cli.demo {
        config.store.demo = true;
    }
    debug!(?config, "Configuration loaded");

    let store = Arc::new(StoreState::connect(&config).await?);
    let out = Output {
        json: cli.json,
        config: &config,
    };

    let result = dispatch(cli.command, store.clone(), &config, &out).await;
    store.close().await;
    result
}

async fn dispatch(
    command: Command,
    store: Arc<StoreState>,
    config: &ConfigState,
    out: &Output<'_>,
) -> CaixaResult<()> {
    let timeout = config.store_timeout();
    let mut caixa = CashRegisterLifecycle::new(store.clone(), SystemClock).with_timeout(timeout);

    match command {
        Command::Open {
            amount,
            date,
            time,
            notes,
        } => {
            caixa.load().await?;
            let date = date.unwrap_or_else(|| caixa.clock().today());
            let time = time.unwrap_or_else(|| caixa.clock().time_of_day());
            let register = caixa.open(date, &time, amount, notes.as_deref()).await?;
            out.emit(&register, || {
                format!(
                    "Cash register #{} opened on {} at {} with {}",
                    register.id,
                    register.date,
                    register.open_time,
                    out.money(register.opening_amount)
                )
            });
        }

        Command::Move {
            kind,
            amount,
            description,
            method,
            notes,
        } => {
            caixa.load().await?;
            let movement = caixa
                .register_movement(MovementRequest {
                    kind,
                    amount,
                    description,
                    payment_method: method,
                    notes,
                })
                .await?;
            let balance = caixa.current_balance();
            out.emit(&movement, || {
                format!(
                    "{} {} {} ({}) at {}\nBalance: {}",
                    movement.kind,
                    out.money(movement.amount),
                    movement.description,
                    movement.payment_method.label(),
                    movement.time,
                    out.money(balance)
                )
            });
        }

        Command::Close { amount, notes } => {
            caixa.load().await?;
            let summary = caixa.close(amount, notes.as_deref()).await?;
            let rec = &summary.reconciliation;
            out.emit(&summary, || {
                let verdict = if rec.is_balanced() {
                    "balanced"
                } else if rec.difference.is_negative() {
                    "shortfall"
                } else {
                    "surplus"
                };
                format!(
                    "Cash register #{} closed at {}\n\
                     Opening:    {}\n\
                     Entries:    {}\n\
                     Exits:      {}\n\
                     Expected:   {}\n\
                     Counted:    {}\n\
                     Difference: {} ({})",
                    summary.register.id,
                    summary.closing.close_time,
                    out.money(rec.opening_amount),
                    out.money(rec.total_in),
                    out.money(rec.total_out),
                    out.money(rec.system_amount),
                    out.money(rec.closing_amount),
                    out.money(rec.difference),
                    verdict
                )
            });
        }

        Command::Status => {
            caixa.load().await?;
            let overview = caixa.overview();
            out.emit(&overview, || {
                let Some(register) = &overview.register else {
                    return format!("{}: no cash register is open", config.business.name);
                };
                let mut text = format!(
                    "{}: cash register #{} open since {} {}\nOpening: {}\n",
                    config.business.name,
                    register.id,
                    register.date,
                    register.open_time,
                    out.money(register.opening_amount)
                );
                for m in &overview.movements {
                    text.push_str(&format!(
                        "  {}  {:<3} {:>14}  {:<16} {}\n",
                        m.time,
                        m.kind,
                        out.money(m.amount),
                        m.payment_method.label(),
                        m.description
                    ));
                }
                for t in &overview.totals.by_method {
                    text.push_str(&format!(
                        "  {:<16} in {}  out {}\n",
                        t.method.label(),
                        out.money(t.total_in),
                        out.money(t.total_out)
                    ));
                }
                text.push_str(&format!("Balance: {}", out.money(overview.balance)));
                text
            });
        }

        Command::History { limit } => {
            let history = caixa.closing_history(limit).await?;
            out.emit(&history, || {
                if history.is_empty() {
                    return "No closings recorded".to_string();
                }
                history
                    .iter()
                    .map(|h| {
                        format!(
                            "{}  {}-{}  expected {}  counted {}  difference {}",
                            h.date,
                            h.open_time,
                            h.close_time,
                            out.money(h.system_amount),
                            out.money(h.closing_amount),
                            out.money(h.difference)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }

        Command::Estoque(command) => estoque_command(command, &*store, &caixa, out, timeout).await?,

        Command::Financas(command) => {
            financas_command(command, &*store, caixa.clock(), out, timeout).await?
        }

        Command::Painel { date } => {
            caixa.load().await?;
            let today = date.unwrap_or_else(|| caixa.clock().today());
            let board = painel::dashboard(&*store, &caixa.overview(), today, timeout).await?;
            out.emit(&board, || {
                let register = match board.register_balance {
                    Some(balance) => out.money(balance),
                    None => "closed".to_string(),
                };
                format!(
                    "{} on {}\n\
                     Income (month):  {}\n\
                     Expense (month): {}\n\
                     Stock alerts:    {} of {} products\n\
                     Register:        {}\n\
                     Cash today:      {}",
                    config.business.name,
                    board.date,
                    out.money(board.month.income),
                    out.money(board.month.expense),
                    board.low_stock_count,
                    board.product_count,
                    register,
                    out.money(board.cash_today)
                )
            });
        }

        Command::Orcamento { items } => {
            let totals = quote_totals(&items)?;
            out.emit(&totals, || {
                let mut text = String::new();
                for line in &totals.lines {
                    text.push_str(&format!(
                        "  {:<30} {:>5} × {:>14} = {:>14}\n",
                        line.description,
                        line.quantity,
                        out.money(line.unit_price),
                        out.money(line.total)
                    ));
                }
                text.push_str(&format!("Total: {}", out.money(totals.total)));
                text
            });
        }
    }

    Ok(())
}

async fn estoque_command(
    command: EstoqueCommand,
    store: &StoreState,
    caixa: &CashRegisterLifecycle<StoreState>,
    out: &Output<'_>,
    timeout: std::time::Duration,
) -> CaixaResult<()> {
    match command {
        EstoqueCommand::Move {
            code,
            kind,
            quantity,
            reason,
            date,
            notes,
        } => {
            let request = StockMovementRequest {
                code,
                kind,
                quantity,
                reason,
                date: date.unwrap_or_else(|| caixa.clock().today()),
                notes,
            };
            let outcome = estoque::register_stock_movement(store, request, timeout).await?;
            out.emit(&outcome, || {
                let mut text = format!(
                    "{} {} {} {} ({})\nOn hand: {} {}",
                    outcome.movement.kind,
                    outcome.movement.quantity,
                    outcome.product.unit,
                    outcome.product.name,
                    outcome.movement.reason.as_str(),
                    outcome.product.quantity,
                    outcome.product.unit
                );
                if outcome.low_stock {
                    text.push_str(&format!(
                        "\nLow stock: minimum is {}",
                        outcome.product.minimum_quantity
                    ));
                }
                text
            });
        }

        EstoqueCommand::Alerts => {
            let report = estoque::stock_report(store, timeout).await?;
            out.emit(&report, || {
                let mut text = format!(
                    "{} products, stock value {}\n",
                    report.product_count,
                    out.money(report.total_value)
                );
                if report.low_stock.is_empty() {
                    text.push_str("No low stock alerts");
                }
                for p in &report.low_stock {
                    text.push_str(&format!(
                        "  {:<8} {:<30} {} / min {} {}\n",
                        p.code, p.name, p.quantity, p.minimum_quantity, p.unit
                    ));
                }
                text.trim_end().to_string()
            });
        }

        EstoqueCommand::History { code, limit } => {
            let history = estoque::stock_history(store, code.as_deref(), limit, timeout).await?;
            out.emit(&history, || {
                history
                    .iter()
                    .map(|m| {
                        format!(
                            "{}  {:<3} {:>5}  {:<30} {}",
                            m.date,
                            m.kind,
                            m.quantity,
                            m.product_name,
                            m.reason.as_str()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }
    }
    Ok(())
}

async fn financas_command<C: Clock>(
    command: FinancasCommand,
    store: &StoreState,
    clock: &C,
    out: &Output<'_>,
    timeout: std::time::Duration,
) -> CaixaResult<()> {
    match command {
        FinancasCommand::Summary {
            months,
            reference,
            filter,
        } => {
            let reference = reference.unwrap_or_else(|| clock.today());
            let report =
                financas::finance_report(store, &filter.into(), reference, months, timeout).await?;
            out.emit(&report, || {
                let mut text = format!(
                    "{} entries\nIncome:  {}\nExpense: {}\nBalance: {}\n",
                    report.entry_count,
                    out.money(report.summary.income),
                    out.money(report.summary.expense),
                    out.money(report.summary.balance)
                );
                for m in &report.months {
                    text.push_str(&format!(
                        "  {:<7} in {:>14}  out {:>14}  net {:>14}\n",
                        m.label(),
                        out.money(m.income),
                        out.money(m.expense),
                        out.money(m.balance)
                    ));
                }
                for c in &report.categories {
                    text.push_str(&format!("  {:<30} {}\n", c.category, out.money(c.amount)));
                }
                text.trim_end().to_string()
            });
        }

        FinancasCommand::List { filter } => {
            let entries = financas::list_entries(store, &filter.into(), timeout).await?;
            out.emit(&entries, || {
                entries
                    .iter()
                    .map(|e| {
                        format!(
                            "#{:<4} {}  {:<7} {:>14}  {:<24} {}",
                            e.id,
                            e.date,
                            e.kind,
                            out.money(e.amount),
                            e.category,
                            e.description
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
        }

        FinancasCommand::Add {
            kind,
            category,
            description,
            amount,
            date,
            notes,
        } => {
            let request = EntryRequest {
                date: date.unwrap_or_else(|| clock.today()),
                kind,
                category,
                description,
                amount,
                notes,
            };
            let entry = financas::add_entry(store, request, timeout).await?;
            out.emit(&entry, || {
                format!(
                    "Entry #{} added: {} {} ({})",
                    entry.id,
                    entry.kind,
                    out.money(entry.amount),
                    entry.category
                )
            });
        }

        FinancasCommand::Remove { id } => {
            financas::remove_entry(store, id, timeout).await?;
            out.emit(&serde_json::json!({ "removed": id }), || {
                format!("Entry #{} removed", id)
            });
        }
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

struct Output<'a> {
    json: bool,
    config: &'a ConfigState,
}

impl Output<'_> {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        if !self.json {
            println!("{}", text());
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Could not serialize result"),
        }
    }

    fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }
}
