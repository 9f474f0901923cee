use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use invoice_desk_lib::printer::today;
use invoice_desk_lib::{
  layout, parse_orders, telemetry, AppConfig, InvoiceOutcome, InvoicePrinter, LayoutContext, Order,
  PrintOptions,
};
use time::macros::format_description;
use time::Date;

#[derive(Parser, Debug)]
#[command(name = "invoice-cli", about = "Generate, print or download order invoices")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch orders from the API and deliver one invoice covering all of them.
  Print {
    #[arg(required = true)]
    order_ids: Vec<i64>,

    /// Save the PDF instead of sending it to the printer.
    #[arg(long)]
    force_download: bool,
  },

  /// Deliver an invoice for orders stored in a local JSON file.
  Render {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    force_download: bool,
  },

  /// Print the layout instructions as JSON.
  Layout {
    #[arg(long)]
    input: PathBuf,

    /// Invoice date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,
  },
}

fn parse_date(value: &str) -> Result<Date, String> {
  Date::parse(value, format_description!("[year]-[month]-[day]"))
    .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn read_orders(path: &Path) -> anyhow::Result<Vec<Order>> {
  let json = std::fs::read_to_string(path)
    .with_context(|| format!("cannot read {}", path.display()))?;
  parse_orders(&json).with_context(|| format!("{} is not an order or a list of orders", path.display()))
}

fn report(outcome: &InvoiceOutcome) {
  match outcome {
    InvoiceOutcome::Saved { invoice_number, path } => {
      println!("{invoice_number}: saved to {}", path.display());
    }
    InvoiceOutcome::Printing { invoice_number, job } => {
      println!("{invoice_number}: sent to printer ({})", job.document_path.display());
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  telemetry::init();
  let cli = Cli::parse();
  let config = AppConfig::from_env().context("invalid configuration")?;

  match cli.command {
    Command::Print {
      order_ids,
      force_download,
    } => {
      let printer = InvoicePrinter::from_config(&config)?;
      let outcome = printer
        .print_invoices(&order_ids, PrintOptions { force_download })
        .await?;
      report(&outcome);
    }

    Command::Render {
      input,
      force_download,
    } => {
      let orders = read_orders(&input)?;
      let printer = InvoicePrinter::from_config(&config)?;
      let outcome = printer
        .print_invoice_with_data(&orders, PrintOptions { force_download })
        .await?;
      report(&outcome);
    }

    Command::Layout { input, date } => {
      let orders = read_orders(&input)?;
      let ctx = LayoutContext {
        company: &config.company,
        issued_on: date.unwrap_or_else(today),
      };
      let invoice_type = orders.first().map(Order::invoice_type).unwrap_or_default();
      let invoice = layout(&orders, invoice_type, &ctx)?;
      println!("{}", serde_json::to_string_pretty(&invoice)?);
    }
  }

  Ok(())
}
