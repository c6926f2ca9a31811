//! taxsvc CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments** — global switches and one subcommand per adapter
//!    operation.
//! 2. **Wire observability** — install a `tracing-subscriber` with a JSON (or
//!    pretty) layer on stderr.
//! 3. **Construct infrastructure** — load [`avatax::AvaTaxConfig`] from the
//!    environment and hand an AvaTax-backed [`taxsvc::TaxSvc`] the runtime
//!    switches.
//! 4. **Report** — print the result payload on stdout and exit with 0 for a
//!    success result, 2 for an error-shaped result, 1 for a raised error.

mod telemetry;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use taxsvc::{
    Address, CreateTransactionModel, LineItem, TaxResult, TaxSvc, TaxSvcConfig, TransactionRequest,
};

use crate::telemetry::LogFormat;

/// Exit code for an error-shaped result.
const EXIT_ERROR_RESULT: u8 = 2;

/// Talk to the AvaTax tax service from the command line.
///
/// Credentials are read from AVATAX_ACCOUNT_ID and AVATAX_LICENSE_KEY.
#[derive(Debug, Parser)]
#[command(name = "taxsvc", version, about)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Return failures as errors instead of error-shaped results.
    #[arg(long, env = "TAXSVC_RAISE_EXCEPTIONS", global = true)]
    raise_exceptions: bool,

    /// Log request and response bodies at debug level.
    #[arg(long, env = "TAXSVC_LOG_PAYLOADS", global = true)]
    log_payloads: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that AvaTax is reachable and accepts the credentials.
    Ping,
    /// Compute tax for a transaction read from a JSON file.
    GetTax {
        /// Path to the request JSON, or `-` for stdin.
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Compute tax for a single-line transaction described by flags.
    Quote(QuoteArgs),
    /// Void a committed transaction.
    Cancel {
        /// Code of the transaction to void.
        #[arg(long)]
        code: String,
    },
    /// Resolve and validate an address.
    ValidateAddress(AddressArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Line amount (extended price).
    #[arg(long)]
    amount: f64,

    /// Product tax code.
    #[arg(long, default_value = "P0000000")]
    tax_code: String,

    #[arg(long, default_value = "1")]
    quantity: u32,

    #[arg(long, default_value = "anonymous")]
    customer_code: String,

    /// Transaction code; generated when omitted.
    #[arg(long)]
    code: Option<String>,

    /// Document date (YYYY-MM-DD); today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Record a committed SalesInvoice instead of an estimate.
    #[arg(long)]
    commit: bool,

    #[command(flatten)]
    address: AddressArgs,
}

#[derive(Debug, Clone, Args)]
struct AddressArgs {
    #[arg(long)]
    line1: Option<String>,
    #[arg(long)]
    line2: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// State, province or region code.
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long, default_value = "US")]
    country: String,
}

impl From<AddressArgs> for Address {
    fn from(args: AddressArgs) -> Self {
        Address {
            line1: args.line1,
            line2: args.line2,
            line3: None,
            city: args.city,
            region: args.region,
            country: Some(args.country),
            postal_code: args.postal_code,
        }
    }
}

impl QuoteArgs {
    fn into_request(self, today: NaiveDate) -> Result<TransactionRequest> {
        let (document_type, commit) = if self.commit {
            ("SalesInvoice", true)
        } else {
            ("SalesOrder", false)
        };
        let address = serde_json::to_value(Address::from(self.address))?;

        let mut line_extra = Map::new();
        line_extra.insert("quantity".to_owned(), json!(self.quantity));
        line_extra.insert("amount".to_owned(), json!(self.amount));

        let mut model_extra = Map::new();
        model_extra.insert("addresses".to_owned(), json!({ "singleLocation": address }));

        Ok(TransactionRequest {
            create_transaction_model: Some(CreateTransactionModel {
                code: Some(
                    self.code
                        .unwrap_or_else(|| format!("taxsvc-{}", uuid::Uuid::new_v4())),
                ),
                document_type: Some(document_type.to_owned()),
                customer_code: Some(self.customer_code),
                date: Some(self.date.unwrap_or(today).to_string()),
                commit: Some(commit),
                lines: vec![LineItem {
                    number: Some(json!("1")),
                    tax_code: Some(self.tax_code),
                    extra: line_extra,
                }],
                extra: model_extra,
                ..CreateTransactionModel::default()
            }),
            ..TransactionRequest::default()
        })
    }
}

/// Reads the raw request JSON. Shape checks are left to the adapter so that
/// they are reported like any other validation failure.
fn read_request(path: &Path) -> Result<Value> {
    let mut raw = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read request from stdin")?;
    } else {
        raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    serde_json::from_str(&raw).context("request is not valid JSON")
}

async fn run(svc: &TaxSvc, command: Command) -> Result<TaxResult> {
    let result = match command {
        Command::Ping => svc.ping().await?,
        Command::GetTax { file } => svc.get_tax_value(read_request(&file)?).await?,
        Command::Quote(args) => {
            let request = args.into_request(Local::now().date_naive())?;
            svc.get_tax(&request).await?
        }
        Command::Cancel { code } => svc.cancel_tax(Some(&code)).await?,
        Command::ValidateAddress(args) => svc.validate_address(&args.into()).await?,
    };
    Ok(result)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format, &cli.log_level)?;

    let avatax_config =
        avatax::AvaTaxConfig::from_env().context("invalid AvaTax configuration")?;
    tracing::info!(
        environment = %avatax_config.environment,
        company = %avatax_config.company_code,
        "starting taxsvc"
    );
    let svc_config = Arc::new(TaxSvcConfig::new(cli.raise_exceptions, cli.log_payloads));
    let svc = avatax::tax_svc(avatax_config, svc_config);

    let result = run(&svc, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ERROR_RESULT)
    })
}
