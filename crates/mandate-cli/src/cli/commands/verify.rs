//! `mandate verify` - Third-party verification of a signed mandate.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use mandate_core::{verify_mandate, PrimitiveRegistry, VerificationReceipt, VerifyPolicy};

use crate::cli::args::DomainArgs;
use crate::cli::helpers::parse_time;
use crate::exit_codes;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signed mandate file (JSON)
    pub mandate: PathBuf,

    /// Verify policy file (YAML)
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Required client address
    #[arg(long)]
    pub require_client: Option<String>,

    /// Required server address
    #[arg(long)]
    pub require_server: Option<String>,

    /// Expected primitive kind, e.g. swap@1
    #[arg(long)]
    pub kind: Option<String>,

    /// Reference time instead of now (RFC 3339 or +duration)
    #[arg(long)]
    pub now: Option<String>,

    /// EIP-712 domain for any role the policy does not cover
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Print the receipt as JSON
    #[arg(long)]
    pub json: bool,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn cmd_verify(args: VerifyArgs) -> i32 {
    match run_verify(&args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if !args.quiet {
                eprintln!("error: {e:#}");
            }
            exit_codes::for_error(&e)
        }
    }
}

fn run_verify(args: &VerifyArgs) -> Result<()> {
    let content = fs::read_to_string(&args.mandate)
        .with_context(|| format!("failed to read mandate: {}", args.mandate.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse mandate JSON: {}", args.mandate.display()))?;

    let policy = match &args.policy {
        Some(path) => VerifyPolicy::from_file(path)?,
        None => VerifyPolicy::default(),
    };

    // Flags override policy
    let mut options = policy.to_options();
    if let Some(client) = &args.require_client {
        options.require_client = Some(client.clone());
    }
    if let Some(server) = &args.require_server {
        options.require_server = Some(server.clone());
    }
    if let Some(kind) = &args.kind {
        options.expect_kind = Some(kind.clone());
    }
    if let Some(now) = &args.now {
        options.now = Some(parse_time(now)?);
    }
    if let Some(domain) = args.domain.domain() {
        options.client_domain.get_or_insert_with(|| domain.clone());
        options.server_domain.get_or_insert(domain);
    }

    let receipt = verify_mandate(&document, &options, &PrimitiveRegistry::with_builtins())?;

    if args.quiet {
        return Ok(());
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        print_receipt(&receipt);
    }
    Ok(())
}

fn print_receipt(receipt: &VerificationReceipt) {
    println!("Verification successful!");
    println!();
    println!("  mandate_id:   {}", receipt.mandate_id);
    println!("  mandate_hash: {}", receipt.mandate_hash);
    println!(
        "  client:       {} ({})",
        receipt.parties.client, receipt.signatures.client.alg
    );
    println!(
        "  server:       {} ({})",
        receipt.parties.server, receipt.signatures.server.alg
    );
    if let Some(core) = &receipt.core {
        println!("  core:         {}", core.kind);
    }
}
