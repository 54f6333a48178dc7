//! `mandate create` - Build an unsigned mandate.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use mandate_core::{Mandate, PrimitiveRegistry};

use crate::cli::helpers::{parse_time, write_mandate};
use crate::exit_codes;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Client account (CAIP-10, e.g. eip155:1:0xabc...)
    #[arg(long)]
    pub client: String,

    /// Server account (CAIP-10)
    #[arg(long)]
    pub server: String,

    /// Deadline: RFC 3339 timestamp or offset from now such as +15m
    #[arg(long)]
    pub deadline: String,

    /// Human-readable intent
    #[arg(long, default_value = "")]
    pub intent: String,

    /// Explicit mandate id (default: UUIDv7)
    #[arg(long)]
    pub id: Option<String>,

    /// Primitive kind of the payload, e.g. swap@1
    #[arg(long, requires = "payload")]
    pub kind: Option<String>,

    /// Payload JSON file for --kind
    #[arg(long, requires = "kind")]
    pub payload: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub fn cmd_create(args: CreateArgs) -> i32 {
    match run_create(args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

fn run_create(args: CreateArgs) -> Result<()> {
    let mut builder = Mandate::builder()
        .client(args.client)
        .server(args.server)
        .intent(args.intent);
    builder = if args.deadline.starts_with('+') {
        builder.deadline_at(parse_time(&args.deadline)?)
    } else {
        builder.deadline(args.deadline)
    };
    if let Some(id) = args.id {
        builder = builder.mandate_id(id);
    }
    let mut mandate = builder.build()?;

    if let (Some(kind), Some(path)) = (args.kind, args.payload) {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read payload: {}", path.display()))?;
        let payload: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse payload JSON: {}", path.display()))?;
        mandate.set_core(&PrimitiveRegistry::with_builtins(), &kind, payload)?;
    }

    write_mandate(&mandate, args.out.as_deref())
}
