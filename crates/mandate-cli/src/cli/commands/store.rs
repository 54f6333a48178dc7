//! `mandate publish` / `mandate fetch` - Content-addressed storage.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use mandate_core::store::{fetch_mandate, publish_mandate};
use mandate_core::ObjectStoreBlobStore;

use crate::cli::helpers::{read_mandate, write_mandate};
use crate::exit_codes;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Mandate file (JSON)
    pub mandate: PathBuf,

    /// Store URL (file:///path or memory://)
    #[arg(long, env = "MANDATE_STORE")]
    pub store: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Content id (sha256:<hex>)
    pub content_id: String,

    /// Store URL (file:///path or memory://)
    #[arg(long, env = "MANDATE_STORE")]
    pub store: String,

    /// Output file (default: stdout)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub async fn cmd_publish(args: PublishArgs) -> i32 {
    match run_publish(&args).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

pub async fn cmd_fetch(args: FetchArgs) -> i32 {
    match run_fetch(&args).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

async fn run_publish(args: &PublishArgs) -> Result<()> {
    let store = ObjectStoreBlobStore::from_url(&args.store)
        .with_context(|| format!("failed to open store: {}", args.store))?;
    let mandate = read_mandate(&args.mandate)?;
    let id = publish_mandate(&store, &mandate).await?;
    println!("{id}");
    Ok(())
}

async fn run_fetch(args: &FetchArgs) -> Result<()> {
    let store = ObjectStoreBlobStore::from_url(&args.store)
        .with_context(|| format!("failed to open store: {}", args.store))?;
    let mandate = fetch_mandate(&store, &args.content_id).await?;
    write_mandate(&mandate, args.out.as_deref())
}
