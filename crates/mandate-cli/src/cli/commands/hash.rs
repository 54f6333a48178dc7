//! `mandate hash` - Print the mandate hash.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::helpers::read_mandate;
use crate::exit_codes;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Mandate file (JSON)
    pub mandate: PathBuf,

    /// Print the canonical JSON instead of the hash
    #[arg(long)]
    pub canonical: bool,
}

pub fn cmd_hash(args: HashArgs) -> i32 {
    match run_hash(&args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

fn run_hash(args: &HashArgs) -> Result<()> {
    let mandate = read_mandate(&args.mandate)?;
    if args.canonical {
        println!("{}", mandate.to_canonical_string()?);
    } else {
        println!("{}", mandate.hash_hex()?);
    }
    Ok(())
}
