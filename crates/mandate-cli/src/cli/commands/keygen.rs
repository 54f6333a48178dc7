//! `mandate keygen` - Generate a secp256k1 signing key.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use mandate_core::{LocalSigner, SigningIdentity};

use crate::exit_codes;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output file for the hex private key
    #[arg(long, short)]
    pub out: PathBuf,

    /// Force overwrite existing file
    #[arg(long, short)]
    pub force: bool,
}

pub fn cmd_keygen(args: KeygenArgs) -> i32 {
    match run_keygen(args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

fn run_keygen(args: KeygenArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "key already exists: {} (use --force to overwrite)",
            args.out.display()
        );
    }
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let signer = LocalSigner::random();
    fs::write(&args.out, format!("{}\n", signer.to_hex()))
        .with_context(|| format!("failed to write key: {}", args.out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&args.out, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to set permissions on: {}", args.out.display()))?;
    }

    println!("Generated secp256k1 key:");
    println!("  Private key: {} (hex, mode 0600)", args.out.display());
    println!();
    println!("address: {}", signer.address().to_checksum(None));

    Ok(())
}
