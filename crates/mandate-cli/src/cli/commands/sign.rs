//! `mandate sign` - Attach a role signature.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use mandate_core::{
    LocalSigner, MandateError, Role, SignatureAlg, SignatureScheme, SigningIdentity,
};

use crate::cli::args::{AlgArg, DomainArgs, RoleArg};
use crate::cli::helpers::{read_mandate, write_mandate};
use crate::exit_codes;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Mandate file (JSON)
    pub mandate: PathBuf,

    /// Role to sign as
    #[arg(long, value_enum)]
    pub role: RoleArg,

    /// Hex private key file
    #[arg(long, short)]
    pub key: PathBuf,

    /// Signature algorithm
    #[arg(long, value_enum, default_value_t = AlgArg::Eip191)]
    pub alg: AlgArg,

    #[command(flatten)]
    pub domain: DomainArgs,

    /// Output file (default: stdout)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Modify input file in place
    #[arg(long, conflicts_with = "out")]
    pub in_place: bool,
}

pub async fn cmd_sign(args: SignArgs) -> i32 {
    match run_sign(args).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::for_error(&e)
        }
    }
}

async fn run_sign(args: SignArgs) -> Result<()> {
    let output_path = if args.in_place {
        Some(args.mandate.clone())
    } else {
        args.out.clone()
    };

    let signer = LocalSigner::from_file(&args.key)?;
    let scheme = match SignatureAlg::from(args.alg) {
        SignatureAlg::Eip191 => SignatureScheme::Eip191,
        SignatureAlg::Eip712 => {
            SignatureScheme::Eip712(args.domain.domain().ok_or_else(|| {
                MandateError::DomainRequired {
                    context: "eip712 signing needs --chain-id".to_string(),
                }
            })?)
        }
    };

    let role = Role::from(args.role);
    let mut mandate = read_mandate(&args.mandate)?;
    let sig = mandate.sign(role, &signer, &scheme).await?;

    write_mandate(&mandate, output_path.as_deref())?;
    if output_path.is_some() {
        println!(
            "Signed as {role} ({}) by {}",
            sig.alg,
            signer.address().to_checksum(None)
        );
        println!("  mandate_hash: {}", sig.mandate_hash);
    }
    Ok(())
}
