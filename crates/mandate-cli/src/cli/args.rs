use clap::{Args, Parser, Subcommand, ValueEnum};

use mandate_core::{Eip712Domain, Role, SignatureAlg};

use super::commands::{create, hash, keygen, sign, store, verify};

#[derive(Parser)]
#[command(
    name = "mandate",
    version,
    about = "Create, sign and verify two-party agreement mandates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a secp256k1 signing key
    Keygen(keygen::KeygenArgs),
    /// Create an unsigned mandate
    Create(create::CreateArgs),
    /// Sign a mandate as client or server
    Sign(sign::SignArgs),
    /// Verify a signed mandate as a third party
    Verify(verify::VerifyArgs),
    /// Print the mandate hash or canonical form
    Hash(hash::HashArgs),
    /// Publish a mandate to a content-addressed store
    Publish(store::PublishArgs),
    /// Fetch a mandate by content id
    Fetch(store::FetchArgs),
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Client,
    Server,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Client => Role::Client,
            RoleArg::Server => Role::Server,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AlgArg {
    #[default]
    Eip191,
    Eip712,
}

impl From<AlgArg> for SignatureAlg {
    fn from(alg: AlgArg) -> Self {
        match alg {
            AlgArg::Eip191 => SignatureAlg::Eip191,
            AlgArg::Eip712 => SignatureAlg::Eip712,
        }
    }
}

/// EIP-712 domain fields shared by `sign` and `verify`.
#[derive(Args, Debug, Clone, Default)]
pub struct DomainArgs {
    /// EIP-712 domain chainId
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// EIP-712 domain name
    #[arg(long)]
    pub domain_name: Option<String>,

    /// EIP-712 domain version
    #[arg(long)]
    pub domain_version: Option<String>,

    /// EIP-712 domain verifyingContract
    #[arg(long)]
    pub verifying_contract: Option<String>,
}

impl DomainArgs {
    /// The domain, if a chain id was given.
    pub fn domain(&self) -> Option<Eip712Domain> {
        let mut domain = Eip712Domain::for_chain(self.chain_id?);
        if let Some(name) = &self.domain_name {
            domain = domain.with_name(name.clone());
        }
        if let Some(version) = &self.domain_version {
            domain = domain.with_version(version.clone());
        }
        if let Some(contract) = &self.verifying_contract {
            domain = domain.with_verifying_contract(contract.clone());
        }
        Some(domain)
    }
}
