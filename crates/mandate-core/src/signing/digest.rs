use alloy_primitives::{B256, U256};

use crate::account::parse_evm_address;
use crate::canonical::keccak256;
use crate::error::{MandateError, MandateResult};

use super::Eip712Domain;

/// Typed-data struct bound by `eip712` signatures.
pub const MANDATE_TYPE: &str = "Mandate(bytes32 mandateHash)";

/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn eip191_digest(message: &[u8]) -> B256 {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut buf = Vec::with_capacity(prefix.len() + message.len());
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(message);
    keccak256(&buf)
}

fn domain_separator(domain: &Eip712Domain, chain_id: u64) -> MandateResult<B256> {
    let mut fields = Vec::with_capacity(4);
    let mut encoded = Vec::with_capacity(32 * 5);
    encoded.extend_from_slice(&[0u8; 32]); // type hash, filled below

    if let Some(name) = &domain.name {
        fields.push("string name");
        encoded.extend_from_slice(keccak256(name.as_bytes()).as_slice());
    }
    if let Some(version) = &domain.version {
        fields.push("string version");
        encoded.extend_from_slice(keccak256(version.as_bytes()).as_slice());
    }
    fields.push("uint256 chainId");
    encoded.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    if let Some(contract) = &domain.verifying_contract {
        fields.push("address verifyingContract");
        let address = parse_evm_address(contract)?;
        let mut padded = [0u8; 32];
        padded[12..32].copy_from_slice(address.as_slice());
        encoded.extend_from_slice(&padded);
    }

    let type_hash = keccak256(format!("EIP712Domain({})", fields.join(",")).as_bytes());
    encoded[..32].copy_from_slice(type_hash.as_slice());
    Ok(keccak256(&encoded))
}

/// `keccak256("\x19\x01" || domainSeparator || hashStruct(Mandate))`.
pub fn eip712_digest(domain: &Eip712Domain, mandate_hash: &B256) -> MandateResult<B256> {
    let chain_id = domain.chain_id.ok_or_else(|| MandateError::DomainRequired {
        context: "eip712 domain has no chainId".to_string(),
    })?;
    let separator = domain_separator(domain, chain_id)?;

    let mut struct_buf = Vec::with_capacity(64);
    struct_buf.extend_from_slice(keccak256(MANDATE_TYPE.as_bytes()).as_slice());
    struct_buf.extend_from_slice(mandate_hash.as_slice());
    let struct_hash = keccak256(&struct_buf);

    let mut final_buf = Vec::with_capacity(2 + 32 + 32);
    final_buf.extend_from_slice(b"\x19\x01");
    final_buf.extend_from_slice(separator.as_slice());
    final_buf.extend_from_slice(struct_hash.as_slice());
    Ok(keccak256(&final_buf))
}
