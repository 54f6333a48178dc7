use std::path::Path;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::canonical::keccak256;
use crate::error::{MandateError, MandateResult};

/// A party able to sign 32-byte digests with a secp256k1 key.
///
/// Implementations may be local keys, hardware wallets or remote signers;
/// the mandate only needs the address and a 65-byte `r || s || v` signature.
#[async_trait]
pub trait SigningIdentity: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_hash(&self, digest: B256) -> MandateResult<Vec<u8>>;
}

/// In-process secp256k1 key.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// Generate a fresh key.
    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Parse a 32-byte hex private key (`0x` prefix optional).
    pub fn from_hex(s: &str) -> MandateResult<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| MandateError::Signing {
            reason: format!("invalid private key hex: {e}"),
        })?;
        let key = SigningKey::from_slice(&bytes).map_err(|e| MandateError::Signing {
            reason: format!("invalid private key: {e}"),
        })?;
        Ok(Self::new(key))
    }

    /// Load a hex private key file.
    pub fn from_file(path: &Path) -> MandateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MandateError::Signing {
            reason: format!("failed to read key {}: {e}", path.display()),
        })?;
        Self::from_hex(&content)
    }

    /// `0x`-prefixed private key hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningIdentity for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_hash(&self, digest: B256) -> MandateResult<Vec<u8>> {
        let (signature, recid) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| MandateError::Signing {
                reason: e.to_string(),
            })?;
        let (r, s) = signature.split_bytes();

        let mut sig_bytes = Vec::with_capacity(65);
        sig_bytes.extend_from_slice(r.as_slice());
        sig_bytes.extend_from_slice(s.as_slice());
        sig_bytes.push(27 + recid.to_byte());
        Ok(sig_bytes)
    }
}

/// Ethereum address of a public key: last 20 bytes of keccak(uncompressed point).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the signer address from a 65-byte signature over `digest`.
///
/// Accepts `v` in {0, 1, 27, 28}.
pub fn recover_address(digest: &B256, sig: &[u8]) -> Result<Address, String> {
    if sig.len() != 65 {
        return Err(format!("signature must be 65 bytes, got {}", sig.len()));
    }
    let v = match sig[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => return Err(format!("invalid recovery byte {other}")),
    };
    let recid = RecoveryId::from_byte(v).ok_or_else(|| format!("invalid recovery id {v}"))?;
    let signature = Signature::from_slice(&sig[..64]).map_err(|e| e.to_string())?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recid)
        .map_err(|e| e.to_string())?;
    Ok(address_of(&key))
}
