//! Role signing and verification.
//!
//! # Signing Process
//!
//! ```text
//! 1. canonical = JCS(document WITHOUT signatures)
//! 2. mandateHash = keccak256(canonical)
//! 3. digest = eip191(canonical)                       (alg = eip191)
//!           | eip712(domain, Mandate{mandateHash})    (alg = eip712)
//! 4. signature = secp256k1_sign(digest) as r || s || v
//! 5. signatures.<role>Sig = {alg, mandateHash, signature}
//! ```
//!
//! Verification recomputes step 1-2 from the current content and compares the
//! hash before touching any cryptography, so post-signing edits surface as
//! [`MandateError::HashMismatch`] rather than a bad signature.

use alloy_primitives::B256;
use serde::Serialize;
use tracing::debug;

use super::types::{Mandate, Role, RoleSignature};
use crate::canonical::{self, keccak256};
use crate::error::{MandateError, MandateResult};
use crate::signing::{recover_address, Eip712Domain, SignatureAlg, SignatureScheme, SigningIdentity};

/// Successful verification of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleVerification {
    pub ok: bool,
    /// Recovered signer, EIP-55 checksummed.
    pub recovered: String,
    pub mandate_hash: String,
    pub alg: SignatureAlg,
}

/// Both roles verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MandateVerification {
    pub client: RoleVerification,
    pub server: RoleVerification,
}

impl Mandate {
    /// Sign as `role` and attach the signature, replacing any previous one.
    ///
    /// Nothing is attached if signing fails.
    pub async fn sign<I>(
        &mut self,
        role: Role,
        identity: &I,
        scheme: &SignatureScheme,
    ) -> MandateResult<RoleSignature>
    where
        I: SigningIdentity + ?Sized,
    {
        let canonical = self.to_canonical_string()?;
        let mandate_hash = keccak256(canonical.as_bytes());
        let digest = scheme.digest(canonical.as_bytes(), &mandate_hash)?;
        let sig_bytes = identity.sign_hash(digest).await?;

        let sig = RoleSignature {
            alg: scheme.alg(),
            mandate_hash: canonical::hash_hex(&mandate_hash),
            signature: format!("0x{}", hex::encode(&sig_bytes)),
        };
        debug!(
            mandate_id = %self.mandate_id,
            %role,
            alg = %sig.alg,
            mandate_hash = %sig.mandate_hash,
            "mandate signed"
        );
        self.signatures
            .get_or_insert_with(Default::default)
            .set(role, sig.clone());
        Ok(sig)
    }

    /// Verify the signature attached for `role`.
    ///
    /// `domain` is required when the role signed with `eip712`.
    pub fn verify_role(
        &self,
        role: Role,
        domain: Option<&Eip712Domain>,
    ) -> MandateResult<RoleVerification> {
        let signatures = self
            .signatures
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MandateError::SignatureMissing {
                role,
                detail: "mandate carries no signatures".to_string(),
            })?;
        let sig = signatures
            .get(role)
            .ok_or_else(|| MandateError::SignatureMissing {
                role,
                detail: format!("no {} attached", role.sig_field()),
            })?;

        let canonical = self.to_canonical_string()?;
        let computed = keccak256(canonical.as_bytes());
        let computed_hex = canonical::hash_hex(&computed);
        if !sig.mandate_hash.eq_ignore_ascii_case(&computed_hex) {
            return Err(MandateError::HashMismatch {
                role,
                signed: sig.mandate_hash.clone(),
                computed: computed_hex,
            });
        }

        let scheme = SignatureScheme::for_verification(sig.alg, domain)?;
        let digest: B256 = scheme.digest(canonical.as_bytes(), &computed)?;
        let invalid = |reason: String| MandateError::SignatureInvalid { role, reason };
        let sig_bytes = sig.signature_bytes().map_err(invalid)?;
        let recovered = recover_address(&digest, &sig_bytes).map_err(invalid)?;
        let recovered = recovered.to_checksum(None);

        let party = self.party(role);
        if !party.matches_address(&recovered) {
            return Err(MandateError::SignatureInvalid {
                role,
                reason: format!("recovered {recovered}, expected {}", party.address()),
            });
        }

        Ok(RoleVerification {
            ok: true,
            recovered,
            mandate_hash: computed_hex,
            alg: sig.alg,
        })
    }

    /// Verify both roles. Either failing fails the call.
    pub fn verify_all(
        &self,
        client_domain: Option<&Eip712Domain>,
        server_domain: Option<&Eip712Domain>,
    ) -> MandateResult<MandateVerification> {
        Ok(MandateVerification {
            client: self.verify_role(Role::Client, client_domain)?,
            server: self.verify_role(Role::Server, server_domain)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::signing::LocalSigner;

    fn mandate_for(client: &LocalSigner, server: &LocalSigner) -> Mandate {
        Mandate::builder()
            .client(AccountId::eip155(1, client.address()).to_string())
            .server(AccountId::eip155(1, server.address()).to_string())
            .deadline("2030-01-01T00:00:00Z")
            .intent("test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sign_verify_eip191() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);

        let sig = m.sign(Role::Server, &server, &SignatureScheme::Eip191).await.unwrap();
        assert_eq!(sig.alg, SignatureAlg::Eip191);
        assert_eq!(sig.mandate_hash, m.hash_hex().unwrap());

        let v = m.verify_role(Role::Server, None).unwrap();
        assert!(v.ok);
        assert_eq!(v.recovered, server.address().to_checksum(None));
    }

    #[tokio::test]
    async fn test_sign_verify_eip712_needs_domain() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);
        let domain = Eip712Domain::for_chain(1).with_name("Mandates").with_version("1");

        m.sign(Role::Client, &client, &SignatureScheme::Eip712(domain.clone()))
            .await
            .unwrap();

        assert!(m.verify_role(Role::Client, Some(&domain)).is_ok());
        assert!(matches!(
            m.verify_role(Role::Client, None),
            Err(MandateError::DomainRequired { .. })
        ));

        // A different domain recovers a different signer
        let other = Eip712Domain::for_chain(8453).with_name("Mandates").with_version("1");
        assert!(matches!(
            m.verify_role(Role::Client, Some(&other)),
            Err(MandateError::SignatureInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_signatures() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);

        match m.verify_role(Role::Client, None) {
            Err(MandateError::SignatureMissing { detail, .. }) => {
                assert_eq!(detail, "mandate carries no signatures")
            }
            other => panic!("unexpected: {other:?}"),
        }

        m.sign(Role::Server, &server, &SignatureScheme::Eip191).await.unwrap();
        match m.verify_role(Role::Client, None) {
            Err(MandateError::SignatureMissing { role, detail }) => {
                assert_eq!(role, Role::Client);
                assert_eq!(detail, "no clientSig attached");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(m.verify_all(None, None).is_err());
    }

    #[tokio::test]
    async fn test_wrong_signer_is_invalid() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);

        // Client key signs the server slot
        m.sign(Role::Server, &client, &SignatureScheme::Eip191).await.unwrap();
        assert!(matches!(
            m.verify_role(Role::Server, None),
            Err(MandateError::SignatureInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_tamper_is_hash_mismatch() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);
        m.sign(Role::Server, &server, &SignatureScheme::Eip191).await.unwrap();

        m.intent = "something else".to_string();
        assert!(matches!(
            m.verify_role(Role::Server, None),
            Err(MandateError::HashMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_resign_overwrites() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);

        let first = m.sign(Role::Client, &client, &SignatureScheme::Eip191).await.unwrap();
        let domain = Eip712Domain::for_chain(1);
        let second = m
            .sign(Role::Client, &client, &SignatureScheme::Eip712(domain.clone()))
            .await
            .unwrap();
        assert_ne!(first.signature, second.signature);

        let sigs = m.signatures().unwrap();
        assert_eq!(sigs.client_sig.as_ref(), Some(&second));
        assert!(sigs.server_sig.is_none());
        assert!(m.verify_role(Role::Client, Some(&domain)).is_ok());
    }

    #[tokio::test]
    async fn test_failed_sign_attaches_nothing() {
        let client = LocalSigner::random();
        let server = LocalSigner::random();
        let mut m = mandate_for(&client, &server);

        let err = m
            .sign(Role::Client, &client, &SignatureScheme::Eip712(Eip712Domain::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, MandateError::DomainRequired { .. }));
        assert!(m.signatures().is_none());
    }
}
